//! The DID registry: document lifecycle on top of a [`LedgerStore`].
//!
//! Lifecycle: `NonExistent -> Active -> Deactivated`. Only the controller
//! may update or deactivate, and deactivation is terminal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, OwnedMutexGuard};
use veridid_core::{
    now_millis, validate_did_id, validate_document_fields, Blake3Hash, DidDocument, DidStatus,
    DocumentLimits, Ed25519PublicKey, ServiceEndpoint, VerificationMethod,
};
use veridid_store::{AppendResult, InsertResult, LedgerStore};

use crate::error::{RegistryError, Result};
use crate::events::RegistryEvent;
use crate::request::{RegistryRequest, RegistryResponse, SignedRequest};

/// Configuration for the registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum verification methods per document.
    pub max_verification_methods: usize,
    /// Maximum services per document.
    pub max_services: usize,
    /// Buffered lifecycle events per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let limits = DocumentLimits::default();
        Self {
            max_verification_methods: limits.max_verification_methods,
            max_services: limits.max_services,
            event_capacity: 256,
        }
    }
}

impl RegistryConfig {
    pub fn limits(&self) -> DocumentLimits {
        DocumentLimits {
            max_verification_methods: self.max_verification_methods,
            max_services: self.max_services,
        }
    }
}

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive write access to one DID. Drops its lock-table entry when no
/// other writer is waiting on it.
struct DidWriteGuard<'a> {
    table: &'a LockTable,
    did: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DidWriteGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one in this guard.
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.did);
        }
    }
}

/// The DID registry.
///
/// Many readers, one writer per DID. Reads go straight to the ledger;
/// writes for the same DID queue on a per-DID async mutex held across the
/// read-modify-append, and writes to different DIDs run concurrently.
pub struct DidRegistry<S: LedgerStore> {
    store: Arc<S>,
    config: RegistryConfig,
    locks: LockTable,
    events: broadcast::Sender<RegistryEvent>,
}

impl<S: LedgerStore> DidRegistry<S> {
    /// Create a registry over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create a registry over a store that is shared with other components.
    pub fn with_shared_store(store: Arc<S>, config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Subscribe to lifecycle events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    async fn lock_did(&self, did: &str) -> DidWriteGuard<'_> {
        let lock = {
            let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(did.to_string()).or_default().clone()
        };
        let guard = lock.clone().lock_owned().await;
        DidWriteGuard {
            table: &self.locks,
            did: did.to_string(),
            lock,
            guard: Some(guard),
        }
    }

    fn emit(&self, event: RegistryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new DID owned by `controller`.
    pub async fn create(
        &self,
        did_id: &str,
        controller: Ed25519PublicKey,
        verification_methods: Vec<VerificationMethod>,
        services: Vec<ServiceEndpoint>,
        data_hash: Blake3Hash,
    ) -> Result<DidDocument> {
        // 1. Syntax and limits
        validate_did_id(did_id).map_err(RegistryError::InvalidDocument)?;
        validate_document_fields(&verification_methods, &services, &self.config.limits())
            .map_err(RegistryError::InvalidDocument)?;

        let _guard = self.lock_did(did_id).await;

        // 2. Store version 1
        let document = DidDocument {
            id: did_id.to_string(),
            controller,
            verification_methods,
            services,
            data_hash,
            timestamp: now_millis(),
            active: true,
            version: 1,
        };

        match self.store.insert_document(&document).await? {
            InsertResult::Inserted => {}
            InsertResult::AlreadyExists => {
                tracing::warn!(did = %did_id, "create rejected: DID already exists");
                return Err(RegistryError::AlreadyExists(did_id.to_string()));
            }
        }

        tracing::info!(did = %did_id, controller = %controller, "DID created");
        self.emit(RegistryEvent::DidCreated {
            did: document.id.clone(),
            controller,
        });
        Ok(document)
    }

    /// Replace the mutable fields of an active DID.
    pub async fn update(
        &self,
        did_id: &str,
        caller: &Ed25519PublicKey,
        verification_methods: Vec<VerificationMethod>,
        services: Vec<ServiceEndpoint>,
        data_hash: Blake3Hash,
    ) -> Result<DidDocument> {
        self.update_at(did_id, caller, None, verification_methods, services, data_hash)
            .await
    }

    /// [`update`](Self::update), applied only if the DID is at
    /// `expected_version`.
    async fn update_at(
        &self,
        did_id: &str,
        caller: &Ed25519PublicKey,
        expected_version: Option<u64>,
        verification_methods: Vec<VerificationMethod>,
        services: Vec<ServiceEndpoint>,
        data_hash: Blake3Hash,
    ) -> Result<DidDocument> {
        let _guard = self.lock_did(did_id).await;

        // 1. Exists, owned by caller, still active, at the signed version
        let current = self.current_for_write(did_id, caller).await?;
        if !current.active {
            tracing::warn!(did = %did_id, "update rejected: DID is deactivated");
            return Err(RegistryError::Deactivated(did_id.to_string()));
        }
        check_version(&current, expected_version)?;

        // 2. New fields within limits
        validate_document_fields(&verification_methods, &services, &self.config.limits())
            .map_err(RegistryError::InvalidDocument)?;

        // 3. Append the next version
        let next = DidDocument {
            verification_methods,
            services,
            data_hash,
            timestamp: now_millis().max(current.timestamp),
            version: current.version + 1,
            ..current
        };
        self.append(&next).await?;

        tracing::info!(did = %did_id, version = next.version, "DID updated");
        self.emit(RegistryEvent::DidUpdated {
            did: next.id.clone(),
            version: next.version,
            data_hash,
        });
        Ok(next)
    }

    /// Permanently deactivate a DID.
    ///
    /// Deactivating an already inactive DID succeeds without writing a new
    /// version or emitting an event.
    pub async fn deactivate(&self, did_id: &str, caller: &Ed25519PublicKey) -> Result<()> {
        self.deactivate_at(did_id, caller, None).await
    }

    async fn deactivate_at(
        &self,
        did_id: &str,
        caller: &Ed25519PublicKey,
        expected_version: Option<u64>,
    ) -> Result<()> {
        let _guard = self.lock_did(did_id).await;

        let current = self.current_for_write(did_id, caller).await?;
        if !current.active {
            tracing::debug!(did = %did_id, "deactivate: already inactive");
            return Ok(());
        }
        check_version(&current, expected_version)?;

        let next = DidDocument {
            active: false,
            timestamp: now_millis().max(current.timestamp),
            version: current.version + 1,
            ..current
        };
        self.append(&next).await?;

        tracing::info!(did = %did_id, version = next.version, "DID deactivated");
        self.emit(RegistryEvent::DidDeactivated {
            did: next.id,
            version: next.version,
        });
        Ok(())
    }

    async fn current_for_write(
        &self,
        did_id: &str,
        caller: &Ed25519PublicKey,
    ) -> Result<DidDocument> {
        let current = self
            .store
            .latest(did_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(did_id.to_string()))?;

        if &current.controller != caller {
            tracing::warn!(did = %did_id, caller = %caller, "mutation rejected: not the controller");
            return Err(RegistryError::Unauthorized(did_id.to_string()));
        }
        Ok(current)
    }

    async fn append(&self, document: &DidDocument) -> Result<()> {
        match self.store.append_version(document).await? {
            AppendResult::Appended => Ok(()),
            AppendResult::Conflict { current_version } => {
                tracing::warn!(
                    did = %document.id,
                    offered = document.version,
                    current_version,
                    "ledger version conflict"
                );
                Err(RegistryError::Conflict {
                    did: document.id.clone(),
                    current_version,
                })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Current document for a DID, active or not.
    pub async fn resolve(&self, did_id: &str) -> Result<Option<DidDocument>> {
        Ok(self.store.latest(did_id).await?)
    }

    /// Whether the DID exists and is active.
    pub async fn is_active(&self, did_id: &str) -> Result<bool> {
        Ok(self.status(did_id).await? == DidStatus::Active)
    }

    pub async fn status(&self, did_id: &str) -> Result<DidStatus> {
        Ok(self
            .store
            .latest(did_id)
            .await?
            .map_or(DidStatus::NonExistent, |d| d.status()))
    }

    /// Every stored version of a DID, oldest first.
    pub async fn history(&self, did_id: &str) -> Result<Vec<DidDocument>> {
        Ok(self.store.history(did_id).await?)
    }

    /// Known DIDs, optionally only those owned by `controller`.
    pub async fn list(&self, controller: Option<&Ed25519PublicKey>) -> Result<Vec<String>> {
        Ok(self.store.list_dids(controller).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signed requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify and dispatch a signed request. The signer is the caller (and
    /// the controller, for `CreateDid`).
    pub async fn handle(&self, signed: &SignedRequest) -> RegistryResponse {
        match self.dispatch(signed).await {
            Ok(response) => response,
            Err(e) => RegistryResponse::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Decode, handle, and encode a request in one step.
    pub async fn handle_bytes(&self, request: &[u8]) -> Result<Vec<u8>> {
        let response = match SignedRequest::decode(request) {
            Ok(signed) => self.handle(&signed).await,
            Err(e) => {
                let e = RegistryError::InvalidRequest(e.to_string());
                RegistryResponse::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        };
        response
            .encode()
            .map_err(|e| RegistryError::InvalidRequest(e.to_string()))
    }

    async fn dispatch(&self, signed: &SignedRequest) -> Result<RegistryResponse> {
        if let Err(e) = signed.verify() {
            tracing::warn!(caller = %signed.caller, "request rejected: {}", e);
            return Err(RegistryError::InvalidRequest(e.to_string()));
        }

        let caller = signed.caller;
        let response = match signed.request.clone() {
            RegistryRequest::CreateDid {
                did,
                verification_methods,
                services,
                data_hash,
            } => {
                self.create(&did, caller, verification_methods, services, data_hash)
                    .await?;
                RegistryResponse::Done
            }
            RegistryRequest::UpdateDid {
                did,
                expected_version,
                verification_methods,
                services,
                data_hash,
            } => {
                self.update_at(
                    &did,
                    &caller,
                    Some(expected_version),
                    verification_methods,
                    services,
                    data_hash,
                )
                .await?;
                RegistryResponse::Done
            }
            RegistryRequest::DeactivateDid {
                did,
                expected_version,
            } => {
                self.deactivate_at(&did, &caller, Some(expected_version))
                    .await?;
                RegistryResponse::Done
            }
            RegistryRequest::ResolveDid { did } => RegistryResponse::Document(self.resolve(&did).await?),
            RegistryRequest::IsActive { did } => RegistryResponse::Active(self.is_active(&did).await?),
        };
        Ok(response)
    }
}

/// A signed mutation only applies to the version it was signed against.
fn check_version(current: &DidDocument, expected: Option<u64>) -> Result<()> {
    match expected {
        Some(expected) if expected != current.version => {
            tracing::warn!(
                did = %current.id,
                expected,
                current_version = current.version,
                "mutation rejected: stale version"
            );
            Err(RegistryError::Conflict {
                did: current.id.clone(),
                current_version: current.version,
            })
        }
        _ => Ok(()),
    }
}
