//! The Node: one registry, schema registry, revocation list and proof
//! backend wired together.

use std::path::Path;
use std::sync::Arc;

use veridid_core::{Blake3Hash, CredentialId, DidDocument, Keypair, ServiceEndpoint, VerificationMethod};
use veridid_proof::{
    CommitmentProofSystem, IssuerPublicParams, Issuer, ProofEngine, ProofRequest, ProofResponse,
    ProofSystem, RevocationList, VerificationResult, Verifier, Wallet,
};
use veridid_registry::{DidRegistry, RegistryConfig, SchemaRegistry};
use veridid_store::{LedgerStore, MemoryLedger, SqliteLedger};

use crate::error::Result;

/// Configuration for a [`Node`].
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Registry limits and event buffering.
    pub registry: RegistryConfig,
}

/// A veridid node.
///
/// Hands out issuers, wallets and verifiers that all share the same
/// registry, schemas and revocation list.
pub struct Node<S: LedgerStore, P: ProofSystem = CommitmentProofSystem> {
    registry: Arc<DidRegistry<S>>,
    schemas: Arc<SchemaRegistry>,
    revocations: Arc<RevocationList>,
    engine: ProofEngine<P>,
    config: NodeConfig,
}

impl Node<MemoryLedger> {
    /// A node over an in-memory ledger.
    pub fn in_memory(config: NodeConfig) -> Self {
        Self::new(MemoryLedger::new(), config)
    }
}

impl Node<SqliteLedger> {
    /// A node over a SQLite ledger at `path`.
    pub fn open_sqlite(path: impl AsRef<Path>, config: NodeConfig) -> Result<Self> {
        let ledger = SqliteLedger::open(path)?;
        Ok(Self::new(ledger, config))
    }
}

impl<S: LedgerStore> Node<S> {
    /// A node with the commitment proof backend.
    pub fn new(store: S, config: NodeConfig) -> Self {
        Self::with_engine(store, ProofEngine::default(), config)
    }
}

impl<S: LedgerStore, P: ProofSystem> Node<S, P> {
    /// A node with a custom proof backend.
    pub fn with_engine(store: S, engine: ProofEngine<P>, config: NodeConfig) -> Self {
        let registry = DidRegistry::new(store, config.registry.clone());
        tracing::info!(backend = engine.system().name(), "node started");
        Self {
            registry: Arc::new(registry),
            schemas: Arc::new(SchemaRegistry::new()),
            revocations: Arc::new(RevocationList::new()),
            engine,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DidRegistry<S>> {
        &self.registry
    }

    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    pub fn revocations(&self) -> &Arc<RevocationList> {
        &self.revocations
    }

    pub fn engine(&self) -> &ProofEngine<P> {
        &self.engine
    }

    // ─────────────────────────────────────────────────────────────────────────
    // DIDs
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `did_id` controlled by `keypair`, with that key as its only
    /// verification method.
    pub async fn register_did(
        &self,
        did_id: &str,
        keypair: &Keypair,
        services: Vec<ServiceEndpoint>,
    ) -> Result<DidDocument> {
        let key = keypair.public_key();
        let document = self
            .registry
            .create(
                did_id,
                key,
                vec![VerificationMethod::ed25519(format!("{did_id}#key-1"), key)],
                services,
                Blake3Hash::ZERO,
            )
            .await?;
        Ok(document)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────────

    /// An issuer acting as `did` with `keypair`.
    pub fn issuer(&self, did: impl Into<String>, keypair: Keypair) -> Issuer<S> {
        Issuer::new(did, keypair, self.registry.clone(), self.schemas.clone())
    }

    /// An empty wallet for `did`.
    pub fn wallet(&self, did: impl Into<String>, keypair: Keypair) -> Wallet<P> {
        Wallet::new(did, keypair, self.engine.clone())
    }

    /// A verifier that consults this node's registry and revocation list.
    pub fn verifier(&self) -> Verifier<S, P, RevocationList> {
        Verifier::new(
            self.registry.clone(),
            self.engine.system().clone(),
            self.revocations.clone(),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Revocation and wire exchange
    // ─────────────────────────────────────────────────────────────────────────

    /// Revoke a credential. Returns false if it was already revoked.
    pub fn revoke(&self, credential_id: CredentialId) -> bool {
        self.revocations.revoke(credential_id)
    }

    /// Verify an encoded [`ProofResponse`] against `request`.
    pub async fn verify_response_bytes(
        &self,
        response: &[u8],
        request: &ProofRequest,
        params: &IssuerPublicParams,
    ) -> Result<VerificationResult> {
        let response = ProofResponse::decode(response)?;
        let result = self
            .verifier()
            .verify(&response.into(), request, params)
            .await?;
        Ok(result)
    }
}
