//! LedgerStore trait: the abstract interface for DID document persistence.
//!
//! The ledger is append-only. Every version of every document is kept;
//! "the document" is simply its highest version.

use async_trait::async_trait;
use veridid_core::{DidDocument, Ed25519PublicKey};

use crate::error::Result;

/// Result of inserting the first version of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Version 1 was stored.
    Inserted,
    /// The DID already has at least one version. Nothing was written.
    AlreadyExists,
}

/// Result of appending a new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendResult {
    /// The version was stored.
    Appended,
    /// The offered version is not `current_version + 1`. Nothing was written.
    Conflict {
        /// Highest stored version (0 if the DID is unknown).
        current_version: u64,
    },
}

/// The LedgerStore trait: async interface for document persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` keeps queries off the runtime threads.
///
/// # Design Notes
///
/// - **Append-only**: versions are never updated or deleted.
/// - **Optimistic concurrency**: `append_version` only succeeds when the
///   offered version directly follows the stored head.
/// - **Whole versions**: readers always get a complete document version.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Store version 1 of a new document.
    ///
    /// `document.version` must be 1.
    async fn insert_document(&self, document: &DidDocument) -> Result<InsertResult>;

    /// Store the next version of an existing document.
    async fn append_version(&self, document: &DidDocument) -> Result<AppendResult>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the highest version of a document.
    async fn latest(&self, did: &str) -> Result<Option<DidDocument>>;

    /// Get a specific version of a document.
    async fn version(&self, did: &str, version: u64) -> Result<Option<DidDocument>>;

    /// All versions of a document, oldest first.
    async fn history(&self, did: &str) -> Result<Vec<DidDocument>>;

    /// List DIDs in lexicographic order, optionally filtered by controller.
    async fn list_dids(&self, controller: Option<&Ed25519PublicKey>) -> Result<Vec<String>>;

    /// Check whether a DID has any stored version.
    async fn contains(&self, did: &str) -> Result<bool> {
        Ok(self.latest(did).await?.is_some())
    }
}
