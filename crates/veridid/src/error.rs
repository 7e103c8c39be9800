//! Error types for the node.

use thiserror::Error;
use veridid_core::CoreError;
use veridid_proof::{IssueError, ProveError, VerifyError, WalletError};
use veridid_registry::RegistryError;
use veridid_store::StoreError;

/// Errors that can occur during node operations.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("issuance error: {0}")]
    Issue(#[from] IssueError),

    #[error("proving error: {0}")]
    Prove(#[from] ProveError),

    /// A presentation was rejected.
    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Wire encoding or decoding failed.
    #[error("encoding error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
