//! Error types for the registry.

use thiserror::Error;
use veridid_core::{SchemaId, ValidationError};
use veridid_store::StoreError;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A document with this DID already exists.
    #[error("DID already exists: {0}")]
    AlreadyExists(String),

    /// No document with this DID.
    #[error("DID not found: {0}")]
    NotFound(String),

    /// The caller is not the document's controller.
    #[error("not authorized to modify {0}")]
    Unauthorized(String),

    /// The document is deactivated and can no longer change.
    #[error("DID is deactivated: {0}")]
    Deactivated(String),

    /// DID syntax or document fields are invalid.
    #[error("invalid document: {0}")]
    InvalidDocument(ValidationError),

    /// Another writer appended a version first. Nothing was applied.
    #[error("version conflict on {did}: ledger is at version {current_version}")]
    Conflict { did: String, current_version: u64 },

    /// Schema definition is invalid.
    #[error("invalid schema: {0}")]
    InvalidSchema(ValidationError),

    /// No schema with this id.
    #[error("schema not found: {0:?}")]
    SchemaNotFound(SchemaId),

    /// A signed request failed to verify or decode.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Ledger failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Stable machine-readable code, used in [`crate::RegistryResponse::Error`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Deactivated(_) => "deactivated",
            Self::InvalidDocument(_) => "invalid_document",
            Self::Conflict { .. } => "conflict",
            Self::InvalidSchema(_) => "invalid_schema",
            Self::SchemaNotFound(_) => "schema_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Store(_) => "store",
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
