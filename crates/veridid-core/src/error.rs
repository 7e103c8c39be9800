//! Error types for veridid core.

use thiserror::Error;

/// Core errors raised by primitives and encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("unsupported encoding version: {0}")]
    UnsupportedVersion(u8),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Structural and cryptographic validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("too many verification methods: {count} (max {max})")]
    TooManyVerificationMethods { count: usize, max: usize },

    #[error("too many services: {count} (max {max})")]
    TooManyServices { count: usize, max: usize },

    #[error("duplicate verification method id: {0}")]
    DuplicateMethodId(String),

    #[error("duplicate service id: {0}")]
    DuplicateServiceId(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("attribute count mismatch: schema has {expected}, credential has {got}")]
    AttributeCountMismatch { expected: usize, got: usize },

    #[error("attribute {index} is named {got:?}, schema expects {expected:?}")]
    AttributeNameMismatch {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("opening for attribute {0} does not match its commitment")]
    CommitmentMismatch(u32),

    #[error("credential is missing the opening for attribute {0}")]
    MissingOpening(u32),

    #[error("credential signature verification failed")]
    SignatureFailed,
}
