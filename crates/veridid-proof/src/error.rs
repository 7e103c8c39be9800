//! Error types for issuance, proving, verification and the wallet.

use thiserror::Error;
use veridid_core::{CredentialId, SchemaId, ValidationError};
use veridid_registry::RegistryError;

/// Failure inside a [`ProofSystem`](crate::ProofSystem) backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The blob or witness could not be decoded or is structurally wrong.
    #[error("malformed: {0}")]
    Malformed(String),

    /// The proof decoded but does not verify.
    #[error("invalid: {0}")]
    Invalid(String),

    /// The proof could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// Errors from [`Issuer`](crate::Issuer).
#[derive(Debug, Error)]
pub enum IssueError {
    /// The issuer DID does not exist or is deactivated.
    #[error("unknown or inactive issuer: {0}")]
    UnknownIssuer(String),

    /// The holder DID does not exist or is deactivated.
    #[error("unknown or inactive holder: {0}")]
    UnknownHolder(String),

    #[error("unknown schema: {0:?}")]
    UnknownSchema(SchemaId),

    /// The number of values differs from the schema's attribute count.
    #[error("schema expects {expected} values, got {got}")]
    SchemaMismatch { expected: usize, got: usize },

    /// The issuer's signing key is not an Ed25519 verification method of its DID.
    #[error("signing key is not listed in {0}")]
    IssuerKeyNotListed(String),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors from [`ProofEngine`](crate::ProofEngine).
#[derive(Debug, Error)]
pub enum ProveError {
    #[error("attribute index {index} out of range (credential has {len})")]
    InvalidIndex { index: u32, len: usize },

    #[error("challenge is empty")]
    EmptyChallenge,

    /// The holder's openings do not match the credential's commitments.
    #[error("malformed credential: {0}")]
    MalformedCredential(ValidationError),

    #[error("proof backend failed: {0}")]
    Backend(BackendError),

    /// The background proving task was cancelled or panicked.
    #[error("proving task did not complete: {0}")]
    Cancelled(String),
}

/// Why a presentation was rejected.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    #[error("unknown issuer: {0}")]
    UnknownIssuer(String),

    #[error("unknown holder: {0}")]
    UnknownHolder(String),

    #[error("issuer DID is deactivated: {0}")]
    IssuerDeactivated(String),

    #[error("holder DID is deactivated: {0}")]
    HolderDeactivated(String),

    #[error("credential is revoked: {0:?}")]
    RevokedCredential(CredentialId),

    #[error("schema mismatch: expected {expected:?}, got {got:?}")]
    SchemaMismatch { expected: SchemaId, got: SchemaId },

    /// Revealed indices differ from the requested ones.
    #[error("disclosure mismatch: requested {requested:?}, revealed {revealed:?}")]
    DisclosureMismatch {
        requested: Vec<u32>,
        revealed: Vec<u32>,
    },

    /// The proof is bound to a different challenge than this session's.
    #[error("stale challenge")]
    StaleChallenge,

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("revocation check failed: {0}")]
    Revocation(#[from] RevocationError),
}

/// Failure of an external revocation source.
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("revocation source unavailable: {0}")]
    Unavailable(String),
}

/// Errors from [`Wallet`](crate::Wallet).
#[derive(Debug, Error)]
pub enum WalletError {
    /// The credential was issued to another DID.
    #[error("credential is for {got}, wallet holds {expected}")]
    HolderMismatch { expected: String, got: String },

    #[error("unknown credential: {0:?}")]
    UnknownCredential(CredentialId),

    /// The request asks about a different schema than the credential's.
    #[error("request is for schema {requested:?}, credential has {held:?}")]
    SchemaMismatch { requested: SchemaId, held: SchemaId },

    #[error("malformed credential: {0}")]
    MalformedCredential(ValidationError),

    #[error("proving failed: {0}")]
    Prove(#[from] ProveError),
}
