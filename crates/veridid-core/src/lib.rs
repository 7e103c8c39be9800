//! # veridid core
//!
//! Pure primitives for veridid: DID documents, credentials, attribute
//! commitments and canonicalization.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`DidDocument`] - One version of a DID's registry record
//! - [`Schema`] / [`SchemaId`] - Content-addressed credential schema
//! - [`Credential`] - Issuer-signed attribute commitments plus holder openings
//! - [`Challenge`] - Verifier nonce binding a presentation to one session
//!
//! ## Canonicalization
//!
//! Everything that is signed or hashed is encoded with deterministic CBOR.
//! See the [`canonical`] module. Transport uses the versioned envelope in
//! [`wire`].

pub mod canonical;
pub mod credential;
pub mod crypto;
pub mod document;
pub mod error;
pub mod types;
pub mod validation;
pub mod wire;

pub use credential::{
    commit_attribute, AttributeOpening, Blinding, CommittedAttribute, Credential, Schema,
    MAX_SCHEMA_ATTRIBUTES,
};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use document::{DidDocument, DidStatus, ServiceEndpoint, VerificationMethod};
pub use error::{CoreError, ValidationError};
pub use types::{Challenge, CredentialId, ProofId, SchemaId};
pub use validation::{
    validate_credential_structure, validate_did_id, validate_document_fields, validate_schema,
    verify_credential_signature, verify_openings, DocumentLimits, MAX_DID_LEN,
};
pub use wire::{decode_versioned, encode_versioned, WIRE_VERSION};

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
