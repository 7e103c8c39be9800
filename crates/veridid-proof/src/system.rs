//! # Proof System Trait
//!
//! The seam between the disclosure protocol and the cryptography that backs
//! it. Issuer, engine and verifier only ever see opaque proof blobs and the
//! [`ProofStatement`] a backend extracts from them, so a backend can be
//! swapped (for example for an unlinkable signature scheme) without touching
//! the registry or issuance.
//!
//! Implementations must be `Send + Sync` and side-effect free: proving and
//! verification never touch the registry.

use veridid_core::{Challenge, Credential, CredentialId, Ed25519PublicKey, Keypair, SchemaId};

use crate::error::BackendError;
use crate::issuer::IssuerPublicParams;

/// Public claims carried by a proof blob, readable before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStatement {
    pub credential_id: CredentialId,
    pub issuer_did: String,
    pub holder_did: String,
    pub schema_id: SchemaId,
    /// Sorted, without duplicates.
    pub revealed_indices: Vec<u32>,
    pub challenge: Challenge,
    /// Key the holder proved possession of.
    pub holder_key: Ed25519PublicKey,
}

/// One attribute whose value a verified proof disclosed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedAttribute {
    pub index: u32,
    pub name: String,
    pub value: String,
}

/// What a successfully verified proof establishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDisclosure {
    pub statement: ProofStatement,
    /// In index order.
    pub revealed: Vec<RevealedAttribute>,
}

/// Abstract interface for a selective-disclosure proof backend.
pub trait ProofSystem: Send + Sync {
    /// Short identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Produce a proof blob that discloses the attributes at `reveal`
    /// (sorted, deduplicated, in range) and is bound to `challenge`.
    fn prove(
        &self,
        credential: &Credential,
        holder_key: &Keypair,
        reveal: &[u32],
        challenge: &Challenge,
    ) -> Result<Vec<u8>, BackendError>;

    /// Decode the public statement of a blob without verifying it.
    fn statement(&self, blob: &[u8]) -> Result<ProofStatement, BackendError>;

    /// Verify a blob against the issuer's public parameters and the keys
    /// currently listed for the holder's DID.
    fn verify(
        &self,
        blob: &[u8],
        params: &IssuerPublicParams,
        holder_keys: &[Ed25519PublicKey],
    ) -> Result<VerifiedDisclosure, BackendError>;
}
