//! # veridid proof
//!
//! Credential issuance, selective-disclosure proofs, and verification.
//!
//! ## Flow
//!
//! 1. An [`Issuer`] registers a schema and issues a credential: one
//!    commitment per attribute value, signed by the issuer's DID key.
//! 2. The holder keeps it in a [`Wallet`].
//! 3. A verifier sends a [`ProofRequest`] with a fresh challenge.
//! 4. The holder answers with a presentation built by the [`ProofEngine`].
//! 5. The [`Verifier`] checks it against live registry state and returns
//!    only the disclosed attributes.
//!
//! The cryptography sits behind [`ProofSystem`]. The bundled
//! [`CommitmentProofSystem`] uses salted Blake3 commitments and Ed25519
//! signatures. It hides undisclosed values, but presentations of the same
//! credential are linkable through the credential id and commitments.

pub mod commitment;
pub mod engine;
pub mod error;
pub mod issuer;
pub mod messages;
pub mod revocation;
pub mod system;
pub mod verifier;
pub mod wallet;

pub use commitment::CommitmentProofSystem;
pub use engine::{DisclosureProof, ProofEngine};
pub use error::{BackendError, IssueError, ProveError, RevocationError, VerifyError, WalletError};
pub use issuer::{Issuer, IssuerPublicParams};
pub use messages::{ProofRequest, ProofResponse};
pub use revocation::{NoRevocation, RevocationList, RevocationRegistry};
pub use system::{ProofStatement, ProofSystem, RevealedAttribute, VerifiedDisclosure};
pub use verifier::{DisclosedAttribute, VerificationResult, Verifier};
pub use wallet::Wallet;
