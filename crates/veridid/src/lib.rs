//! # veridid
//!
//! A DID registry with selective-disclosure verifiable credentials.
//!
//! ## Overview
//!
//! - **DID registry**: append-only record of DID documents; only the
//!   controller may update or deactivate, and deactivation is terminal
//! - **Issuance**: credentials commit to each attribute value and are
//!   signed by the issuer's DID key
//! - **Presentations**: the holder discloses a chosen subset of attributes,
//!   bound to a verifier challenge
//! - **Verification**: checked against the registry as it is now, so
//!   deactivating an issuer or holder invalidates later presentations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veridid::{Keypair, Node, NodeConfig, ProofRequest, Schema};
//!
//! async fn example() -> veridid::Result<()> {
//!     let node = Node::in_memory(NodeConfig::default());
//!
//!     let issuer_key = Keypair::generate();
//!     let holder_key = Keypair::generate();
//!     node.register_did("did:example:bank", &issuer_key, vec![]).await?;
//!     node.register_did("did:example:alice", &holder_key, vec![]).await?;
//!
//!     let issuer = node.issuer("did:example:bank", issuer_key);
//!     let schema_id = issuer
//!         .register_schema(Schema::new("kyc", "1.0", ["age", "country"]))
//!         .await?;
//!     let credential = issuer
//!         .issue("did:example:alice", &schema_id, &["34", "US"])
//!         .await?;
//!
//!     let mut wallet = node.wallet("did:example:alice", holder_key);
//!     let id = wallet.store(credential)?;
//!
//!     let request = ProofRequest::new(schema_id, vec![1]);
//!     let response = wallet.respond(&id, &request)?;
//!
//!     let params = issuer.public_params(&schema_id)?;
//!     let result = node
//!         .verifier()
//!         .verify(&response.into(), &request, &params)
//!         .await?;
//!     assert_eq!(result.value("country"), Some("US"));
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `veridid::core` - Primitives (documents, credentials, keys)
//! - `veridid::store` - Ledger storage and SQLite
//! - `veridid::registry` - DID and schema registries
//! - `veridid::proof` - Issuance, proofs, verification

pub mod error;
pub mod node;

pub use veridid_core as core;
pub use veridid_proof as proof;
pub use veridid_registry as registry;
pub use veridid_store as store;

pub use error::{NodeError, Result};
pub use node::{Node, NodeConfig};

pub use veridid_core::{
    Blake3Hash, Challenge, Credential, CredentialId, DidDocument, DidStatus, Ed25519PublicKey,
    Keypair, Schema, SchemaId, ServiceEndpoint, VerificationMethod,
};
pub use veridid_proof::{
    DisclosureProof, IssuerPublicParams, ProofRequest, ProofResponse, VerificationResult,
    VerifyError,
};
pub use veridid_registry::{RegistryConfig, RegistryError};
