//! # veridid testkit
//!
//! Testing utilities for veridid.
//!
//! ## Overview
//!
//! - **Golden vectors**: fixed schema ids and attribute commitments that any
//!   implementation must reproduce
//! - **Generators**: proptest strategies for DIDs, schemas and credentials
//! - **Fixtures**: a node with a registered issuer, holder and schema
//!
//! ## Golden Vectors
//!
//! ```rust
//! use veridid_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, commitment) in verify_all_vectors() {
//!     println!("{name}: {commitment} {}", if matches { "ok" } else { "MISMATCH" });
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veridid_testkit::generators::{credential_from_params, CredentialParams};
//!
//! proptest! {
//!     #[test]
//!     fn openings_match(params: CredentialParams) {
//!         let credential = credential_from_params(&params);
//!         prop_assert!(veridid_core::verify_openings(&credential).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use veridid_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new().await;
//! let credential = fixture.issue("34", "US", "true").await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{kyc_schema, multi_party, Party, TestFixture};
pub use generators::{credential_from_params, CredentialParams};
pub use vectors::{all_vectors, compute_vector, verify_all_vectors, vectors_json, GoldenVector};
