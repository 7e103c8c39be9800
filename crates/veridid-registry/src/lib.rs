//! # veridid registry
//!
//! The DID registry and the credential schema registry.
//!
//! ## Overview
//!
//! [`DidRegistry`] owns the mapping from DID to [`DidDocument`](veridid_core::DidDocument)
//! on top of any [`LedgerStore`](veridid_store::LedgerStore). It enforces the
//! lifecycle rules:
//!
//! - A DID is created once; any later create fails with `AlreadyExists`.
//! - Only the controller key may update or deactivate.
//! - Deactivation is terminal.
//!
//! Requests arriving over a transport are wrapped in a [`SignedRequest`];
//! [`DidRegistry::handle`] verifies the signature and dispatches with the
//! signer as caller.
//!
//! ## Key Types
//!
//! - [`DidRegistry`] - Document lifecycle and queries
//! - [`RegistryEvent`] - Lifecycle notifications via [`DidRegistry::subscribe`]
//! - [`SchemaRegistry`] - Content-addressed credential schemas

pub mod error;
pub mod events;
pub mod registry;
pub mod request;
pub mod schema;

pub use error::{RegistryError, Result};
pub use events::RegistryEvent;
pub use registry::{DidRegistry, RegistryConfig};
pub use request::{RegistryRequest, RegistryResponse, SignedRequest};
pub use schema::{SchemaRecord, SchemaRegistry};
