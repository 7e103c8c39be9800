//! DID documents: the registry's unit of state.
//!
//! A document is owned by exactly one controller key. Each mutation is
//! stored as a new, complete version; older versions stay readable for audit.

use serde::{Deserialize, Serialize};

use crate::crypto::{Blake3Hash, Ed25519PublicKey};

/// A key descriptor listed in a DID document.
///
/// Methods without key material are plain references (for example a key
/// held in an external KMS). Only methods carrying an Ed25519 key can
/// authenticate a credential holder or issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Identifier of the method, unique within its document.
    pub id: String,
    /// Ed25519 public key, if the method carries one.
    pub public_key: Option<Ed25519PublicKey>,
}

impl VerificationMethod {
    /// A method that only names a key.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            public_key: None,
        }
    }

    /// A method carrying an Ed25519 key.
    pub fn ed25519(id: impl Into<String>, public_key: Ed25519PublicKey) -> Self {
        Self {
            id: id.into(),
            public_key: Some(public_key),
        }
    }
}

/// A service endpoint listed in a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub id: String,
    pub service_type: String,
    pub endpoint: String,
}

impl ServiceEndpoint {
    pub fn new(
        id: impl Into<String>,
        service_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_type: service_type.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Lifecycle state of a DID.
///
/// `NonExistent -> Active -> Deactivated`; there is no way back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DidStatus {
    NonExistent,
    Active,
    Deactivated,
}

/// One version of a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// The DID, immutable once created.
    pub id: String,

    /// The exclusive owner.
    pub controller: Ed25519PublicKey,

    /// Ordered key descriptors.
    pub verification_methods: Vec<VerificationMethod>,

    /// Ordered service endpoints.
    pub services: Vec<ServiceEndpoint>,

    /// Commitment to off-registry document content.
    pub data_hash: Blake3Hash,

    /// Last-modified time (Unix milliseconds).
    pub timestamp: i64,

    /// Lifecycle flag. Once false, stays false.
    pub active: bool,

    /// 1 on create, incremented by every stored mutation.
    pub version: u64,
}

impl DidDocument {
    /// Lifecycle status of this version.
    pub fn status(&self) -> DidStatus {
        if self.active {
            DidStatus::Active
        } else {
            DidStatus::Deactivated
        }
    }

    /// Ed25519 keys listed in the document's verification methods, in order.
    pub fn ed25519_keys(&self) -> impl Iterator<Item = &Ed25519PublicKey> {
        self.verification_methods
            .iter()
            .filter_map(|m| m.public_key.as_ref())
    }

    /// Whether `key` is one of the document's Ed25519 verification methods.
    pub fn lists_key(&self, key: &Ed25519PublicKey) -> bool {
        self.ed25519_keys().any(|k| k == key)
    }

    /// Render a W3C DID Core style JSON view of this version.
    pub fn to_json(&self) -> serde_json::Value {
        let methods: Vec<serde_json::Value> = self
            .verification_methods
            .iter()
            .map(|m| {
                let mut entry = serde_json::json!({
                    "id": format!("{}#{}", self.id, m.id),
                    "controller": self.id,
                });
                if let Some(pk) = &m.public_key {
                    entry["type"] = "Ed25519VerificationKey2020".into();
                    entry["publicKeyHex"] = pk.to_hex().into();
                }
                entry
            })
            .collect();

        let services: Vec<serde_json::Value> = self
            .services
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": format!("{}#{}", self.id, s.id),
                    "type": s.service_type,
                    "serviceEndpoint": s.endpoint,
                })
            })
            .collect();

        serde_json::json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": self.id,
            "controller": self.controller.to_hex(),
            "verificationMethod": methods,
            "service": services,
            "dataHash": self.data_hash.to_hex(),
            "updated": self.timestamp,
            "deactivated": !self.active,
            "versionId": self.version,
        })
    }
}
