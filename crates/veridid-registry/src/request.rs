//! Signed registry requests as delivered by a transport.
//!
//! The transport itself is out of scope; it only has to carry the encoded
//! [`SignedRequest`] bytes and return the encoded [`RegistryResponse`].
//!
//! Mutations name the document version they were signed against, so a
//! captured request applies at most once: after it lands, the DID has
//! moved past that version and any replay fails with `Conflict`.

use serde::{Deserialize, Serialize};
use veridid_core::canonical::{self, domains, Canon, CANONICAL_VERSION};
use veridid_core::{
    decode_versioned, encode_versioned, Blake3Hash, CoreError, DidDocument, Ed25519PublicKey,
    Ed25519Signature, Keypair, ServiceEndpoint, VerificationMethod,
};

/// A registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryRequest {
    /// Create a DID controlled by the signer.
    CreateDid {
        did: String,
        verification_methods: Vec<VerificationMethod>,
        services: Vec<ServiceEndpoint>,
        data_hash: Blake3Hash,
    },
    /// Replace the mutable fields of the document at `expected_version`.
    UpdateDid {
        did: String,
        expected_version: u64,
        verification_methods: Vec<VerificationMethod>,
        services: Vec<ServiceEndpoint>,
        data_hash: Blake3Hash,
    },
    /// Deactivate the document at `expected_version`.
    DeactivateDid {
        did: String,
        expected_version: u64,
    },
    ResolveDid {
        did: String,
    },
    IsActive {
        did: String,
    },
}

impl RegistryRequest {
    /// The DID the request is about.
    pub fn did(&self) -> &str {
        match self {
            Self::CreateDid { did, .. }
            | Self::UpdateDid { did, .. }
            | Self::DeactivateDid { did, .. }
            | Self::ResolveDid { did }
            | Self::IsActive { did } => did,
        }
    }

    /// Canonical form. Keys: 0 kind, 1 did, 2 methods, 3 services,
    /// 4 data hash, 5 expected version. Absent fields are omitted.
    fn canon(&self) -> Canon<'_> {
        let mut entries = Vec::with_capacity(6);
        let kind = match self {
            Self::CreateDid {
                verification_methods,
                services,
                data_hash,
                ..
            } => {
                entries.push((2, methods_canon(verification_methods)));
                entries.push((3, services_canon(services)));
                entries.push((4, Canon::Bytes(data_hash.as_bytes())));
                0
            }
            Self::UpdateDid {
                expected_version,
                verification_methods,
                services,
                data_hash,
                ..
            } => {
                entries.push((2, methods_canon(verification_methods)));
                entries.push((3, services_canon(services)));
                entries.push((4, Canon::Bytes(data_hash.as_bytes())));
                entries.push((5, Canon::Uint(*expected_version)));
                1
            }
            Self::DeactivateDid {
                expected_version, ..
            } => {
                entries.push((5, Canon::Uint(*expected_version)));
                2
            }
            Self::ResolveDid { .. } => 3,
            Self::IsActive { .. } => 4,
        };
        entries.push((0, Canon::Uint(kind)));
        entries.push((1, Canon::Text(self.did())));
        Canon::Map(entries)
    }
}

fn methods_canon(methods: &[VerificationMethod]) -> Canon<'_> {
    Canon::Array(
        methods
            .iter()
            .map(|m| {
                let key = match &m.public_key {
                    Some(key) => Canon::Bytes(key.as_bytes()),
                    None => Canon::Null,
                };
                Canon::Array(vec![Canon::Text(&m.id), key])
            })
            .collect(),
    )
}

fn services_canon(services: &[ServiceEndpoint]) -> Canon<'_> {
    Canon::Array(
        services
            .iter()
            .map(|s| {
                Canon::Array(vec![
                    Canon::Text(&s.id),
                    Canon::Text(&s.service_type),
                    Canon::Text(&s.endpoint),
                ])
            })
            .collect(),
    )
}

/// A request plus the caller's signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub request: RegistryRequest,
    pub caller: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

impl SignedRequest {
    /// Sign `request` as `keypair`.
    pub fn sign(request: RegistryRequest, keypair: &Keypair) -> Self {
        let caller = keypair.public_key();
        let message = Self::signing_message(&request, &caller);
        Self {
            signature: keypair.sign(&message),
            request,
            caller,
        }
    }

    /// `REQUEST_SIGNATURE || canonical_map`.
    pub fn signing_message(request: &RegistryRequest, caller: &Ed25519PublicKey) -> Vec<u8> {
        let body = canonical::encode(&Canon::Map(vec![
            (0, Canon::Uint(CANONICAL_VERSION)),
            (1, request.canon()),
            (2, Canon::Bytes(caller.as_bytes())),
        ]));

        let mut msg = Vec::with_capacity(domains::REQUEST_SIGNATURE.len() + body.len());
        msg.extend_from_slice(domains::REQUEST_SIGNATURE);
        msg.extend_from_slice(&body);
        msg
    }

    /// Check the caller's signature.
    pub fn verify(&self) -> Result<(), CoreError> {
        let message = Self::signing_message(&self.request, &self.caller);
        self.caller.verify(&message, &self.signature)
    }

    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }
}

/// Outcome of a [`SignedRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryResponse {
    /// A mutation was applied (or was an idempotent no-op).
    Done,
    /// Answer to `ResolveDid`.
    Document(Option<DidDocument>),
    /// Answer to `IsActive`.
    Active(bool),
    Error {
        code: String,
        message: String,
    },
}

impl RegistryResponse {
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
