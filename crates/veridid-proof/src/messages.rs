//! Proof exchange messages between verifier and holder.
//!
//! A verifier sends a [`ProofRequest`] with a fresh challenge; the holder
//! answers with a [`ProofResponse`]. Both travel in the versioned CBOR
//! envelope.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use veridid_core::{
    decode_versioned, encode_versioned, Challenge, CoreError, CredentialId, ProofId, SchemaId,
};

use crate::engine::{normalize_indices, DisclosureProof};

/// Which attributes of which schema a verifier wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub schema_id: SchemaId,
    pub requested_attribute_indices: Vec<u32>,
    pub challenge: Challenge,
}

impl ProofRequest {
    /// A request with a fresh random challenge.
    pub fn new(schema_id: SchemaId, requested_attribute_indices: Vec<u32>) -> Self {
        Self::with_challenge(schema_id, requested_attribute_indices, Challenge::random())
    }

    pub fn with_challenge(
        schema_id: SchemaId,
        requested_attribute_indices: Vec<u32>,
        challenge: Challenge,
    ) -> Self {
        Self {
            schema_id,
            requested_attribute_indices,
            challenge,
        }
    }

    /// Requested indices, sorted and deduplicated.
    pub fn requested_indices(&self) -> Vec<u32> {
        normalize_indices(&self.requested_attribute_indices)
    }

    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }
}

/// A holder's answer to a [`ProofRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResponse {
    pub proof_id: ProofId,
    pub credential_id: CredentialId,
    pub revealed_indices: Vec<u32>,
    pub revealed_values: Vec<String>,
    pub proof_blob: Bytes,
    pub challenge: Challenge,
}

impl ProofResponse {
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }
}

impl From<DisclosureProof> for ProofResponse {
    fn from(proof: DisclosureProof) -> Self {
        Self {
            proof_id: proof.proof_id,
            credential_id: proof.credential_id,
            revealed_indices: proof.revealed_indices,
            revealed_values: proof.revealed_values,
            proof_blob: proof.proof_blob,
            challenge: proof.challenge,
        }
    }
}

impl From<ProofResponse> for DisclosureProof {
    fn from(response: ProofResponse) -> Self {
        Self {
            proof_id: response.proof_id,
            credential_id: response.credential_id,
            revealed_indices: response.revealed_indices,
            revealed_values: response.revealed_values,
            proof_blob: response.proof_blob,
            challenge: response.challenge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_has_fresh_challenge() {
        let sid = SchemaId::from_bytes([1; 32]);
        let a = ProofRequest::new(sid, vec![0]);
        let b = ProofRequest::new(sid, vec![0]);
        assert_ne!(a.challenge, b.challenge);
        assert_eq!(a.challenge.as_bytes().len(), Challenge::RANDOM_LEN);
    }

    #[test]
    fn test_requested_indices_normalized() {
        let request = ProofRequest::with_challenge(
            SchemaId::from_bytes([1; 32]),
            vec![2, 0, 2],
            Challenge::from("nonce-1"),
        );
        assert_eq!(request.requested_indices(), [0, 2]);
    }

    #[test]
    fn test_request_wire_roundtrip() {
        let request = ProofRequest::with_challenge(
            SchemaId::from_bytes([1; 32]),
            vec![0],
            Challenge::from("nonce-1"),
        );
        let decoded = ProofRequest::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_response_converts_to_proof() {
        let response = ProofResponse {
            proof_id: ProofId::of_blob(b"blob"),
            credential_id: CredentialId::from_bytes([3; 32]),
            revealed_indices: vec![0],
            revealed_values: vec!["34".into()],
            proof_blob: Bytes::from_static(b"blob"),
            challenge: Challenge::from("nonce-1"),
        };
        let proof: DisclosureProof = response.clone().into();
        assert_eq!(ProofResponse::from(proof), response);

        let decoded = ProofResponse::decode(&response.encode().unwrap()).unwrap();
        assert_eq!(decoded, response);
    }
}
