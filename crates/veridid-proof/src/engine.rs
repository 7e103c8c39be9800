//! The selective-disclosure proof engine.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use veridid_core::{verify_openings, Challenge, Credential, CredentialId, Keypair, ProofId};

use crate::commitment::CommitmentProofSystem;
use crate::error::ProveError;
use crate::system::ProofSystem;

/// A presentation of some attributes of one credential.
///
/// Single-use: bound to one verifier challenge. The engine never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureProof {
    /// Derived from `proof_blob`.
    pub proof_id: ProofId,
    pub credential_id: CredentialId,
    /// Sorted, without duplicates.
    pub revealed_indices: Vec<u32>,
    /// Values at `revealed_indices`, in the same order.
    pub revealed_values: Vec<String>,
    /// Backend proof bytes.
    pub proof_blob: Bytes,
    pub challenge: Challenge,
}

/// Normalize requested indices: sorted, deduplicated.
pub(crate) fn normalize_indices(indices: &[u32]) -> Vec<u32> {
    let mut indices = indices.to_vec();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Produces [`DisclosureProof`]s with a [`ProofSystem`] backend.
pub struct ProofEngine<P: ProofSystem = CommitmentProofSystem> {
    system: Arc<P>,
}

impl<P: ProofSystem> Clone for ProofEngine<P> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}

impl Default for ProofEngine<CommitmentProofSystem> {
    fn default() -> Self {
        Self::new(CommitmentProofSystem)
    }
}

impl<P: ProofSystem> ProofEngine<P> {
    pub fn new(system: P) -> Self {
        Self::with_shared(Arc::new(system))
    }

    pub fn with_shared(system: Arc<P>) -> Self {
        Self { system }
    }

    /// The backend, shared with verifiers that need it.
    pub fn system(&self) -> &Arc<P> {
        &self.system
    }

    /// Prove knowledge of `credential`, disclosing the attributes at
    /// `reveal_indices` and binding the proof to `challenge`.
    pub fn prove(
        &self,
        credential: &Credential,
        holder_key: &Keypair,
        reveal_indices: &[u32],
        challenge: &Challenge,
    ) -> Result<DisclosureProof, ProveError> {
        // 1. Indices in range
        let len = credential.attributes.len();
        let reveal = normalize_indices(reveal_indices);
        if let Some(&index) = reveal.iter().find(|&&i| i as usize >= len) {
            return Err(ProveError::InvalidIndex { index, len });
        }

        // 2. Challenge present
        if challenge.is_empty() {
            return Err(ProveError::EmptyChallenge);
        }

        // 3. Openings match commitments
        verify_openings(credential).map_err(ProveError::MalformedCredential)?;

        // 4. Backend proof
        let blob = self
            .system
            .prove(credential, holder_key, &reveal, challenge)
            .map_err(ProveError::Backend)?;

        let revealed_values = reveal
            .iter()
            .filter_map(|&i| credential.opening(i))
            .map(|o| o.value.clone())
            .collect();

        tracing::debug!(
            credential = ?credential.credential_id,
            backend = self.system.name(),
            revealed = ?reveal,
            "disclosure proof generated"
        );

        Ok(DisclosureProof {
            proof_id: ProofId::of_blob(&blob),
            credential_id: credential.credential_id,
            revealed_indices: reveal,
            revealed_values,
            proof_blob: Bytes::from(blob),
            challenge: challenge.clone(),
        })
    }
}

impl<P: ProofSystem + 'static> ProofEngine<P> {
    /// Run [`ProofEngine::prove`] on tokio's blocking pool.
    ///
    /// Dropping the returned future abandons the result; proving never
    /// touches the registry, so there is nothing to roll back.
    pub async fn prove_in_background(
        &self,
        credential: Credential,
        holder_key: Keypair,
        reveal_indices: Vec<u32>,
        challenge: Challenge,
    ) -> Result<DisclosureProof, ProveError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            engine.prove(&credential, &holder_key, &reveal_indices, &challenge)
        })
        .await
        .map_err(|e| ProveError::Cancelled(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridid_core::{
        commit_attribute, AttributeOpening, Blinding, CommittedAttribute, Ed25519Signature, Schema,
    };

    fn credential(issuer: &Keypair) -> Credential {
        let schema = Schema::new("kyc", "1.0", ["age", "country", "verified"]);
        let sid = schema.id();
        let mut attributes = Vec::new();
        let mut openings = Vec::new();
        for (i, (name, value)) in schema
            .attributes
            .iter()
            .zip(["34", "US", "true"])
            .enumerate()
        {
            let blinding = Blinding::random();
            attributes.push(CommittedAttribute {
                name: name.clone(),
                commitment: commit_attribute(&sid, i as u32, name, value, &blinding),
            });
            openings.push(AttributeOpening {
                index: i as u32,
                value: value.into(),
                blinding,
            });
        }
        let mut credential = Credential {
            credential_id: CredentialId::random(),
            issuer_did: "did:example:issuer".into(),
            holder_did: "did:example:holder".into(),
            schema_id: sid,
            attributes,
            openings,
            issued_at: 1,
            signature: Ed25519Signature::ZERO,
        };
        credential.signature = issuer.sign(&credential.signing_message());
        credential
    }

    #[test]
    fn test_prove_normalizes_indices() {
        let engine: ProofEngine = ProofEngine::default();
        let holder = Keypair::from_seed(&[2; 32]);
        let cred = credential(&Keypair::from_seed(&[1; 32]));

        let proof = engine
            .prove(&cred, &holder, &[2, 0, 2], &Challenge::from("nonce-1"))
            .unwrap();
        assert_eq!(proof.revealed_indices, [0, 2]);
        assert_eq!(proof.revealed_values, ["34", "true"]);
        assert_eq!(proof.proof_id, ProofId::of_blob(&proof.proof_blob));
        assert_eq!(proof.credential_id, cred.credential_id);
    }

    #[test]
    fn test_invalid_index() {
        let engine: ProofEngine = ProofEngine::default();
        let holder = Keypair::from_seed(&[2; 32]);
        let cred = credential(&Keypair::from_seed(&[1; 32]));

        let err = engine
            .prove(&cred, &holder, &[0, 3], &Challenge::from("n"))
            .unwrap_err();
        assert!(matches!(err, ProveError::InvalidIndex { index: 3, len: 3 }));
    }

    #[test]
    fn test_empty_challenge() {
        let engine: ProofEngine = ProofEngine::default();
        let holder = Keypair::from_seed(&[2; 32]);
        let cred = credential(&Keypair::from_seed(&[1; 32]));

        let err = engine
            .prove(&cred, &holder, &[0], &Challenge::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ProveError::EmptyChallenge));
    }

    #[test]
    fn test_malformed_credential() {
        let engine: ProofEngine = ProofEngine::default();
        let holder = Keypair::from_seed(&[2; 32]);
        let mut cred = credential(&Keypair::from_seed(&[1; 32]));
        cred.openings[2].value = "false".into();

        let err = engine
            .prove(&cred, &holder, &[0], &Challenge::from("n"))
            .unwrap_err();
        assert!(matches!(err, ProveError::MalformedCredential(_)));
    }

    #[tokio::test]
    async fn test_prove_in_background() {
        let engine: ProofEngine = ProofEngine::default();
        let holder = Keypair::from_seed(&[2; 32]);
        let cred = credential(&Keypair::from_seed(&[1; 32]));

        let proof = engine
            .prove_in_background(cred.clone(), holder, vec![1], Challenge::random())
            .await
            .unwrap();
        assert_eq!(proof.revealed_values, ["US"]);
    }
}
