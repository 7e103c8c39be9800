//! Presentation verification.
//!
//! Checks run in a fixed order so every rejection names one specific
//! reason:
//!
//! 0. decode the blob's statement
//! 1. issuer and holder DIDs exist and are active now; credential not revoked
//! 2. schema and disclosed index set match the request
//! 3. challenge matches this session
//! 4. backend verification, then the envelope's values against the verified ones

use std::collections::BTreeMap;
use std::sync::Arc;

use veridid_core::{CredentialId, DidDocument, Ed25519PublicKey, ProofId, SchemaId};
use veridid_registry::DidRegistry;
use veridid_store::LedgerStore;

use crate::commitment::CommitmentProofSystem;
use crate::engine::DisclosureProof;
use crate::error::VerifyError;
use crate::issuer::IssuerPublicParams;
use crate::messages::ProofRequest;
use crate::revocation::{RevocationList, RevocationRegistry};
use crate::system::ProofSystem;

/// A disclosed attribute in a [`VerificationResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosedAttribute {
    pub name: String,
    pub value: String,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub valid: bool,
    pub credential_id: CredentialId,
    pub issuer_did: String,
    pub holder_did: String,
    pub schema_id: SchemaId,
    /// Attribute index -> disclosed name and value.
    pub disclosed: BTreeMap<u32, DisclosedAttribute>,
}

impl VerificationResult {
    /// Disclosed value of the attribute called `name`, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.disclosed
            .values()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Verifies presentations against live registry state.
pub struct Verifier<S, P = CommitmentProofSystem, R = RevocationList>
where
    S: LedgerStore,
    P: ProofSystem,
    R: RevocationRegistry,
{
    registry: Arc<DidRegistry<S>>,
    system: Arc<P>,
    revocations: Arc<R>,
}

impl<S, P, R> Verifier<S, P, R>
where
    S: LedgerStore,
    P: ProofSystem,
    R: RevocationRegistry,
{
    pub fn new(registry: Arc<DidRegistry<S>>, system: Arc<P>, revocations: Arc<R>) -> Self {
        Self {
            registry,
            system,
            revocations,
        }
    }

    async fn live_document(
        &self,
        did: &str,
        unknown: fn(String) -> VerifyError,
        deactivated: fn(String) -> VerifyError,
    ) -> Result<DidDocument, VerifyError> {
        let document = self
            .registry
            .resolve(did)
            .await?
            .ok_or_else(|| unknown(did.to_string()))?;
        if !document.active {
            return Err(deactivated(did.to_string()));
        }
        Ok(document)
    }

    /// Verify `proof` as an answer to `request`.
    pub async fn verify(
        &self,
        proof: &DisclosureProof,
        request: &ProofRequest,
        params: &IssuerPublicParams,
    ) -> Result<VerificationResult, VerifyError> {
        let result = self.verify_inner(proof, request, params).await;
        if let Err(e) = &result {
            tracing::warn!(credential = ?proof.credential_id, "presentation rejected: {}", e);
        }
        result
    }

    async fn verify_inner(
        &self,
        proof: &DisclosureProof,
        request: &ProofRequest,
        params: &IssuerPublicParams,
    ) -> Result<VerificationResult, VerifyError> {
        // 0. Public statement
        let statement = self
            .system
            .statement(&proof.proof_blob)
            .map_err(|e| VerifyError::InvalidProof(e.to_string()))?;
        if statement.credential_id != proof.credential_id {
            return Err(VerifyError::InvalidProof(
                "proof blob names a different credential".into(),
            ));
        }

        // 1. Live issuer and holder, not revoked
        let issuer_doc = self
            .live_document(
                &statement.issuer_did,
                VerifyError::UnknownIssuer,
                VerifyError::IssuerDeactivated,
            )
            .await?;
        let holder_doc = self
            .live_document(
                &statement.holder_did,
                VerifyError::UnknownHolder,
                VerifyError::HolderDeactivated,
            )
            .await?;
        if self.revocations.is_revoked(&statement.credential_id).await? {
            return Err(VerifyError::RevokedCredential(statement.credential_id));
        }

        // 2. Schema and disclosure set
        for got in [statement.schema_id, params.schema_id()] {
            if got != request.schema_id {
                return Err(VerifyError::SchemaMismatch {
                    expected: request.schema_id,
                    got,
                });
            }
        }
        let requested = request.requested_indices();
        for revealed in [&statement.revealed_indices, &proof.revealed_indices] {
            if *revealed != requested {
                return Err(VerifyError::DisclosureMismatch {
                    requested,
                    revealed: revealed.clone(),
                });
            }
        }

        // 3. Session challenge
        if statement.challenge != request.challenge || proof.challenge != request.challenge {
            return Err(VerifyError::StaleChallenge);
        }

        // 4. Cryptographic verification
        if proof.proof_id != ProofId::of_blob(&proof.proof_blob) {
            return Err(VerifyError::InvalidProof("proof id does not match blob".into()));
        }
        if !issuer_doc.lists_key(&params.verification_key) {
            return Err(VerifyError::InvalidProof(
                "issuer key is not a verification method of the issuer DID".into(),
            ));
        }
        let holder_keys: Vec<Ed25519PublicKey> = holder_doc.ed25519_keys().copied().collect();
        let verified = self
            .system
            .verify(&proof.proof_blob, params, &holder_keys)
            .map_err(|e| VerifyError::InvalidProof(e.to_string()))?;

        let verified_values: Vec<&str> = verified.revealed.iter().map(|r| r.value.as_str()).collect();
        if proof.revealed_values.len() != verified_values.len()
            || proof
                .revealed_values
                .iter()
                .zip(&verified_values)
                .any(|(claimed, verified)| claimed != verified)
        {
            return Err(VerifyError::InvalidProof(
                "revealed values differ from the proven openings".into(),
            ));
        }

        let disclosed = verified
            .revealed
            .into_iter()
            .map(|r| {
                (
                    r.index,
                    DisclosedAttribute {
                        name: r.name,
                        value: r.value,
                    },
                )
            })
            .collect();

        tracing::info!(
            credential = ?statement.credential_id,
            issuer = %statement.issuer_did,
            holder = %statement.holder_did,
            "presentation verified"
        );

        Ok(VerificationResult {
            valid: true,
            credential_id: statement.credential_id,
            issuer_did: statement.issuer_did,
            holder_did: statement.holder_did,
            schema_id: statement.schema_id,
            disclosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProofEngine;
    use crate::error::VerifyError;
    use crate::issuer::Issuer;
    use veridid_core::{Blake3Hash, Challenge, Credential, Keypair, Schema, VerificationMethod};
    use veridid_registry::{RegistryConfig, SchemaRegistry};
    use veridid_store::MemoryLedger;

    struct Setup {
        registry: Arc<DidRegistry<MemoryLedger>>,
        revocations: Arc<RevocationList>,
        verifier: Verifier<MemoryLedger>,
        engine: ProofEngine,
        issuer_key: Keypair,
        holder_key: Keypair,
        params: IssuerPublicParams,
        credential: Credential,
    }

    async fn setup() -> Setup {
        let registry = Arc::new(DidRegistry::new(MemoryLedger::new(), RegistryConfig::default()));
        let issuer_key = Keypair::from_seed(&[1; 32]);
        let holder_key = Keypair::from_seed(&[2; 32]);
        for (did, key) in [("did:example:issuer", &issuer_key), ("did:example:holder", &holder_key)] {
            registry
                .create(
                    did,
                    key.public_key(),
                    vec![VerificationMethod::ed25519("k1", key.public_key())],
                    vec![],
                    Blake3Hash::ZERO,
                )
                .await
                .unwrap();
        }

        let issuer = Issuer::new(
            "did:example:issuer",
            issuer_key.clone(),
            registry.clone(),
            Arc::new(SchemaRegistry::new()),
        );
        let schema_id = issuer
            .register_schema(Schema::new("kyc", "1.0", ["age", "country", "verified"]))
            .await
            .unwrap();
        let credential = issuer
            .issue("did:example:holder", &schema_id, &["34", "US", "true"])
            .await
            .unwrap();
        let params = issuer.public_params(&schema_id).unwrap();

        let engine = ProofEngine::default();
        let revocations = Arc::new(RevocationList::new());
        let verifier = Verifier::new(registry.clone(), engine.system().clone(), revocations.clone());

        Setup {
            registry,
            revocations,
            verifier,
            engine,
            issuer_key,
            holder_key,
            params,
            credential,
        }
    }

    fn request(s: &Setup, indices: Vec<u32>, nonce: &str) -> ProofRequest {
        ProofRequest::with_challenge(s.params.schema_id(), indices, Challenge::from(nonce))
    }

    fn prove(s: &Setup, indices: &[u32], nonce: &str) -> DisclosureProof {
        s.engine
            .prove(&s.credential, &s.holder_key, indices, &Challenge::from(nonce))
            .unwrap()
    }

    #[tokio::test]
    async fn test_verify_disclosed_subset() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");
        let result = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.disclosed.len(), 1);
        assert_eq!(
            result.disclosed[&0],
            DisclosedAttribute {
                name: "age".into(),
                value: "34".into()
            }
        );
        assert_eq!(result.value("age"), Some("34"));
        assert_eq!(result.value("country"), None);
        assert_eq!(result.holder_did, "did:example:holder");
    }

    #[tokio::test]
    async fn test_replay_with_other_challenge_is_stale() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-2"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::StaleChallenge));
    }

    #[tokio::test]
    async fn test_envelope_challenge_swap_is_stale() {
        let s = setup().await;
        let mut proof = prove(&s, &[0], "nonce-1");
        proof.challenge = Challenge::from("nonce-2");
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-2"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::StaleChallenge));
    }

    #[tokio::test]
    async fn test_disclosure_must_match_request() {
        let s = setup().await;
        let proof = prove(&s, &[0, 1], "nonce-1");
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::DisclosureMismatch { .. }));
    }

    #[tokio::test]
    async fn test_schema_mismatch() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");
        let other = ProofRequest::with_challenge(
            Schema::new("other", "1", ["age"]).id(),
            vec![0],
            Challenge::from("nonce-1"),
        );
        let err = s.verifier.verify(&proof, &other, &s.params).await.unwrap_err();
        assert!(matches!(err, VerifyError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn test_tampered_values_rejected() {
        let s = setup().await;
        let mut proof = prove(&s, &[0], "nonce-1");
        proof.revealed_values = vec!["21".into()];
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidProof(_)));
    }

    #[tokio::test]
    async fn test_deactivated_parties_rejected() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");

        s.registry
            .deactivate("did:example:holder", &s.holder_key.public_key())
            .await
            .unwrap();
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::HolderDeactivated(_)));

        s.registry
            .deactivate("did:example:issuer", &s.issuer_key.public_key())
            .await
            .unwrap();
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::IssuerDeactivated(_)));
    }

    #[tokio::test]
    async fn test_revoked_credential_rejected() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");
        s.revocations.revoke(s.credential.credential_id);

        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::RevokedCredential(id) if id == s.credential.credential_id));
    }

    #[tokio::test]
    async fn test_holder_key_rotated_out_rejected() {
        let s = setup().await;
        let proof = prove(&s, &[0], "nonce-1");

        let new_key = Keypair::from_seed(&[3; 32]);
        s.registry
            .update(
                "did:example:holder",
                &s.holder_key.public_key(),
                vec![VerificationMethod::ed25519("k2", new_key.public_key())],
                vec![],
                Blake3Hash::ZERO,
            )
            .await
            .unwrap();

        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidProof(_)));
    }

    #[tokio::test]
    async fn test_mismatched_credential_id_rejected() {
        let s = setup().await;
        let mut proof = prove(&s, &[0], "nonce-1");
        proof.credential_id = CredentialId::from_bytes([0; 32]);
        let err = s
            .verifier
            .verify(&proof, &request(&s, vec![0], "nonce-1"), &s.params)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidProof(_)));
    }
}
