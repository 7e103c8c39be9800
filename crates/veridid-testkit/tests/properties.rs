//! Property tests over generated DIDs, schemas and credentials.

use std::future::Future;
use std::sync::Arc;

use proptest::prelude::*;
use veridid_core::{Blake3Hash, VerificationMethod};
use veridid_proof::{
    CommitmentProofSystem, DisclosureProof, IssuerPublicParams, ProofEngine, ProofRequest,
    ProofSystem, RevocationList, VerifyError, Verifier,
};
use veridid_registry::{DidRegistry, RegistryConfig, RegistryError};
use veridid_store::MemoryLedger;
use veridid_testkit::generators::{blake3_hash, challenge, did, keypair};
use veridid_testkit::{credential_from_params, CredentialParams};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn params_for(p: &CredentialParams) -> IssuerPublicParams {
    IssuerPublicParams {
        issuer_did: "did:example:issuer".into(),
        verification_key: p.issuer().public_key(),
        schema: p.schema.clone(),
    }
}

fn sorted_unique(indices: &[u32]) -> Vec<u32> {
    let mut v = indices.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

async fn registry_with_parties(p: &CredentialParams) -> Arc<DidRegistry<MemoryLedger>> {
    let registry = Arc::new(DidRegistry::new(MemoryLedger::new(), RegistryConfig::default()));
    for (did, key) in [("did:example:issuer", p.issuer()), ("did:example:holder", p.holder())] {
        registry
            .create(
                did,
                key.public_key(),
                vec![VerificationMethod::ed25519("key-1", key.public_key())],
                vec![],
                Blake3Hash::ZERO,
            )
            .await
            .unwrap();
    }
    registry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prove_verify_discloses_exactly_the_subset(p: CredentialParams) {
        let credential = credential_from_params(&p);
        let engine: ProofEngine = ProofEngine::default();
        let proof = engine.prove(&credential, &p.holder(), &p.reveal, &p.challenge).unwrap();

        let verified = CommitmentProofSystem
            .verify(&proof.proof_blob, &params_for(&p), &[p.holder().public_key()])
            .unwrap();

        let expected = sorted_unique(&p.reveal);
        let indices: Vec<u32> = verified.revealed.iter().map(|r| r.index).collect();
        prop_assert_eq!(&indices, &expected);
        for r in &verified.revealed {
            prop_assert_eq!(&r.value, &p.values[r.index as usize]);
            prop_assert_eq!(&r.name, &p.schema.attributes[r.index as usize]);
        }
        let values: Vec<String> = verified.revealed.iter().map(|r| r.value.clone()).collect();
        prop_assert_eq!(&proof.revealed_values, &values);
    }

    #[test]
    fn hidden_values_do_not_occur_in_the_blob(p: CredentialParams) {
        let credential = credential_from_params(&p);
        let engine: ProofEngine = ProofEngine::default();
        let proof = engine.prove(&credential, &p.holder(), &p.reveal, &p.challenge).unwrap();

        let statement = CommitmentProofSystem.statement(&proof.proof_blob).unwrap();
        let revealed = sorted_unique(&p.reveal);
        prop_assert_eq!(&statement.revealed_indices, &revealed);

        let blob = proof.proof_blob.as_ref();
        for (i, value) in p.values.iter().enumerate() {
            if revealed.contains(&(i as u32)) || value.len() < 16 {
                continue;
            }
            // Skip values that also occur inside some public string.
            let mut public: Vec<&str> = vec![
                p.schema.name.as_str(),
                p.schema.version.as_str(),
                "did:example:issuer",
                "did:example:holder",
            ];
            public.extend(p.schema.attributes.iter().map(String::as_str));
            public.extend(revealed.iter().map(|&j| p.values[j as usize].as_str()));
            if public.iter().any(|s| s.contains(value.as_str())) {
                continue;
            }
            prop_assert!(!blob.windows(value.len()).any(|w| w == value.as_bytes()));
        }
    }

    #[test]
    fn a_proof_only_answers_its_own_challenge(p: CredentialParams, other in challenge()) {
        prop_assume!(other != p.challenge);
        let credential = credential_from_params(&p);
        let engine: ProofEngine = ProofEngine::default();
        let proof: DisclosureProof = engine
            .prove(&credential, &p.holder(), &p.reveal, &p.challenge)
            .unwrap();

        block_on(async {
            let registry = registry_with_parties(&p).await;
            let verifier: Verifier<MemoryLedger> = Verifier::new(
                registry,
                Arc::new(CommitmentProofSystem),
                Arc::new(RevocationList::new()),
            );
            let params = params_for(&p);

            let fresh =
                ProofRequest::with_challenge(p.schema.id(), p.reveal.clone(), p.challenge.clone());
            let result = verifier.verify(&proof, &fresh, &params).await.unwrap();
            assert_eq!(result.disclosed.len(), sorted_unique(&p.reveal).len());

            let replayed = ProofRequest::with_challenge(p.schema.id(), p.reveal.clone(), other);
            let err = verifier.verify(&proof, &replayed, &params).await.unwrap_err();
            assert!(matches!(err, VerifyError::StaleChallenge));
        });
    }

    #[test]
    fn create_then_resolve_matches_arguments(
        id in did(),
        controller in keypair(),
        method_key in keypair(),
        data_hash in blake3_hash(),
    ) {
        block_on(async {
            let registry = DidRegistry::new(MemoryLedger::new(), RegistryConfig::default());
            let methods = vec![VerificationMethod::ed25519("key-1", method_key.public_key())];
            registry
                .create(&id, controller.public_key(), methods.clone(), vec![], data_hash)
                .await
                .unwrap();

            let doc = registry.resolve(&id).await.unwrap().unwrap();
            assert!(doc.active);
            assert_eq!(doc.id, id);
            assert_eq!(doc.controller, controller.public_key());
            assert_eq!(doc.verification_methods, methods);
            assert_eq!(doc.data_hash, data_hash);

            let err = registry
                .create(&id, method_key.public_key(), vec![], vec![], data_hash)
                .await
                .unwrap_err();
            assert!(matches!(err, RegistryError::AlreadyExists(_)));
        });
    }

    #[test]
    fn non_controller_cannot_mutate(id in did(), a in keypair(), b in keypair()) {
        prop_assume!(a.public_key() != b.public_key());
        block_on(async {
            let registry = DidRegistry::new(MemoryLedger::new(), RegistryConfig::default());
            let before = registry
                .create(&id, a.public_key(), vec![], vec![], Blake3Hash::ZERO)
                .await
                .unwrap();

            let err = registry
                .update(&id, &b.public_key(), vec![], vec![], Blake3Hash::hash(b"x"))
                .await
                .unwrap_err();
            assert!(matches!(err, RegistryError::Unauthorized(_)));
            let err = registry.deactivate(&id, &b.public_key()).await.unwrap_err();
            assert!(matches!(err, RegistryError::Unauthorized(_)));

            assert_eq!(registry.resolve(&id).await.unwrap(), Some(before));
        });
    }
}
