use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use veridid_core::Challenge;
use veridid_proof::{CommitmentProofSystem, IssuerPublicParams, ProofEngine, ProofSystem};
use veridid_testkit::generators::{credential_from_params, CredentialParams};
use veridid_testkit::kyc_schema;

fn params() -> CredentialParams {
    let schema = kyc_schema();
    CredentialParams {
        issuer_seed: [1; 32],
        holder_seed: [2; 32],
        values: vec!["34".into(), "US".into(), "true".into()],
        blindings: vec![[0x11; 32], [0x22; 32], [0x33; 32]],
        reveal: vec![0],
        challenge: Challenge::from("bench-nonce"),
        schema,
    }
}

fn bench_issue(c: &mut Criterion) {
    let p = params();
    c.bench_function("issue_credential", |b| {
        b.iter(|| credential_from_params(black_box(&p)))
    });
}

fn bench_prove(c: &mut Criterion) {
    let p = params();
    let credential = credential_from_params(&p);
    let holder = p.holder();
    let engine: ProofEngine = ProofEngine::default();

    c.bench_function("prove_one_of_three", |b| {
        b.iter(|| {
            engine
                .prove(black_box(&credential), &holder, &p.reveal, &p.challenge)
                .unwrap()
        })
    });
}

fn bench_verify(c: &mut Criterion) {
    let p = params();
    let credential = credential_from_params(&p);
    let engine: ProofEngine = ProofEngine::default();
    let public = IssuerPublicParams {
        issuer_did: credential.issuer_did.clone(),
        verification_key: p.issuer().public_key(),
        schema: p.schema.clone(),
    };
    let holder_keys = [p.holder().public_key()];

    c.bench_function("verify_one_of_three", |b| {
        b.iter_batched(
            || {
                engine
                    .prove(&credential, &p.holder(), &p.reveal, &Challenge::random())
                    .unwrap()
            },
            |proof| {
                CommitmentProofSystem
                    .verify(black_box(&proof.proof_blob), &public, &holder_keys)
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_issue, bench_prove, bench_verify);
criterion_main!(benches);
