//! Proptest generators for property-based testing.

use proptest::prelude::*;

use veridid_core::{
    commit_attribute, AttributeOpening, Blake3Hash, Blinding, Challenge, CommittedAttribute,
    Credential, CredentialId, Ed25519PublicKey, Ed25519Signature, Keypair, Schema,
    MAX_SCHEMA_ATTRIBUTES,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a random Blake3Hash.
pub fn blake3_hash() -> impl Strategy<Value = Blake3Hash> {
    any::<[u8; 32]>().prop_map(Blake3Hash)
}

/// Generate a syntactically valid DID.
pub fn did() -> impl Strategy<Value = String> {
    ("[a-z0-9]{1,8}", "[A-Za-z0-9._:-]{1,64}")
        .prop_map(|(method, specific)| format!("did:{method}:{specific}"))
}

/// Generate a non-empty challenge.
pub fn challenge() -> impl Strategy<Value = Challenge> {
    prop::collection::vec(any::<u8>(), 1..=64).prop_map(Challenge::new)
}

/// Generate an attribute value. May be empty and may contain any unicode.
pub fn attribute_value() -> impl Strategy<Value = String> {
    ".{0,48}"
}

/// Generate a schema with 1..=`max_attributes` distinct attribute names.
pub fn schema(max_attributes: usize) -> impl Strategy<Value = Schema> {
    let max = max_attributes.clamp(1, MAX_SCHEMA_ATTRIBUTES);
    (
        "[a-z][a-z0-9-]{0,15}",
        "[0-9]\\.[0-9]",
        prop::collection::btree_set("[a-z][a-z_]{0,15}", 1..=max),
    )
        .prop_map(|(name, version, attributes)| Schema::new(name, version, attributes))
}

/// Parameters for a credential plus one disclosure of it.
#[derive(Debug, Clone)]
pub struct CredentialParams {
    pub issuer_seed: [u8; 32],
    pub holder_seed: [u8; 32],
    pub schema: Schema,
    pub values: Vec<String>,
    pub blindings: Vec<[u8; 32]>,
    /// In range, possibly unsorted, possibly repeated.
    pub reveal: Vec<u32>,
    pub challenge: Challenge,
}

impl CredentialParams {
    pub fn issuer(&self) -> Keypair {
        Keypair::from_seed(&self.issuer_seed)
    }

    pub fn holder(&self) -> Keypair {
        Keypair::from_seed(&self.holder_seed)
    }
}

impl Arbitrary for CredentialParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<[u8; 32]>(), any::<[u8; 32]>(), schema(8), challenge())
            .prop_flat_map(|(issuer_seed, holder_seed, schema, challenge)| {
                let n = schema.len();
                (
                    Just(issuer_seed),
                    Just(holder_seed),
                    Just(schema),
                    prop::collection::vec(attribute_value(), n),
                    prop::collection::vec(any::<[u8; 32]>(), n),
                    prop::collection::vec(0..n as u32, 0..=n + 1),
                    Just(challenge),
                )
            })
            .prop_map(
                |(issuer_seed, holder_seed, schema, values, blindings, reveal, challenge)| {
                    CredentialParams {
                        issuer_seed,
                        holder_seed,
                        schema,
                        values,
                        blindings,
                        reveal,
                        challenge,
                    }
                },
            )
            .boxed()
    }
}

/// Build a signed credential from parameters, without a registry.
///
/// Issuer is `did:example:issuer`, holder `did:example:holder`.
pub fn credential_from_params(params: &CredentialParams) -> Credential {
    let schema_id = params.schema.id();
    let mut attributes = Vec::with_capacity(params.values.len());
    let mut openings = Vec::with_capacity(params.values.len());

    for (i, ((name, value), blinding)) in params
        .schema
        .attributes
        .iter()
        .zip(&params.values)
        .zip(&params.blindings)
        .enumerate()
    {
        let index = i as u32;
        let blinding = Blinding(*blinding);
        attributes.push(CommittedAttribute {
            name: name.clone(),
            commitment: commit_attribute(&schema_id, index, name, value, &blinding),
        });
        openings.push(AttributeOpening {
            index,
            value: value.clone(),
            blinding,
        });
    }

    let mut credential = Credential {
        credential_id: CredentialId::from_bytes(*Blake3Hash::hash(&params.issuer_seed).as_bytes()),
        issuer_did: "did:example:issuer".into(),
        holder_did: "did:example:holder".into(),
        schema_id,
        attributes,
        openings,
        issued_at: 1_767_225_600_000,
        signature: Ed25519Signature::ZERO,
    };
    credential.signature = params.issuer().sign(&credential.signing_message());
    credential
}
