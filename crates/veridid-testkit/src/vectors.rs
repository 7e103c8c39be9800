//! Golden test vectors for attribute commitments.
//!
//! Commitments are what an issuer signs and a verifier recomputes, so every
//! implementation must derive the same schema id and commitment bytes from
//! the same inputs.

use serde::Serialize;
use veridid_core::canonical::commitment_input;
use veridid_core::{commit_attribute, Blinding, Schema};

/// A golden commitment vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub schema_name: &'static str,
    pub schema_version: &'static str,
    pub attributes: &'static [&'static str],
    /// Attribute index being committed.
    pub index: u32,
    pub value: &'static str,
    #[serde(serialize_with = "hex_bytes")]
    pub blinding: [u8; 32],
    /// Expected schema id (hex).
    pub expected_schema_id: &'static str,
    /// Expected canonical commitment pre-image (hex). Empty to skip.
    pub expected_input: &'static str,
    /// Expected commitment (hex).
    pub expected_commitment: &'static str,
}

fn hex_bytes<S: serde::Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

const KYC: &[&str] = &["age", "country", "verified"];
const KYC_ID: &str = "5a4a1e968f964a1c1bdd897226f09b81a0a79576f46bbefc92cbb70cf5f77048";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "kyc age=34",
            schema_name: "kyc",
            schema_version: "1.0",
            attributes: KYC,
            index: 0,
            value: "34",
            blinding: [0x11; 32],
            expected_schema_id: KYC_ID,
            expected_input: "8558205a4a1e968f964a1c1bdd897226f09b81a0a79576f46bbefc92cbb70cf5f77048006361676562333458201111111111111111111111111111111111111111111111111111111111111111",
            expected_commitment: "0e2cde6ed06813aa6798e0b9d577561fe2860c3e6d07214bf212551b18d69994",
        },
        GoldenVector {
            name: "kyc country=US",
            schema_name: "kyc",
            schema_version: "1.0",
            attributes: KYC,
            index: 1,
            value: "US",
            blinding: [0x22; 32],
            expected_schema_id: KYC_ID,
            expected_input: "",
            expected_commitment: "0c4d730ab27c91e25ae9e0dfd59c9ba120bf61c37629cfeac518c73b64d015ed",
        },
        GoldenVector {
            name: "kyc verified=true",
            schema_name: "kyc",
            schema_version: "1.0",
            attributes: KYC,
            index: 2,
            value: "true",
            blinding: [0x33; 32],
            expected_schema_id: KYC_ID,
            expected_input: "",
            expected_commitment: "46f10c482d593a141a91ebd9954d040c66c1658587d1dd9c56eecf5b54182a80",
        },
        GoldenVector {
            name: "empty value, zero blinding",
            schema_name: "degree",
            schema_version: "2.1",
            attributes: &["field"],
            index: 0,
            value: "",
            blinding: [0x00; 32],
            expected_schema_id: "953a8a4b043c91e57de3bd77336aa3df4ee6412fb3a2fbb027617be9a0ccdc68",
            expected_input: "",
            expected_commitment: "8a012b69a7115ab52ddf9575b92577b8c13a10289cf1c1b44b20252fbff0b58c",
        },
    ]
}

/// Schema of a vector.
pub fn schema_of(vector: &GoldenVector) -> Schema {
    Schema::new(
        vector.schema_name,
        vector.schema_version,
        vector.attributes.iter().copied(),
    )
}

/// Computed outputs of one vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorOutput {
    pub schema_id: String,
    pub input: String,
    pub commitment: String,
}

/// Compute the outputs of `vector`.
pub fn compute_vector(vector: &GoldenVector) -> VectorOutput {
    let schema = schema_of(vector);
    let schema_id = schema.id();
    let name = vector.attributes[vector.index as usize];
    let input = commitment_input(&schema_id, vector.index, name, vector.value, &vector.blinding);
    let commitment = commit_attribute(
        &schema_id,
        vector.index,
        name,
        vector.value,
        &Blinding(vector.blinding),
    );
    VectorOutput {
        schema_id: schema_id.to_hex(),
        input: hex::encode(input),
        commitment: commitment.to_hex(),
    }
}

/// Check every vector. Returns `(name, matches, computed commitment hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let out = compute_vector(v);
            let matches = out.schema_id == v.expected_schema_id
                && (v.expected_input.is_empty() || out.input == v.expected_input)
                && out.commitment == v.expected_commitment;
            (v.name.to_string(), matches, out.commitment)
        })
        .collect()
}

/// All vectors as JSON, for other implementations to consume.
pub fn vectors_json() -> serde_json::Value {
    serde_json::json!({ "commitment_vectors": all_vectors() })
}
