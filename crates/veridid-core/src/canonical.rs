//! Canonical CBOR encoding for deterministic signing and hashing.
//!
//! This module implements the subset of RFC 8949 Core Deterministic Encoding
//! that veridid needs:
//! - Map keys are small unsigned integers, sorted by encoded bytes
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Everything that is signed or committed to (schema ids, attribute
//! commitments, credential signatures, presentation transcripts) is built
//! here, so issuer, holder and verifier always hash identical bytes.
//! Transport encoding lives in [`crate::wire`] and is not canonical.

use crate::crypto::{Blake3Hash, Ed25519PublicKey};
use crate::types::{Challenge, CredentialId, SchemaId};

/// Encoding version mixed into every signed structure.
pub const CANONICAL_VERSION: u64 = 1;

/// Blake3 derive-key contexts, one per protocol role.
pub mod domains {
    pub const SCHEMA_ID: &str = "veridid 2026-01 schema id v1";
    pub const ATTRIBUTE_COMMITMENT: &str = "veridid 2026-01 attribute commitment v1";
    pub const CREDENTIAL_DIGEST: &str = "veridid 2026-01 credential digest v1";
    pub const PROOF_ID: &str = "veridid 2026-01 proof id v1";

    /// Prefix of the issuer-signed credential message.
    pub const CREDENTIAL_SIGNATURE: &[u8] = b"veridid/credential/v1\0";
    /// Prefix of the holder-signed presentation transcript.
    pub const PRESENTATION_SIGNATURE: &[u8] = b"veridid/presentation/v1\0";
    /// Prefix of signed registry requests.
    pub const REQUEST_SIGNATURE: &[u8] = b"veridid/registry-request/v1\0";
}

/// A value in the canonical subset.
#[derive(Debug, Clone)]
pub enum Canon<'a> {
    Uint(u64),
    Int(i64),
    Bytes(&'a [u8]),
    Text(&'a str),
    Array(Vec<Canon<'a>>),
    Map(Vec<(u64, Canon<'a>)>),
    Null,
}

/// Encode a value to canonical bytes.
pub fn encode(value: &Canon<'_>) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Canon<'_>) {
    match value {
        Canon::Uint(n) => encode_uint(buf, 0, *n),
        Canon::Int(n) if *n >= 0 => encode_uint(buf, 0, *n as u64),
        // CBOR encodes -1 as 0, -2 as 1, etc.
        Canon::Int(n) => encode_uint(buf, 1, (-1 - *n) as u64),
        Canon::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Canon::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Canon::Array(items) => {
            encode_uint(buf, 4, items.len() as u64);
            for item in items {
                encode_value_to(buf, item);
            }
        }
        Canon::Map(entries) => encode_map_canonical(buf, entries),
        Canon::Null => buf.push(0xf6),
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(u64, Canon<'_>)]) {
    let mut pairs: Vec<(Vec<u8>, &Canon<'_>)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_uint(&mut key_buf, 0, *k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

/// Canonical bytes of a schema definition.
pub fn schema_bytes(name: &str, version: &str, attributes: &[String]) -> Vec<u8> {
    encode(&Canon::Map(vec![
        (0, Canon::Uint(CANONICAL_VERSION)),
        (1, Canon::Text(name)),
        (2, Canon::Text(version)),
        (
            3,
            Canon::Array(attributes.iter().map(|a| Canon::Text(a)).collect()),
        ),
    ]))
}

/// Pre-image of one attribute commitment.
pub fn commitment_input(
    schema_id: &SchemaId,
    index: u32,
    name: &str,
    value: &str,
    blinding: &[u8; 32],
) -> Vec<u8> {
    encode(&Canon::Array(vec![
        Canon::Bytes(schema_id.as_bytes()),
        Canon::Uint(index.into()),
        Canon::Text(name),
        Canon::Text(value),
        Canon::Bytes(blinding),
    ]))
}

/// The message an issuer signs for a credential.
///
/// Format: `CREDENTIAL_SIGNATURE || canonical_map`.
pub fn credential_signing_message(
    credential_id: &CredentialId,
    schema_id: &SchemaId,
    issuer_did: &str,
    holder_did: &str,
    commitments: &[(&str, Blake3Hash)],
    issued_at: i64,
) -> Vec<u8> {
    let attributes = commitments
        .iter()
        .map(|(name, commitment)| {
            Canon::Array(vec![Canon::Text(name), Canon::Bytes(commitment.as_bytes())])
        })
        .collect();

    let body = encode(&Canon::Map(vec![
        (0, Canon::Uint(CANONICAL_VERSION)),
        (1, Canon::Bytes(credential_id.as_bytes())),
        (2, Canon::Bytes(schema_id.as_bytes())),
        (3, Canon::Text(issuer_did)),
        (4, Canon::Text(holder_did)),
        (5, Canon::Array(attributes)),
        (6, Canon::Int(issued_at)),
    ]));

    let mut msg = Vec::with_capacity(domains::CREDENTIAL_SIGNATURE.len() + body.len());
    msg.extend_from_slice(domains::CREDENTIAL_SIGNATURE);
    msg.extend_from_slice(&body);
    msg
}

/// The message a holder signs when presenting a credential.
///
/// Binds the full credential (via its digest), the exact set of revealed
/// indices, the session challenge and the presenting key.
pub fn presentation_transcript(
    credential_digest: &Blake3Hash,
    revealed_indices: &[u32],
    challenge: &Challenge,
    holder_key: &Ed25519PublicKey,
) -> Vec<u8> {
    let body = encode(&Canon::Map(vec![
        (0, Canon::Uint(CANONICAL_VERSION)),
        (1, Canon::Bytes(credential_digest.as_bytes())),
        (
            2,
            Canon::Array(
                revealed_indices
                    .iter()
                    .map(|i| Canon::Uint((*i).into()))
                    .collect(),
            ),
        ),
        (3, Canon::Bytes(challenge.as_bytes())),
        (4, Canon::Bytes(holder_key.as_bytes())),
    ]));

    let mut msg = Vec::with_capacity(domains::PRESENTATION_SIGNATURE.len() + body.len());
    msg.extend_from_slice(domains::PRESENTATION_SIGNATURE);
    msg.extend_from_slice(&body);
    msg
}
