//! Versioned CBOR envelope for transport and storage.
//!
//! Every message that leaves a process is wrapped as `{ v, body }`. Decoders
//! read `v` first and refuse anything but [`WIRE_VERSION`], so an old node
//! never misreads a newer layout. Signed bytes are built by
//! [`crate::canonical`], not here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Current envelope version.
pub const WIRE_VERSION: u8 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    v: u8,
    body: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    v: u8,
    body: T,
}

#[derive(Deserialize)]
struct VersionProbe {
    v: u8,
}

/// Encode `body` inside a version-1 envelope.
pub fn encode_versioned<T: Serialize>(body: &T) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(
        &EnvelopeRef {
            v: WIRE_VERSION,
            body,
        },
        &mut buf,
    )
    .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode an envelope, rejecting unknown versions before touching the body.
pub fn decode_versioned<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    let probe: VersionProbe =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    if probe.v != WIRE_VERSION {
        return Err(CoreError::UnsupportedVersion(probe.v));
    }

    let envelope: Envelope<T> =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    Ok(envelope.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Blake3Hash;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        hash: Blake3Hash,
    }

    fn sample() -> Sample {
        Sample {
            name: "did:example:alice".into(),
            hash: Blake3Hash::hash(b"x"),
        }
    }

    #[test]
    fn test_roundtrip() {
        let bytes = encode_versioned(&sample()).unwrap();
        let decoded: Sample = decode_versioned(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_rejects_other_version() {
        let mut buf = Vec::new();
        ciborium::into_writer(
            &EnvelopeRef {
                v: 2,
                body: &sample(),
            },
            &mut buf,
        )
        .unwrap();

        let err = decode_versioned::<Sample>(&buf).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = decode_versioned::<Sample>(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, CoreError::DecodingError(_)));

        // Right version, wrong body shape.
        let bytes = encode_versioned(&42u32).unwrap();
        assert!(matches!(
            decode_versioned::<Sample>(&bytes),
            Err(CoreError::DecodingError(_))
        ));
    }
}
