//! Strong type definitions for veridid.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id32 {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let bytes = hex::decode(s)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

id32!(
    /// A credential identifier: 32 bytes drawn from the OS CSPRNG at issuance.
    CredentialId,
    "CredentialId"
);

id32!(
    /// Content address of a credential schema.
    ///
    /// Computed by [`crate::Schema::id`] over the schema's canonical bytes.
    SchemaId,
    "SchemaId"
);

id32!(
    /// Content address of a disclosure proof blob.
    ProofId,
    "ProofId"
);

impl CredentialId {
    /// Draw a fresh random credential id.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl ProofId {
    /// Derive the id of a proof blob.
    pub fn of_blob(blob: &[u8]) -> Self {
        let hash = crate::crypto::Blake3Hash::derive(crate::canonical::domains::PROOF_ID, blob);
        Self(hash.0)
    }
}

/// Verifier-chosen nonce that binds a proof to one verification session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Challenge(pub Vec<u8>);

impl Challenge {
    /// Length of challenges produced by [`Challenge::random`].
    pub const RANDOM_LEN: usize = 32;

    /// Wrap caller-provided bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// A fresh 32-byte challenge from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = vec![0u8; Self::RANDOM_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw challenge bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if s.chars().all(|c| c.is_ascii_graphic()) => write!(f, "Challenge({s:?})"),
            _ => write!(f, "Challenge({})", hex::encode(&self.0)),
        }
    }
}

impl From<&str> for Challenge {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Challenge {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_id_hex_roundtrip() {
        let id = CredentialId::random();
        let recovered = CredentialId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_credential_ids_are_fresh() {
        assert_ne!(CredentialId::random(), CredentialId::random());
    }

    #[test]
    fn test_schema_id_debug() {
        let id = SchemaId::from_bytes([0xcd; 32]);
        assert_eq!(format!("{:?}", id), "SchemaId(cdcdcdcdcdcdcdcd)");
    }

    #[test]
    fn test_proof_id_depends_on_blob() {
        assert_ne!(ProofId::of_blob(b"a"), ProofId::of_blob(b"b"));
        assert_eq!(ProofId::of_blob(b"a"), ProofId::of_blob(b"a"));
    }

    #[test]
    fn test_challenge_debug() {
        assert_eq!(format!("{:?}", Challenge::from("nonce-1")), "Challenge(\"nonce-1\")");
        assert_eq!(format!("{:?}", Challenge::new(vec![0u8, 1])), "Challenge(0001)");
        assert_eq!(Challenge::random().as_bytes().len(), Challenge::RANDOM_LEN);
    }
}
