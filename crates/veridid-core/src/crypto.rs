//! Cryptographic primitives for veridid.
//!
//! Ed25519 signing and Blake3 hashing behind strong types. Every hash that
//! feeds a signature or a commitment goes through [`Blake3Hash::derive`]
//! with its own context string, so a value from one protocol step cannot be
//! replayed as another.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CoreError;

/// Raw-bytes accessors, hex helpers and a short `Debug` for a byte newtype.
macro_rules! byte_newtype {
    ($name:ident, $len:literal, $label:literal) => {
        impl $name {
            pub const LEN: usize = $len;

            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse exactly `LEN` hex-encoded bytes.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}..)"), &self.to_hex()[..16])
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }
    };
}

/// A 32-byte Blake3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

byte_newtype!(Blake3Hash, 32, "Blake3");

impl Blake3Hash {
    /// Placeholder for "no off-registry content".
    pub const ZERO: Self = Self([0u8; 32]);

    /// Plain Blake3 of `data`. Not for anything signed or committed to.
    pub fn hash(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Blake3 in key-derivation mode: `context` must be a hardcoded,
    /// globally unique string naming the protocol step.
    pub fn derive(context: &str, data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(context);
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

/// An Ed25519 public key: a DID controller, or the key material of a
/// verification method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

byte_newtype!(Ed25519PublicKey, 32, "Ed25519Pub");

impl Ed25519PublicKey {
    /// Strict verification: rejects small-order keys and malleable
    /// signatures, so one signed message has exactly one valid signature
    /// under one key.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        key.verify_strict(message, &Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::InvalidSignature)
    }

    /// Whether the bytes decode to a curve point at all.
    pub fn is_well_formed(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

// Short form for log fields.
impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

byte_newtype!(Ed25519Signature, 64, "Ed25519Sig");

impl Ed25519Signature {
    /// Never verifies. Fills the field while the signing message is built.
    pub const ZERO: Self = Self([0u8; 64]);
}

// serde derives arrays only up to 32 elements; a signature is one byte string.
impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignatureBytes;

        impl<'de> Visitor<'de> for SignatureBytes {
            type Value = Ed25519Signature;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("64 signature bytes")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                <[u8; 64]>::try_from(v)
                    .map(Ed25519Signature)
                    .map_err(|_| E::invalid_length(v.len(), &self))
            }

            // Human-readable formats hand us a sequence of integers.
            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut out = [0u8; 64];
                let mut n = 0;
                while let Some(byte) = seq.next_element::<u8>()? {
                    if n == out.len() {
                        return Err(de::Error::invalid_length(n + 1, &self));
                    }
                    out[n] = byte;
                    n += 1;
                }
                if n != out.len() {
                    return Err(de::Error::invalid_length(n, &self));
                }
                Ok(Ed25519Signature(out))
            }
        }

        deserializer.deserialize_bytes(SignatureBytes)
    }
}

/// An Ed25519 signing key. `Debug` prints only the public half.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Deterministic key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Secret seed. Handle with care.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.public_key()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_verification() {
        let keypair = Keypair::from_seed(&[1; 32]);
        let signature = keypair.sign(b"did:example:alice");

        assert!(keypair.public_key().verify(b"did:example:alice", &signature).is_ok());
        assert!(matches!(
            keypair.public_key().verify(b"did:example:alicE", &signature),
            Err(CoreError::InvalidSignature)
        ));
        assert!(keypair
            .public_key()
            .verify(b"did:example:alice", &Ed25519Signature::ZERO)
            .is_err());
    }

    #[test]
    fn test_seed_is_stable() {
        let a = Keypair::from_seed(&[0x42; 32]);
        let b = Keypair::from_seed(&[0x42; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.seed(), [0x42; 32]);
        assert_ne!(Keypair::generate().public_key(), a.public_key());
    }

    #[test]
    fn test_derive_is_context_separated() {
        let a = Blake3Hash::derive("veridid test context a", b"data");
        let b = Blake3Hash::derive("veridid test context b", b"data");
        assert_ne!(a, b);
        assert_ne!(a, Blake3Hash::hash(b"data"));
        assert_eq!(a, Blake3Hash::derive("veridid test context a", b"data"));
    }

    #[test]
    fn test_signature_is_one_cbor_byte_string() {
        let signature = Keypair::from_seed(&[7; 32]).sign(b"payload");

        let mut buf = Vec::new();
        ciborium::into_writer(&signature, &mut buf).unwrap();
        // 0x58 0x40 header, then 64 bytes
        assert_eq!(&buf[..2], &[0x58, 0x40]);
        assert_eq!(buf.len(), 66);

        let decoded: Ed25519Signature = ciborium::from_reader(&buf[..]).unwrap();
        assert_eq!(decoded, signature);
    }

    #[test]
    fn test_signature_from_json_sequence() {
        let signature = Ed25519Signature([3; 64]);
        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(serde_json::from_str::<Ed25519Signature>(&json).unwrap(), signature);

        let short = serde_json::to_string(&vec![3u8; 63]).unwrap();
        assert!(serde_json::from_str::<Ed25519Signature>(&short).is_err());
    }

    #[test]
    fn test_hex_parsing_checks_length() {
        let pk = Keypair::from_seed(&[9; 32]).public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(Ed25519PublicKey::from_hex("abcd").is_err());
        assert!(pk.is_well_formed());
        assert_eq!(format!("{pk}").len(), 16);
    }
}
