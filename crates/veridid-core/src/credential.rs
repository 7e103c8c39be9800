//! Credential schemas, attribute commitments and issued credentials.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{self, domains};
use crate::crypto::{Blake3Hash, Ed25519Signature};
use crate::types::{CredentialId, SchemaId};

/// Maximum number of attributes in one schema.
pub const MAX_SCHEMA_ATTRIBUTES: usize = 64;

/// A credential schema: an ordered list of attribute names.
///
/// Schemas are content-addressed; two schemas with identical name, version
/// and attribute list share one [`SchemaId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub version: String,
    pub attributes: Vec<String>,
}

impl Schema {
    pub fn new<I, A>(name: impl Into<String>, version: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            name: name.into(),
            version: version.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Content address of this schema.
    pub fn id(&self) -> SchemaId {
        let bytes = canonical::schema_bytes(&self.name, &self.version, &self.attributes);
        SchemaId(Blake3Hash::derive(domains::SCHEMA_ID, &bytes).0)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A 32-byte blinding factor.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinding(pub [u8; 32]);

impl Blinding {
    /// Draw a fresh blinding factor from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Blinding factors are secret; never print them.
impl fmt::Debug for Blinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Blinding(..)")
    }
}

/// Commit to one attribute value.
pub fn commit_attribute(
    schema_id: &SchemaId,
    index: u32,
    name: &str,
    value: &str,
    blinding: &Blinding,
) -> Blake3Hash {
    let input = canonical::commitment_input(schema_id, index, name, value, blinding.as_bytes());
    Blake3Hash::derive(domains::ATTRIBUTE_COMMITMENT, &input)
}

/// The public half of an attribute: its name and a hiding commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedAttribute {
    pub name: String,
    pub commitment: Blake3Hash,
}

/// The private half of an attribute, held by the credential's holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOpening {
    pub index: u32,
    pub value: String,
    pub blinding: Blinding,
}

impl AttributeOpening {
    /// Recompute the commitment this opening claims to open.
    pub fn commitment(&self, schema_id: &SchemaId, name: &str) -> Blake3Hash {
        commit_attribute(schema_id, self.index, name, &self.value, &self.blinding)
    }
}

/// An issued credential.
///
/// `attributes`, ids, dids, `issued_at` and `signature` are public.
/// `openings` never leave the holder except for the indices it chooses to
/// reveal in a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub credential_id: CredentialId,
    pub issuer_did: String,
    pub holder_did: String,
    pub schema_id: SchemaId,
    pub attributes: Vec<CommittedAttribute>,
    pub openings: Vec<AttributeOpening>,
    pub issued_at: i64,
    pub signature: Ed25519Signature,
}

impl Credential {
    /// The message the issuer signed.
    pub fn signing_message(&self) -> Vec<u8> {
        let commitments: Vec<(&str, Blake3Hash)> = self
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.commitment))
            .collect();
        canonical::credential_signing_message(
            &self.credential_id,
            &self.schema_id,
            &self.issuer_did,
            &self.holder_did,
            &commitments,
            self.issued_at,
        )
    }

    /// Digest binding the signed credential, signature included.
    pub fn digest(&self) -> Blake3Hash {
        let mut input = self.signing_message();
        input.extend_from_slice(self.signature.as_bytes());
        Blake3Hash::derive(domains::CREDENTIAL_DIGEST, &input)
    }

    /// Opening for attribute `index`, if the holder has it.
    pub fn opening(&self, index: u32) -> Option<&AttributeOpening> {
        self.openings.iter().find(|o| o.index == index)
    }

    /// Attribute names in order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}
