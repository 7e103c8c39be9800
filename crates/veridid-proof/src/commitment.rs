//! Hash-commitment proof backend.
//!
//! A presentation carries the credential's public half (every attribute
//! commitment plus the issuer signature over them), the openings of the
//! revealed attributes only, and a holder signature over
//! `(credential digest, revealed indices, challenge, holder key)`.
//!
//! ```text
//! commitment_i = derive(ATTRIBUTE_COMMITMENT, [schema_id, i, name_i, value_i, blinding_i])
//! issuer_sig   = sign(issuer, CREDENTIAL_SIGNATURE || {.., [(name_i, commitment_i)], ..})
//! holder_sig   = sign(holder, PRESENTATION_SIGNATURE || {digest, revealed, challenge, key})
//! ```
//!
//! Hidden attributes stay hidden: each is only present as a commitment with
//! a 256-bit random blinding. Presentations of one credential are linkable
//! through its id and commitments.

use serde::{Deserialize, Serialize};
use veridid_core::canonical::presentation_transcript;
use veridid_core::{
    decode_versioned, encode_versioned, validate_credential_structure, verify_credential_signature,
    AttributeOpening, Challenge, CommittedAttribute, Credential, CredentialId, Ed25519PublicKey,
    Ed25519Signature, Keypair, SchemaId,
};

use crate::error::BackendError;
use crate::issuer::IssuerPublicParams;
use crate::system::{ProofStatement, ProofSystem, RevealedAttribute, VerifiedDisclosure};

/// Wire layout of a commitment presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommitmentProof {
    credential_id: CredentialId,
    issuer_did: String,
    holder_did: String,
    schema_id: SchemaId,
    issued_at: i64,
    attributes: Vec<CommittedAttribute>,
    issuer_signature: Ed25519Signature,
    /// Openings for revealed indices only, in index order.
    revealed: Vec<AttributeOpening>,
    challenge: Challenge,
    holder_key: Ed25519PublicKey,
    holder_signature: Ed25519Signature,
}

impl CommitmentProof {
    /// The credential as a verifier sees it: no openings.
    fn public_credential(&self) -> Credential {
        Credential {
            credential_id: self.credential_id,
            issuer_did: self.issuer_did.clone(),
            holder_did: self.holder_did.clone(),
            schema_id: self.schema_id,
            attributes: self.attributes.clone(),
            openings: Vec::new(),
            issued_at: self.issued_at,
            signature: self.issuer_signature,
        }
    }

    fn revealed_indices(&self) -> Vec<u32> {
        self.revealed.iter().map(|o| o.index).collect()
    }

    fn statement(&self) -> ProofStatement {
        ProofStatement {
            credential_id: self.credential_id,
            issuer_did: self.issuer_did.clone(),
            holder_did: self.holder_did.clone(),
            schema_id: self.schema_id,
            revealed_indices: self.revealed_indices(),
            challenge: self.challenge.clone(),
            holder_key: self.holder_key,
        }
    }
}

/// The default [`ProofSystem`]: Blake3 commitments and Ed25519 signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitmentProofSystem;

impl CommitmentProofSystem {
    pub fn new() -> Self {
        Self
    }

    fn decode(blob: &[u8]) -> Result<CommitmentProof, BackendError> {
        decode_versioned(blob).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

impl ProofSystem for CommitmentProofSystem {
    fn name(&self) -> &'static str {
        "blake3-commitment-ed25519"
    }

    fn prove(
        &self,
        credential: &Credential,
        holder_key: &Keypair,
        reveal: &[u32],
        challenge: &Challenge,
    ) -> Result<Vec<u8>, BackendError> {
        // 1. Collect openings for the revealed indices
        let mut revealed = Vec::with_capacity(reveal.len());
        for window in reveal.windows(2) {
            if window[0] >= window[1] {
                return Err(BackendError::Malformed(
                    "revealed indices must be strictly increasing".into(),
                ));
            }
        }
        for &index in reveal {
            let opening = credential
                .opening(index)
                .ok_or_else(|| BackendError::Malformed(format!("no opening for attribute {index}")))?;
            revealed.push(opening.clone());
        }

        // 2. Holder signs the transcript
        let holder_public = holder_key.public_key();
        let transcript =
            presentation_transcript(&credential.digest(), reveal, challenge, &holder_public);
        let holder_signature = holder_key.sign(&transcript);

        // 3. Encode
        let proof = CommitmentProof {
            credential_id: credential.credential_id,
            issuer_did: credential.issuer_did.clone(),
            holder_did: credential.holder_did.clone(),
            schema_id: credential.schema_id,
            issued_at: credential.issued_at,
            attributes: credential.attributes.clone(),
            issuer_signature: credential.signature,
            revealed,
            challenge: challenge.clone(),
            holder_key: holder_public,
            holder_signature,
        };
        encode_versioned(&proof).map_err(|e| BackendError::Encoding(e.to_string()))
    }

    fn statement(&self, blob: &[u8]) -> Result<ProofStatement, BackendError> {
        Ok(Self::decode(blob)?.statement())
    }

    fn verify(
        &self,
        blob: &[u8],
        params: &IssuerPublicParams,
        holder_keys: &[Ed25519PublicKey],
    ) -> Result<VerifiedDisclosure, BackendError> {
        let proof = Self::decode(blob)?;
        let credential = proof.public_credential();

        // 1. Credential belongs to these issuer parameters
        if credential.issuer_did != params.issuer_did {
            return Err(BackendError::Invalid(format!(
                "issued by {}, parameters are for {}",
                credential.issuer_did, params.issuer_did
            )));
        }
        validate_credential_structure(&credential, &params.schema)
            .map_err(|e| BackendError::Invalid(e.to_string()))?;

        // 2. Issuer signature over every commitment
        verify_credential_signature(&credential, &params.verification_key)
            .map_err(|_| BackendError::Invalid("issuer signature does not verify".into()))?;

        // 3. Revealed openings match their commitments
        let mut revealed = Vec::with_capacity(proof.revealed.len());
        let mut previous: Option<u32> = None;
        for opening in &proof.revealed {
            if previous.is_some_and(|p| p >= opening.index) {
                return Err(BackendError::Invalid(
                    "revealed indices must be strictly increasing".into(),
                ));
            }
            previous = Some(opening.index);

            let attribute = credential
                .attributes
                .get(opening.index as usize)
                .ok_or_else(|| {
                    BackendError::Invalid(format!("revealed index {} out of range", opening.index))
                })?;
            if opening.commitment(&credential.schema_id, &attribute.name) != attribute.commitment {
                return Err(BackendError::Invalid(format!(
                    "opening for attribute {} does not match its commitment",
                    opening.index
                )));
            }
            revealed.push(RevealedAttribute {
                index: opening.index,
                name: attribute.name.clone(),
                value: opening.value.clone(),
            });
        }

        // 4. Holder key is listed for the holder DID and signed this session
        if !holder_keys.contains(&proof.holder_key) {
            return Err(BackendError::Invalid(
                "holder key is not a verification method of the holder DID".into(),
            ));
        }
        let transcript = presentation_transcript(
            &credential.digest(),
            &proof.revealed_indices(),
            &proof.challenge,
            &proof.holder_key,
        );
        proof
            .holder_key
            .verify(&transcript, &proof.holder_signature)
            .map_err(|_| BackendError::Invalid("holder signature does not verify".into()))?;

        Ok(VerifiedDisclosure {
            statement: proof.statement(),
            revealed,
        })
    }
}
