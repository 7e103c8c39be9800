//! Holder-side credential storage and proof requests.

use std::collections::BTreeMap;

use veridid_core::{verify_openings, Credential, CredentialId, Keypair, SchemaId};

use crate::commitment::CommitmentProofSystem;
use crate::engine::ProofEngine;
use crate::error::WalletError;
use crate::messages::{ProofRequest, ProofResponse};
use crate::system::ProofSystem;

/// Credentials held by one DID, plus the key that proves control of it.
pub struct Wallet<P: ProofSystem = CommitmentProofSystem> {
    did: String,
    keypair: Keypair,
    credentials: BTreeMap<CredentialId, Credential>,
    engine: ProofEngine<P>,
}

impl<P: ProofSystem> Wallet<P> {
    pub fn new(did: impl Into<String>, keypair: Keypair, engine: ProofEngine<P>) -> Self {
        Self {
            did: did.into(),
            keypair,
            credentials: BTreeMap::new(),
            engine,
        }
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    /// Accept a credential issued to this wallet's DID.
    ///
    /// Openings are checked against the commitments before the credential
    /// is kept. Storing the same credential id again replaces it.
    pub fn store(&mut self, credential: Credential) -> Result<CredentialId, WalletError> {
        if credential.holder_did != self.did {
            return Err(WalletError::HolderMismatch {
                expected: self.did.clone(),
                got: credential.holder_did,
            });
        }
        verify_openings(&credential).map_err(WalletError::MalformedCredential)?;

        let id = credential.credential_id;
        self.credentials.insert(id, credential);
        tracing::debug!(holder = %self.did, credential = ?id, "credential stored");
        Ok(id)
    }

    pub fn get(&self, credential_id: &CredentialId) -> Option<&Credential> {
        self.credentials.get(credential_id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.values()
    }

    /// Credentials of one schema.
    pub fn find_by_schema<'a>(
        &'a self,
        schema_id: &'a SchemaId,
    ) -> impl Iterator<Item = &'a Credential> + 'a {
        self.credentials
            .values()
            .filter(move |c| c.schema_id == *schema_id)
    }

    pub fn remove(&mut self, credential_id: &CredentialId) -> Option<Credential> {
        self.credentials.remove(credential_id)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Answer `request` with a presentation of `credential_id`.
    pub fn respond(
        &self,
        credential_id: &CredentialId,
        request: &ProofRequest,
    ) -> Result<ProofResponse, WalletError> {
        let credential = self
            .credentials
            .get(credential_id)
            .ok_or(WalletError::UnknownCredential(*credential_id))?;
        if credential.schema_id != request.schema_id {
            return Err(WalletError::SchemaMismatch {
                requested: request.schema_id,
                held: credential.schema_id,
            });
        }

        let proof = self.engine.prove(
            credential,
            &self.keypair,
            &request.requested_attribute_indices,
            &request.challenge,
        )?;
        Ok(proof.into())
    }
}
