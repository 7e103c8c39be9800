//! Credential issuance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use veridid_core::{
    commit_attribute, now_millis, AttributeOpening, Blinding, CommittedAttribute, Credential,
    CredentialId, DidDocument, Ed25519PublicKey, Ed25519Signature, Keypair, Schema, SchemaId,
};
use veridid_registry::{DidRegistry, SchemaRegistry};
use veridid_store::LedgerStore;

use crate::error::IssueError;

/// What a verifier needs from an issuer to check presentations of one
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerPublicParams {
    pub issuer_did: String,
    pub verification_key: Ed25519PublicKey,
    pub schema: Schema,
}

impl IssuerPublicParams {
    pub fn schema_id(&self) -> SchemaId {
        self.schema.id()
    }
}

/// Issues credentials as one DID with one signing key.
pub struct Issuer<S: LedgerStore> {
    did: String,
    keypair: Keypair,
    registry: Arc<DidRegistry<S>>,
    schemas: Arc<SchemaRegistry>,
}

impl<S: LedgerStore> Issuer<S> {
    pub fn new(
        did: impl Into<String>,
        keypair: Keypair,
        registry: Arc<DidRegistry<S>>,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            did: did.into(),
            keypair,
            registry,
            schemas,
        }
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn verification_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    async fn active_issuer_document(&self) -> Result<DidDocument, IssueError> {
        match self.registry.resolve(&self.did).await? {
            Some(doc) if doc.active => Ok(doc),
            _ => Err(IssueError::UnknownIssuer(self.did.clone())),
        }
    }

    /// Register a schema authored by this issuer.
    pub async fn register_schema(&self, schema: Schema) -> Result<SchemaId, IssueError> {
        self.active_issuer_document().await?;
        Ok(self.schemas.register(schema, &self.did)?)
    }

    /// Public parameters for verifying this issuer's credentials of `schema_id`.
    pub fn public_params(&self, schema_id: &SchemaId) -> Result<IssuerPublicParams, IssueError> {
        let schema = self
            .schemas
            .get(schema_id)
            .map_err(|_| IssueError::UnknownSchema(*schema_id))?;
        Ok(IssuerPublicParams {
            issuer_did: self.did.clone(),
            verification_key: self.keypair.public_key(),
            schema,
        })
    }

    /// Issue a credential over `values` (one per schema attribute, in order)
    /// to `holder_did`.
    pub async fn issue<V: AsRef<str>>(
        &self,
        holder_did: &str,
        schema_id: &SchemaId,
        values: &[V],
    ) -> Result<Credential, IssueError> {
        // 1. Issuer and holder are live
        let issuer_doc = self.active_issuer_document().await?;
        match self.registry.resolve(holder_did).await? {
            Some(doc) if doc.active => {}
            _ => {
                tracing::warn!(holder = %holder_did, "issuance rejected: unknown holder");
                return Err(IssueError::UnknownHolder(holder_did.to_string()));
            }
        }

        // 2. Values fit the schema
        let schema = self
            .schemas
            .get(schema_id)
            .map_err(|_| IssueError::UnknownSchema(*schema_id))?;
        if values.len() != schema.len() {
            return Err(IssueError::SchemaMismatch {
                expected: schema.len(),
                got: values.len(),
            });
        }

        // 3. Our signing key is published in our DID document
        if !issuer_doc.lists_key(&self.keypair.public_key()) {
            return Err(IssueError::IssuerKeyNotListed(self.did.clone()));
        }

        // 4. Commit each value under fresh blinding
        let mut attributes = Vec::with_capacity(values.len());
        let mut openings = Vec::with_capacity(values.len());
        for (i, (name, value)) in schema.attributes.iter().zip(values).enumerate() {
            let index = i as u32;
            let value: &str = value.as_ref();
            let blinding = Blinding::random();
            attributes.push(CommittedAttribute {
                name: name.clone(),
                commitment: commit_attribute(schema_id, index, name, value, &blinding),
            });
            openings.push(AttributeOpening {
                index,
                value: value.to_string(),
                blinding,
            });
        }

        // 5. Sign
        let mut credential = Credential {
            credential_id: CredentialId::random(),
            issuer_did: self.did.clone(),
            holder_did: holder_did.to_string(),
            schema_id: *schema_id,
            attributes,
            openings,
            issued_at: now_millis(),
            signature: Ed25519Signature::ZERO,
        };
        credential.signature = self.keypair.sign(&credential.signing_message());

        tracing::info!(
            credential = ?credential.credential_id,
            issuer = %self.did,
            holder = %holder_did,
            "credential issued"
        );
        Ok(credential)
    }
}
