//! Credential schema registry.
//!
//! Schemas are content-addressed, so registering the same definition twice
//! is a no-op that returns the same id.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use veridid_core::{now_millis, validate_schema, Schema, SchemaId};

use crate::error::{RegistryError, Result};

/// A registered schema and who registered it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRecord {
    pub id: SchemaId,
    pub schema: Schema,
    pub author_did: String,
    pub registered_at: i64,
}

/// In-process schema registry.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<BTreeMap<SchemaId, SchemaRecord>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` on behalf of `author_did`.
    ///
    /// The caller is responsible for checking that `author_did` is an active
    /// DID it controls.
    pub fn register(&self, schema: Schema, author_did: &str) -> Result<SchemaId> {
        validate_schema(&schema).map_err(RegistryError::InvalidSchema)?;
        let id = schema.id();

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if schemas.contains_key(&id) {
            tracing::debug!(schema = ?id, "schema already registered");
            return Ok(id);
        }

        tracing::info!(schema = ?id, name = %schema.name, author = %author_did, "schema registered");
        schemas.insert(
            id,
            SchemaRecord {
                id,
                schema,
                author_did: author_did.to_string(),
                registered_at: now_millis(),
            },
        );
        Ok(id)
    }

    /// Look up a schema definition.
    pub fn get(&self, id: &SchemaId) -> Result<Schema> {
        self.record(id).map(|r| r.schema)
    }

    /// Look up a schema with its registration metadata.
    pub fn record(&self, id: &SchemaId) -> Result<SchemaRecord> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or(RegistryError::SchemaNotFound(*id))
    }

    /// All registered schemas, ordered by id.
    pub fn list(&self) -> Vec<SchemaRecord> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
