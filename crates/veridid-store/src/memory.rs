//! In-memory implementation of the LedgerStore trait.
//!
//! Primarily for testing. Same semantics as SQLite, no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use veridid_core::{DidDocument, Ed25519PublicKey};

use crate::error::{Result, StoreError};
use crate::traits::{AppendResult, InsertResult, LedgerStore};

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryLedger {
    /// DID -> versions, index 0 holds version 1.
    documents: RwLock<HashMap<String, Vec<DidDocument>>>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<DidDocument>>>> {
        self.documents
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<DidDocument>>>> {
        self.documents
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn insert_document(&self, document: &DidDocument) -> Result<InsertResult> {
        if document.version != 1 {
            return Err(StoreError::InvalidData(format!(
                "first version of {} must be 1, got {}",
                document.id, document.version
            )));
        }

        let mut documents = self.write()?;
        if documents.contains_key(&document.id) {
            return Ok(InsertResult::AlreadyExists);
        }
        documents.insert(document.id.clone(), vec![document.clone()]);
        Ok(InsertResult::Inserted)
    }

    async fn append_version(&self, document: &DidDocument) -> Result<AppendResult> {
        let mut documents = self.write()?;
        let Some(versions) = documents.get_mut(&document.id) else {
            return Ok(AppendResult::Conflict { current_version: 0 });
        };

        let current_version = versions.len() as u64;
        if document.version != current_version + 1 {
            return Ok(AppendResult::Conflict { current_version });
        }
        versions.push(document.clone());
        Ok(AppendResult::Appended)
    }

    async fn latest(&self, did: &str) -> Result<Option<DidDocument>> {
        Ok(self.read()?.get(did).and_then(|v| v.last()).cloned())
    }

    async fn version(&self, did: &str, version: u64) -> Result<Option<DidDocument>> {
        let documents = self.read()?;
        let Some(versions) = documents.get(did) else {
            return Ok(None);
        };
        let found = version
            .checked_sub(1)
            .and_then(|i| versions.get(i as usize))
            .cloned();
        Ok(found)
    }

    async fn history(&self, did: &str) -> Result<Vec<DidDocument>> {
        Ok(self.read()?.get(did).cloned().unwrap_or_default())
    }

    async fn list_dids(&self, controller: Option<&Ed25519PublicKey>) -> Result<Vec<String>> {
        let documents = self.read()?;
        let mut dids: Vec<String> = documents
            .iter()
            .filter(|(_, versions)| match controller {
                Some(c) => versions.last().is_some_and(|d| &d.controller == c),
                None => true,
            })
            .map(|(did, _)| did.clone())
            .collect();
        dids.sort();
        Ok(dids)
    }

    async fn contains(&self, did: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(did))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridid_core::{Blake3Hash, Keypair, VerificationMethod};

    fn doc(did: &str, seed: u8, version: u64) -> DidDocument {
        DidDocument {
            id: did.into(),
            controller: Keypair::from_seed(&[seed; 32]).public_key(),
            verification_methods: vec![VerificationMethod::reference("k1")],
            services: vec![],
            data_hash: Blake3Hash::hash(&version.to_le_bytes()),
            timestamp: version as i64,
            active: true,
            version,
        }
    }

    #[tokio::test]
    async fn test_insert_and_latest() {
        let ledger = MemoryLedger::new();
        let d = doc("did:example:alice", 1, 1);

        assert_eq!(ledger.insert_document(&d).await.unwrap(), InsertResult::Inserted);
        assert_eq!(
            ledger.insert_document(&d).await.unwrap(),
            InsertResult::AlreadyExists
        );
        assert_eq!(ledger.latest(&d.id).await.unwrap(), Some(d.clone()));
        assert!(ledger.contains(&d.id).await.unwrap());
        assert!(ledger.latest("did:example:bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_requires_version_one() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .insert_document(&doc("did:example:alice", 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_append_checks_version() {
        let ledger = MemoryLedger::new();
        let did = "did:example:alice";
        ledger.insert_document(&doc(did, 1, 1)).await.unwrap();

        assert_eq!(
            ledger.append_version(&doc(did, 1, 3)).await.unwrap(),
            AppendResult::Conflict { current_version: 1 }
        );
        assert_eq!(
            ledger.append_version(&doc(did, 1, 2)).await.unwrap(),
            AppendResult::Appended
        );
        assert_eq!(
            ledger.append_version(&doc(did, 1, 2)).await.unwrap(),
            AppendResult::Conflict { current_version: 2 }
        );
        assert_eq!(
            ledger
                .append_version(&doc("did:example:nobody", 1, 2))
                .await
                .unwrap(),
            AppendResult::Conflict { current_version: 0 }
        );

        let history = ledger.history(did).await.unwrap();
        assert_eq!(history.iter().map(|d| d.version).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(ledger.version(did, 1).await.unwrap().unwrap().version, 1);
        assert!(ledger.version(did, 0).await.unwrap().is_none());
        assert!(ledger.version(did, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_controller() {
        let ledger = MemoryLedger::new();
        ledger.insert_document(&doc("did:example:b", 1, 1)).await.unwrap();
        ledger.insert_document(&doc("did:example:a", 1, 1)).await.unwrap();
        ledger.insert_document(&doc("did:example:c", 2, 1)).await.unwrap();

        let all = ledger.list_dids(None).await.unwrap();
        assert_eq!(all, ["did:example:a", "did:example:b", "did:example:c"]);

        let owner = Keypair::from_seed(&[1; 32]).public_key();
        let owned = ledger.list_dids(Some(&owner)).await.unwrap();
        assert_eq!(owned, ["did:example:a", "did:example:b"]);
    }
}
