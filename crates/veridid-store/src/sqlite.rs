//! SQLite implementation of the LedgerStore trait.
//!
//! The primary persistent backend. Uses rusqlite with bundled SQLite,
//! wrapped in async via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use veridid_core::{decode_versioned, encode_versioned, now_millis, DidDocument, Ed25519PublicKey};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AppendResult, InsertResult, LedgerStore};

/// SQLite-backed ledger.
///
/// Thread-safe via an internal Mutex. Every query runs on tokio's blocking
/// pool so the async runtime is never stalled by disk I/O.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a SQLite database at the given path, creating and migrating it
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn encode_document(document: &DidDocument) -> Result<Vec<u8>> {
    encode_versioned(document).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_document(bytes: &[u8]) -> Result<DidDocument> {
    decode_versioned(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn insert_row(conn: &Connection, document: &DidDocument, blob: &[u8], or_ignore: bool) -> Result<usize> {
    let sql = if or_ignore {
        "INSERT OR IGNORE INTO did_versions
            (did, version, controller, active, timestamp, document, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    } else {
        "INSERT INTO did_versions
            (did, version, controller, active, timestamp, document, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    };

    let changed = conn.execute(
        sql,
        params![
            document.id,
            document.version as i64,
            document.controller.as_bytes().as_slice(),
            document.active,
            document.timestamp,
            blob,
            now_millis(),
        ],
    )?;
    Ok(changed)
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn insert_document(&self, document: &DidDocument) -> Result<InsertResult> {
        if document.version != 1 {
            return Err(StoreError::InvalidData(format!(
                "first version of {} must be 1, got {}",
                document.id, document.version
            )));
        }

        let document = document.clone();
        let blob = encode_document(&document)?;

        self.blocking(move |conn| {
            // (did, 1) is the primary key, so an existing DID makes this a no-op.
            let changed = insert_row(conn, &document, &blob, true)?;
            if changed == 0 {
                return Ok(InsertResult::AlreadyExists);
            }
            tracing::debug!(did = %document.id, "ledger: inserted version 1");
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn append_version(&self, document: &DidDocument) -> Result<AppendResult> {
        let document = document.clone();
        let blob = encode_document(&document)?;

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let current: Option<i64> = tx.query_row(
                "SELECT MAX(version) FROM did_versions WHERE did = ?1",
                params![document.id],
                |row| row.get(0),
            )?;
            let current_version = current.unwrap_or(0) as u64;

            if current_version == 0 || document.version != current_version + 1 {
                return Ok(AppendResult::Conflict { current_version });
            }

            insert_row(&tx, &document, &blob, false)?;
            tx.commit()?;

            tracing::debug!(did = %document.id, version = document.version, "ledger: appended");
            Ok(AppendResult::Appended)
        })
        .await
    }

    async fn latest(&self, did: &str) -> Result<Option<DidDocument>> {
        let did = did.to_string();
        self.blocking(move |conn| {
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT document FROM did_versions WHERE did = ?1
                     ORDER BY version DESC LIMIT 1",
                    params![did],
                    |row| row.get(0),
                )
                .optional()?;
            blob.as_deref().map(decode_document).transpose()
        })
        .await
    }

    async fn version(&self, did: &str, version: u64) -> Result<Option<DidDocument>> {
        let did = did.to_string();
        let Ok(version) = i64::try_from(version) else {
            return Ok(None);
        };
        self.blocking(move |conn| {
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT document FROM did_versions WHERE did = ?1 AND version = ?2",
                    params![did, version],
                    |row| row.get(0),
                )
                .optional()?;
            blob.as_deref().map(decode_document).transpose()
        })
        .await
    }

    async fn history(&self, did: &str) -> Result<Vec<DidDocument>> {
        let did = did.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT document FROM did_versions WHERE did = ?1 ORDER BY version",
            )?;
            let blobs = stmt
                .query_map(params![did], |row| row.get::<_, Vec<u8>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            blobs.iter().map(|b| decode_document(b)).collect()
        })
        .await
    }

    async fn list_dids(&self, controller: Option<&Ed25519PublicKey>) -> Result<Vec<String>> {
        let controller = controller.copied();
        self.blocking(move |conn| {
            let dids = match controller {
                Some(controller) => {
                    let mut stmt = conn.prepare(
                        "SELECT DISTINCT did FROM did_versions WHERE controller = ?1 ORDER BY did",
                    )?;
                    let rows = stmt
                        .query_map(params![controller.as_bytes().as_slice()], |row| row.get(0))?
                        .collect::<rusqlite::Result<Vec<String>>>()?;
                    rows
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT DISTINCT did FROM did_versions ORDER BY did")?;
                    let rows = stmt
                        .query_map([], |row| row.get(0))?
                        .collect::<rusqlite::Result<Vec<String>>>()?;
                    rows
                }
            };
            Ok(dids)
        })
        .await
    }

    async fn contains(&self, did: &str) -> Result<bool> {
        let did = did.to_string();
        self.blocking(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM did_versions WHERE did = ?1 LIMIT 1",
                    params![did],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }
}
