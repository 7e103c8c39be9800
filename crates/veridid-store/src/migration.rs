//! SQLite schema steps.
//!
//! The applied step count lives in `PRAGMA user_version`. Steps only ever
//! get appended to [`STEPS`]; an applied step is never edited.

use rusqlite::{Connection, Transaction};

use crate::error::{Result, StoreError};

/// Ordered DDL steps. Step `i` moves the file from version `i` to `i + 1`.
const STEPS: &[&str] = &[
    // v1: append-only document ledger, one row per document version
    r#"
    CREATE TABLE did_versions (
        did         TEXT    NOT NULL,
        version     INTEGER NOT NULL,   -- 1 on create, +1 per mutation
        controller  BLOB    NOT NULL,   -- Ed25519 public key
        active      INTEGER NOT NULL,   -- 0 once deactivated
        timestamp   INTEGER NOT NULL,   -- Unix ms, from the document
        document    BLOB    NOT NULL,   -- versioned CBOR envelope
        recorded_at INTEGER NOT NULL,   -- local append time
        PRIMARY KEY (did, version)
    );

    CREATE INDEX did_versions_by_controller ON did_versions(controller);

    CREATE TRIGGER did_versions_append_only_u BEFORE UPDATE ON did_versions
    BEGIN SELECT RAISE(ABORT, 'did_versions is append-only'); END;

    CREATE TRIGGER did_versions_append_only_d BEFORE DELETE ON did_versions
    BEGIN SELECT RAISE(ABORT, 'did_versions is append-only'); END;
    "#,
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Schema version recorded in the open file.
pub fn file_version(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Bring `conn` up to [`latest_version`]. A no-op on an up-to-date file.
///
/// Files written by a newer build are refused rather than touched.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let from = file_version(conn)?;
    let to = latest_version();

    if from > to {
        return Err(StoreError::Migration(format!(
            "file is at schema v{from}, this build only knows v{to}"
        )));
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (i, step) in STEPS.iter().enumerate().skip(from as usize) {
        apply(&tx, i as u32 + 1, step)?;
    }
    tx.commit()?;

    tracing::debug!(from, to, "ledger schema migrated");
    Ok(())
}

fn apply(tx: &Transaction<'_>, version: u32, ddl: &str) -> Result<()> {
    tx.execute_batch(ddl)
        .map_err(|e| StoreError::Migration(format!("step v{version}: {e}")))?;
    // PRAGMA takes no bound parameters
    tx.execute_batch(&format!("PRAGMA user_version = {version}"))?;
    Ok(())
}
