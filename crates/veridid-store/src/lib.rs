//! # veridid store
//!
//! Append-only ledger of DID document versions behind the [`LedgerStore`]
//! trait, with a SQLite backend for persistence and an in-memory backend
//! for tests.
//!
//! ## Key Types
//!
//! - [`LedgerStore`] - The async trait for all ledger operations
//! - [`SqliteLedger`] - SQLite-based persistent ledger
//! - [`MemoryLedger`] - In-memory ledger for tests
//! - [`InsertResult`] / [`AppendResult`] - Outcomes of writes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veridid_store::{LedgerStore, SqliteLedger};
//!
//! async fn example() {
//!     let ledger = SqliteLedger::open("ledger.db").unwrap();
//!     let dids = ledger.list_dids(None).await.unwrap();
//!     println!("{} DIDs on record", dids.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **No hard delete**: rows are never updated or removed; SQLite triggers
//!   abort any attempt.
//! - **Version check on append**: a write that does not directly follow the
//!   stored head returns `Conflict` and writes nothing.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{AppendResult, InsertResult, LedgerStore};
