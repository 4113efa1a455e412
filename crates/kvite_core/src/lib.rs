//! # KVite Core
//!
//! Transactional key/value buckets on top of SQLite.
//!
//! This crate provides:
//! - [`Database`]: opens the store, lists buckets, starts transactions
//! - [`Transaction`]: caller-managed commit/rollback over one engine transaction
//! - [`Bucket`]: get/put/delete/iterate within a transaction
//! - Managed transactions via [`Database::transaction`]
//!
//! ## Example
//!
//! ```rust
//! use kvite_core::{Database, KvResult};
//!
//! let db = Database::open_in_memory()?;
//!
//! db.transaction(|txn| -> KvResult<()> {
//!     txn.bucket("settings").put("theme", b"dark")?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(db.buckets()?, vec!["settings".to_string()]);
//! # Ok::<(), kvite_core::KvError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod config;
mod database;
mod error;
mod schema;
mod transaction;

pub use bucket::Bucket;
pub use config::{BeginBehavior, BucketLayout, Config, DEFAULT_NAMESPACE};
pub use database::Database;
pub use error::{ErrorKind, KvError, KvResult};
pub use schema::{validate_identifier, CATALOG_TABLE, MAX_IDENTIFIER_LEN};
pub use transaction::{Transaction, TransactionState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
