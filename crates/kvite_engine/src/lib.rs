//! # KVite Engine
//!
//! SQLite adapter for KVite.
//!
//! This crate is the lowest layer of KVite. It knows how to open SQLite
//! databases, hand out pooled connections and drive transaction boundaries
//! on them. It does **not** know about buckets, keys or schemas: callers pass
//! fully formed statements and bind parameters.
//!
//! ## Design Principles
//!
//! - One [`Engine`] per database, shared across threads (`Send + Sync`)
//! - One [`EngineConnection`] per transaction, owned by a single thread
//! - Statements go through the per-connection prepared-statement cache
//! - No-rows is a value (`Ok(None)`), not an error
//!
//! ## Example
//!
//! ```rust
//! use kvite_engine::{params, BeginMode, Engine, EngineOptions, Location};
//!
//! let engine = Engine::open(Location::memory(), &EngineOptions::default()).unwrap();
//! let conn = engine.connect().unwrap();
//! conn.execute_batch("create table t (v integer not null)").unwrap();
//!
//! conn.begin(BeginMode::Deferred).unwrap();
//! conn.execute("insert into t (v) values (?1)", params![7]).unwrap();
//! conn.commit().unwrap();
//!
//! let v: Option<i64> = conn.query_row("select v from t", &[], |row| row.get(0)).unwrap();
//! assert_eq!(v, Some(7));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod engine;
mod error;
mod options;

pub use connection::EngineConnection;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use options::{BeginMode, EngineOptions, Location};

pub use rusqlite::{params, Row, ToSql};
