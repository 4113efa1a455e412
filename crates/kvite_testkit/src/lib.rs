//! # KVite Testkit
//!
//! Test utilities for KVite.
//!
//! This crate provides:
//! - Test fixtures backed by temporary directories
//! - Property-based test generators using proptest
//! - A model harness that mirrors every write in a `HashMap`
//!
//! ## Usage
//!
//! ```rust
//! use kvite_testkit::prelude::*;
//!
//! with_temp_db(|db| {
//!     db.transaction(|txn| -> kvite_core::KvResult<()> {
//!         txn.bucket("test").put("foo", b"bar")
//!     })
//!     .unwrap();
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
