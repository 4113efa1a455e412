//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use kvite_core::{Config, Database};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name used for file-backed test databases.
pub const TEST_DB_FILE: &str = "test.kvite";

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// Configuration used to open (and reopen) the database.
    config: Config,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a new in-memory test database with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        Self {
            db: Database::open_in_memory_with_config(config.clone())
                .expect("Failed to open in-memory database"),
            config,
            temp_dir: None,
        }
    }

    /// Creates a new file-based test database.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a new file-based test database with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_with_config(temp_dir.path().join(TEST_DB_FILE), config.clone())
            .expect("Failed to open file database");

        Self {
            db,
            config,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join(TEST_DB_FILE))
    }

    /// Closes and reopens a file-based database.
    ///
    /// # Panics
    ///
    /// Panics for in-memory databases, whose contents do not survive a close.
    pub fn reopen(&mut self) {
        let path = self.path().expect("Only file databases can be reopened");
        self.db.close().expect("Failed to close database");
        self.db = Database::open_with_config(path, self.config.clone())
            .expect("Failed to reopen database");
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use kvite_core::KvResult;

    /// Creates a database with `key_count` keys in the bucket `"test"`.
    ///
    /// Keys are `key_0000`, `key_0001`, ... and values are `value_<i>`.
    pub fn populated_database(key_count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        test_db
            .db
            .transaction(|txn| -> KvResult<()> {
                let bucket = txn.bucket("test");
                for i in 0..key_count {
                    bucket.put(&format!("key_{i:04}"), format!("value_{i}").as_bytes())?;
                }
                Ok(())
            })
            .expect("Failed to populate database");
        test_db
    }

    /// Creates a database with `bucket_count` buckets holding one key each.
    pub fn multi_bucket_database(bucket_count: usize) -> (TestDatabase, Vec<String>) {
        let test_db = TestDatabase::memory();
        let names: Vec<String> = (0..bucket_count).map(|i| format!("bucket_{i:02}")).collect();

        test_db
            .db
            .transaction(|txn| -> KvResult<()> {
                for name in &names {
                    txn.bucket(name.as_str()).put("key", name.as_bytes())?;
                }
                Ok(())
            })
            .expect("Failed to populate buckets");

        (test_db, names)
    }
}
