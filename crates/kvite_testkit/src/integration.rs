//! Model-checking harness.
//!
//! Applies operations to a database and to an in-memory model side by
//! side, so tests can assert the two never diverge.

use crate::generators::BucketOperation;
use kvite_core::{Database, KvResult};
use std::collections::HashMap;

/// A test harness that mirrors committed writes in a `HashMap`.
pub struct ModelHarness {
    /// The database instance.
    pub db: Database,
    /// Expected contents, keyed by `(bucket, key)`.
    model: HashMap<(String, String), Vec<u8>>,
}

impl ModelHarness {
    /// Creates a new harness with an in-memory database.
    pub fn new() -> Self {
        Self::with_database(Database::open_in_memory().expect("Failed to open database"))
    }

    /// Creates a new harness over an existing, empty database.
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            model: HashMap::new(),
        }
    }

    /// Applies a batch of operations in a single transaction.
    ///
    /// Gets are checked against the model as they run. When `commit` is
    /// false the transaction is rolled back and the model is left alone.
    pub fn apply(&mut self, bucket: &str, ops: &[BucketOperation], commit: bool) {
        let mut pending = self.model.clone();
        let mut txn = self.db.begin().expect("Failed to begin transaction");
        {
            let handle = txn.bucket(bucket);
            for op in ops {
                let slot = (bucket.to_string(), op.key().to_string());
                match op {
                    BucketOperation::Put { key, value } => {
                        handle.put(key, value).expect("Failed to put");
                        pending.insert(slot, value.clone());
                    }
                    BucketOperation::Delete { key } => {
                        handle.delete(key).expect("Failed to delete");
                        pending.remove(&slot);
                    }
                    BucketOperation::Get { key } => {
                        let actual = handle.get(key).expect("Failed to get");
                        assert_eq!(
                            actual.as_ref(),
                            pending.get(&slot),
                            "Value mismatch for {bucket}/{key} inside transaction"
                        );
                    }
                }
            }
        }

        if commit {
            txn.commit().expect("Failed to commit");
            self.model = pending;
        } else {
            txn.rollback().expect("Failed to roll back");
        }
    }

    /// Verifies every bucket in the database matches the model exactly.
    pub fn verify_all(&self) {
        let mut expected: HashMap<&str, HashMap<String, Vec<u8>>> = HashMap::new();
        for ((bucket, key), value) in &self.model {
            expected
                .entry(bucket.as_str())
                .or_default()
                .insert(key.clone(), value.clone());
        }

        let mut names: Vec<&str> = expected.keys().copied().collect();
        names.sort_unstable();
        assert_eq!(
            self.db.buckets().expect("Failed to list buckets"),
            names,
            "Bucket listing mismatch"
        );

        let txn = self.db.begin().expect("Failed to begin transaction");

        for (bucket, entries) in &expected {
            let actual = txn.bucket(*bucket).get_all().expect("Failed to read bucket");
            assert_eq!(&actual, entries, "Contents mismatch for bucket {bucket}");
        }
    }

    /// Reads a value through a managed transaction.
    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.db
            .transaction(|txn| -> KvResult<Option<Vec<u8>>> { txn.bucket(bucket).get(key) })
            .expect("Failed to get")
    }

    /// Returns the number of tracked keys.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

impl Default for ModelHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(key: &str, value: &[u8]) -> BucketOperation {
        BucketOperation::Put {
            key: key.to_string(),
            value: value.to_vec(),
        }
    }

    #[test]
    fn committed_batch_is_tracked() {
        let mut harness = ModelHarness::new();
        harness.apply("test", &[put("a", b"1"), put("b", b"2")], true);

        assert_eq!(harness.tracked_count(), 2);
        assert_eq!(harness.get("test", "a"), Some(b"1".to_vec()));
        harness.verify_all();
    }

    #[test]
    fn rolled_back_batch_is_discarded() {
        let mut harness = ModelHarness::new();
        harness.apply("test", &[put("a", b"1")], false);

        assert_eq!(harness.tracked_count(), 0);
        assert_eq!(harness.get("test", "a"), None);
        harness.verify_all();
    }
}
