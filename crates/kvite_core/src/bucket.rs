//! Bucket handles: key/value access scoped to one transaction.

use crate::error::{KvError, KvResult};
use crate::schema::Statements;
use crate::transaction::Transaction;
use kvite_engine::{EngineConnection, EngineError, ToSql};
use std::borrow::Cow;
use std::collections::HashMap;

/// A named partition of key/value pairs, bound to an open transaction.
///
/// A `Bucket` owns no engine resource: every operation runs on its
/// transaction's connection. Handles are cheap and can be re-acquired by
/// name at any time.
///
/// # Example
///
/// ```rust
/// use kvite_core::Database;
///
/// let db = Database::open_in_memory()?;
/// let mut txn = db.begin()?;
/// {
///     let users = txn.bucket("users");
///     users.put("alice", b"admin")?;
///     assert_eq!(users.get("alice")?, Some(b"admin".to_vec()));
///     assert_eq!(users.get("bob")?, None);
/// }
/// txn.commit()?;
/// # Ok::<(), kvite_core::KvError>(())
/// ```
#[derive(Debug)]
pub struct Bucket<'txn> {
    name: String,
    txn: &'txn Transaction,
}

impl<'txn> Bucket<'txn> {
    pub(crate) fn new(txn: &'txn Transaction, name: String) -> Self {
        Self { name, txn }
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the transaction is finished or
    /// the engine rejects the write.
    pub fn put(&self, key: &str, value: &[u8]) -> KvResult<()> {
        validate_key(key)?;
        let (conn, statements) = self.prepare()?;
        let args = self.bind(&statements, vec![&key as &dyn ToSql, &value]);
        conn.execute(&statements.put, &args)?;
        Ok(())
    }

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the transaction is finished or
    /// the engine rejects the delete.
    pub fn delete(&self, key: &str) -> KvResult<()> {
        validate_key(key)?;
        let (conn, statements) = self.prepare()?;
        let args = self.bind(&statements, vec![&key as &dyn ToSql]);
        conn.execute(&statements.delete, &args)?;
        Ok(())
    }

    /// Returns the value stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the transaction is finished or
    /// the engine query fails.
    pub fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let (conn, statements) = self.prepare()?;
        let args = self.bind(&statements, vec![&key as &dyn ToSql]);
        Ok(conn.query_row(&statements.get, &args, |row| row.get(0))?)
    }

    /// Returns every pair currently visible in the bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is finished or the engine query
    /// fails.
    pub fn get_all(&self) -> KvResult<HashMap<String, Vec<u8>>> {
        let mut items = HashMap::new();
        self.for_each(|key, value| -> KvResult<()> {
            items.insert(key.to_string(), value.to_vec());
            Ok(())
        })?;
        Ok(items)
    }

    /// Calls `visit` for each pair in the bucket, in storage order.
    ///
    /// Rows are read lazily from an engine cursor. The first error returned
    /// by `visit` stops the iteration and is returned as is; engine errors
    /// are converted into `E`. The cursor is released on every path.
    ///
    /// # Errors
    ///
    /// Returns the visitor's error, or an engine error converted into `E`.
    pub fn for_each<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        E: From<KvError>,
        F: FnMut(&str, &[u8]) -> Result<(), E>,
    {
        let (conn, statements) = self.prepare()?;
        let args = self.bind(&statements, Vec::new());

        conn.query_each(&statements.iterate, &args, |row| {
            let key: String = row.get(0).map_err(EngineError::from)?;
            let value: Vec<u8> = row.get(1).map_err(EngineError::from)?;
            visit(&key, &value).map_err(Visit::Visitor)
        })
        .map_err(|err| match err {
            Visit::Engine(e) => E::from(KvError::from(e)),
            Visit::Visitor(e) => e,
        })
    }

    fn prepare(&self) -> KvResult<(&'txn EngineConnection, Cow<'txn, Statements>)> {
        let txn: &'txn Transaction = self.txn;
        let conn = txn.connection()?;
        let statements = txn.schema().statements(conn, &self.name)?;
        Ok((conn, statements))
    }

    /// Appends the bucket name when the statements expect it.
    fn bind<'a>(
        &'a self,
        statements: &Statements,
        mut args: Vec<&'a dyn ToSql>,
    ) -> Vec<&'a dyn ToSql> {
        if statements.binds_bucket {
            args.push(&self.name);
        }
        args
    }
}

/// Keeps engine failures apart from visitor errors inside `for_each`.
enum Visit<E> {
    Engine(EngineError),
    Visitor(E),
}

impl<E> From<EngineError> for Visit<E> {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

fn validate_key(key: &str) -> KvResult<()> {
    if key.is_empty() {
        return Err(KvError::InvalidKey {
            reason: "key must not be empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{BucketLayout, Config, Database, ErrorKind, KvError, KvResult};

    fn create_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn put_then_get() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        bucket.put("foo", b"bar").unwrap();
        assert_eq!(bucket.get("foo").unwrap(), Some(b"bar".to_vec()));
    }

    #[test]
    fn get_missing_is_none() {
        let db = create_db();
        let txn = db.begin().unwrap();
        assert_eq!(txn.bucket("test").get("asdf").unwrap(), None);
    }

    #[test]
    fn put_overwrites_previous() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        bucket.put("foo", b"baz").unwrap();
        bucket.put("foo", b"bar").unwrap();

        let mut count = 0;
        bucket
            .for_each(|_key, value| -> KvResult<()> {
                count += 1;
                assert_eq!(value, b"bar");
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_value_round_trips() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        bucket.put("empty", b"").unwrap();
        assert_eq!(bucket.get("empty").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn delete_removes_key() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        bucket.put("foo", b"bar").unwrap();
        bucket.delete("foo").unwrap();
        assert_eq!(bucket.get("foo").unwrap(), None);
    }

    #[test]
    fn delete_missing_is_noop() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        bucket.delete("missing").unwrap();
        assert_eq!(bucket.get("missing").unwrap(), None);
    }

    #[test]
    fn empty_key_rejected() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");

        for err in [
            bucket.put("", b"v").unwrap_err(),
            bucket.get("").unwrap_err(),
            bucket.delete("").unwrap_err(),
        ] {
            assert!(matches!(err, KvError::InvalidKey { .. }));
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn buckets_are_isolated() {
        let db = create_db();
        let txn = db.begin().unwrap();

        txn.bucket("users").put("id", b"user").unwrap();
        txn.bucket("posts").put("id", b"post").unwrap();

        assert_eq!(txn.bucket("users").get("id").unwrap(), Some(b"user".to_vec()));
        assert_eq!(txn.bucket("posts").get("id").unwrap(), Some(b"post".to_vec()));

        txn.bucket("users").delete("id").unwrap();
        assert_eq!(txn.bucket("posts").get("id").unwrap(), Some(b"post".to_vec()));
    }

    #[test]
    fn for_each_visits_every_pair() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");
        bucket.put("foo", b"bar").unwrap();
        bucket.put("baz", b"stuff").unwrap();
        txn.bucket("other").put("foo", b"elsewhere").unwrap();

        let mut items = Vec::new();
        bucket
            .for_each(|key, value| -> KvResult<()> {
                items.push((key.to_string(), value.to_vec()));
                Ok(())
            })
            .unwrap();

        items.sort();
        assert_eq!(
            items,
            vec![
                ("baz".to_string(), b"stuff".to_vec()),
                ("foo".to_string(), b"bar".to_vec()),
            ]
        );
    }

    #[derive(Debug, PartialEq)]
    enum VisitError {
        Stop(usize),
        Store,
    }

    impl From<KvError> for VisitError {
        fn from(_: KvError) -> Self {
            Self::Store
        }
    }

    #[test]
    fn for_each_stops_at_visitor_error() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");
        for i in 0..5 {
            bucket.put(&format!("key{i}"), b"v").unwrap();
        }

        let mut visited = 0;
        let result = bucket.for_each(|_key, _value| {
            visited += 1;
            if visited == 2 {
                return Err(VisitError::Stop(visited));
            }
            Ok(())
        });

        assert_eq!(result, Err(VisitError::Stop(2)));
        assert!(visited < 5);

        // Cursor released: the bucket is still usable.
        bucket.put("after", b"v").unwrap();
        assert_eq!(bucket.get_all().unwrap().len(), 6);
    }

    #[test]
    fn get_all_materializes_bucket() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let bucket = txn.bucket("test");
        bucket.put("a", b"1").unwrap();
        bucket.put("b", b"2").unwrap();

        let all = bucket.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("a"), Some(&b"1".to_vec()));
        assert_eq!(all.get("b"), Some(&b"2".to_vec()));

        assert!(txn.bucket("empty").get_all().unwrap().is_empty());
    }

    #[test]
    fn unusual_bucket_names_are_plain_values() {
        let db = create_db();
        let txn = db.begin().unwrap();
        let name = "weird 'name\"; drop table kvite; --";

        txn.bucket(name).put("k", b"v").unwrap();
        assert_eq!(txn.bucket(name).get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn empty_bucket_name_rejected() {
        let db = create_db();
        let txn = db.begin().unwrap();
        assert!(matches!(
            txn.bucket("").put("k", b"v"),
            Err(KvError::InvalidBucketName { .. })
        ));
    }

    fn per_bucket_db() -> Database {
        Database::open_in_memory_with_config(Config::new().layout(BucketLayout::TablePerBucket))
            .unwrap()
    }

    #[test]
    fn per_bucket_crud() {
        let db = per_bucket_db();
        let txn = db.begin().unwrap();
        let bucket = txn.create_bucket("test").unwrap();

        bucket.put("foo", b"bar").unwrap();
        bucket.put("foo", b"baz").unwrap();
        bucket.put("other", b"x").unwrap();
        assert_eq!(bucket.get("foo").unwrap(), Some(b"baz".to_vec()));

        bucket.delete("other").unwrap();
        assert_eq!(bucket.get_all().unwrap().len(), 1);
    }

    #[test]
    fn per_bucket_requires_creation() {
        let db = per_bucket_db();
        let txn = db.begin().unwrap();

        let err = txn.bucket("missing").get("k").unwrap_err();
        assert!(matches!(err, KvError::BucketNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn per_bucket_rejects_unsafe_names() {
        let db = per_bucket_db();
        let txn = db.begin().unwrap();

        let err = txn.create_bucket("x\"; drop table y; --").unwrap_err();
        assert!(matches!(err, KvError::InvalidIdentifier { .. }));

        let err = txn.bucket("bad name").put("k", b"v").unwrap_err();
        assert!(matches!(err, KvError::InvalidIdentifier { .. }));
    }
}
