//! Transaction state machine.

use crate::bucket::Bucket;
use crate::error::{KvError, KvResult};
use crate::schema::Schema;
use kvite_engine::{BeginMode, EngineConnection};
use std::sync::Arc;
use tracing::{debug, warn};

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is open and can run statements.
    Open,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    Aborted,
}

/// An engine-level transaction.
///
/// Buckets borrow the transaction, so it cannot be committed or rolled
/// back while a bucket handle is alive. A transaction dropped while still
/// open is rolled back.
///
/// # Finishing Twice
///
/// `commit` on a finished transaction succeeds without doing anything.
/// `rollback` on a finished transaction fails with
/// [`KvError::TransactionFinished`].
#[derive(Debug)]
pub struct Transaction {
    /// Layout and statement templates of the owning database.
    schema: Arc<Schema>,
    /// Engine connection holding the open transaction. `None` once finished.
    conn: Option<EngineConnection>,
    /// Current state.
    state: TransactionState,
    /// Set while a managed callback runs.
    managed: bool,
}

impl Transaction {
    /// Starts a transaction on `conn`.
    pub(crate) fn begin(
        schema: Arc<Schema>,
        conn: EngineConnection,
        mode: BeginMode,
    ) -> KvResult<Self> {
        conn.begin(mode)?;
        debug!(?mode, "transaction started");
        Ok(Self {
            schema,
            conn: Some(conn),
            state: TransactionState::Open,
            managed: false,
        })
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Checks if a managed callback currently owns this transaction.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// - [`KvError::IllegalState`] inside a managed callback
    /// - [`KvError::Engine`] if the engine cannot commit; the transaction is
    ///   then still open
    pub fn commit(&mut self) -> KvResult<()> {
        self.ensure_unmanaged("commit")?;
        let Some(conn) = self.conn.as_ref() else {
            return Ok(());
        };

        conn.commit()?;
        self.conn = None;
        self.state = TransactionState::Committed;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// - [`KvError::IllegalState`] inside a managed callback
    /// - [`KvError::TransactionFinished`] if already committed or rolled back
    /// - [`KvError::Engine`] if the engine cannot roll back; the transaction
    ///   is then still open
    pub fn rollback(&mut self) -> KvResult<()> {
        self.ensure_unmanaged("rollback")?;
        let conn = self.connection()?;

        conn.rollback()?;
        self.conn = None;
        self.state = TransactionState::Aborted;
        debug!("transaction rolled back");
        Ok(())
    }

    /// Returns a handle to the bucket `name`.
    ///
    /// Nothing is checked here; a missing or invalid bucket surfaces when an
    /// operation runs. With the per-bucket layout, operations on a bucket
    /// that was never created fail with [`KvError::BucketNotFound`].
    pub fn bucket(&self, name: impl Into<String>) -> Bucket<'_> {
        Bucket::new(self, name.into())
    }

    /// Creates the bucket `name` and returns a handle to it.
    ///
    /// With the shared-table layout buckets are implicit and this only
    /// returns the handle.
    ///
    /// # Errors
    ///
    /// - [`KvError::BucketExists`] if the bucket already exists, compared
    ///   case-insensitively (per-bucket layout)
    /// - [`KvError::IllegalState`] if its table name is taken by another
    ///   namespace (per-bucket layout)
    /// - [`KvError::InvalidIdentifier`] or [`KvError::InvalidBucketName`] for
    ///   a rejected name
    /// - [`KvError::TransactionFinished`] if the transaction is finished
    pub fn create_bucket(&self, name: impl Into<String>) -> KvResult<Bucket<'_>> {
        let name = name.into();
        self.schema.create_bucket(self.connection()?, &name, false)?;
        Ok(Bucket::new(self, name))
    }

    /// Creates the bucket `name` unless it exists, and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::create_bucket`], except an existing bucket is
    /// not an error.
    pub fn create_bucket_if_not_exists(&self, name: impl Into<String>) -> KvResult<Bucket<'_>> {
        let name = name.into();
        self.schema.create_bucket(self.connection()?, &name, true)?;
        Ok(Bucket::new(self, name))
    }

    /// Returns the open engine connection.
    pub(crate) fn connection(&self) -> KvResult<&EngineConnection> {
        self.conn.as_ref().ok_or(KvError::TransactionFinished)
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn set_managed(&mut self, managed: bool) {
        self.managed = managed;
    }

    fn ensure_unmanaged(&self, operation: &str) -> KvResult<()> {
        if self.managed {
            return Err(KvError::illegal_state(format!(
                "{operation} is not allowed inside a managed transaction"
            )));
        }
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.state = TransactionState::Aborted;
            match conn.rollback() {
                Ok(()) => debug!("open transaction rolled back on drop"),
                Err(e) => warn!(error = %e, "rollback on drop failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, ErrorKind, KvError, TransactionState};

    fn create_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn new_transaction_is_open() {
        let db = create_db();
        let txn = db.begin().unwrap();
        assert!(txn.is_open());
        assert!(!txn.is_managed());
        assert_eq!(txn.state(), TransactionState::Open);
    }

    #[test]
    fn commit_moves_to_committed() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.commit().unwrap();
        assert!(!txn.is_open());
        assert_eq!(txn.state(), TransactionState::Committed);
    }

    #[test]
    fn commit_twice_is_noop() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.commit().unwrap();
        txn.commit().unwrap();
        assert_eq!(txn.state(), TransactionState::Committed);
    }

    #[test]
    fn commit_after_rollback_is_noop() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.rollback().unwrap();
        txn.commit().unwrap();
        assert_eq!(txn.state(), TransactionState::Aborted);
    }

    #[test]
    fn rollback_twice_fails() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.rollback().unwrap();
        assert_eq!(txn.state(), TransactionState::Aborted);

        let err = txn.rollback().unwrap_err();
        assert!(matches!(err, KvError::TransactionFinished));
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn rollback_after_commit_fails() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.commit().unwrap();
        assert!(matches!(
            txn.rollback(),
            Err(KvError::TransactionFinished)
        ));
    }

    #[test]
    fn managed_flag_blocks_boundary_calls() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.set_managed(true);

        assert!(txn.commit().unwrap_err().is_illegal_state());
        assert!(txn.rollback().unwrap_err().is_illegal_state());
        assert!(txn.is_open());

        txn.set_managed(false);
        txn.commit().unwrap();
    }

    #[test]
    fn bucket_operations_fail_after_finish() {
        let db = create_db();
        let mut txn = db.begin().unwrap();
        txn.commit().unwrap();

        let bucket = txn.bucket("test");
        assert!(matches!(
            bucket.put("k", b"v"),
            Err(KvError::TransactionFinished)
        ));
        assert!(matches!(bucket.get("k"), Err(KvError::TransactionFinished)));
        assert!(matches!(
            bucket.delete("k"),
            Err(KvError::TransactionFinished)
        ));
        assert!(matches!(
            txn.create_bucket("test"),
            Err(KvError::TransactionFinished)
        ));
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let db = create_db();
        {
            let txn = db.begin().unwrap();
            txn.bucket("test").put("k", b"v").unwrap();
        }

        let txn = db.begin().unwrap();
        assert_eq!(txn.bucket("test").get("k").unwrap(), None);
    }

    #[test]
    fn bucket_handles_are_reacquirable() {
        let db = create_db();
        let mut txn = db.begin().unwrap();

        txn.bucket("test").put("k", b"v").unwrap();
        let again = txn.bucket("test");
        assert_eq!(again.get("k").unwrap(), Some(b"v".to_vec()));
        drop(again);

        txn.commit().unwrap();
    }
}
