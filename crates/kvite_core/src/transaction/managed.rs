//! Callback-scoped ("managed") transactions.

use crate::error::KvError;
use crate::transaction::Transaction;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Marks a transaction as managed for as long as it is alive.
///
/// The flag is cleared on drop, so it is reset whether the callback returns
/// or unwinds.
struct ManagedScope<'a> {
    txn: &'a mut Transaction,
}

impl<'a> ManagedScope<'a> {
    fn enter(txn: &'a mut Transaction) -> Self {
        txn.set_managed(true);
        Self { txn }
    }
}

impl Deref for ManagedScope<'_> {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        self.txn
    }
}

impl DerefMut for ManagedScope<'_> {
    fn deref_mut(&mut self) -> &mut Transaction {
        self.txn
    }
}

impl Drop for ManagedScope<'_> {
    fn drop(&mut self) {
        self.txn.set_managed(false);
    }
}

/// Runs `f` inside `txn`, then commits or rolls back.
///
/// - `Ok` from `f`: commit; a commit failure becomes the result.
/// - `Err` from `f`: rollback (failures are logged) and return the error
///   unchanged; commit is never attempted.
/// - panic in `f`: `txn` is dropped during unwinding, which rolls it back.
pub(crate) fn run<T, E, F>(mut txn: Transaction, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Transaction) -> Result<T, E>,
    E: From<KvError>,
{
    let outcome = {
        let mut scope = ManagedScope::enter(&mut txn);
        f(&mut *scope)
    };

    match outcome {
        Ok(value) => {
            txn.commit()?;
            Ok(value)
        }
        Err(err) => {
            if txn.is_open() {
                if let Err(rollback_err) = txn.rollback() {
                    warn!(error = %rollback_err, "rollback after callback error failed");
                }
            }
            Err(err)
        }
    }
}
