//! Transactions over a pooled engine connection.
//!
//! A [`Transaction`] owns one engine connection with an open `BEGIN` for its
//! whole life. It is either driven directly by the caller (`commit` /
//! `rollback`) or by the managed runner behind
//! [`crate::Database::transaction`], which owns the boundary and rejects
//! boundary calls made from inside the callback.

pub(crate) mod managed;
mod state;

pub use state::{Transaction, TransactionState};
