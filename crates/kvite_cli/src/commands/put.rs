//! Put command implementation.

use kvite_core::{Database, KvResult};
use std::path::Path;
use tracing::info;

/// Runs the put command.
///
/// Creates the database file if it does not exist yet.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    bucket: &str,
    key: &str,
    value: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(path, namespace)?;

    db.transaction(|txn| -> KvResult<()> {
        txn.create_bucket_if_not_exists(bucket)?.put(key, value)
    })?;

    info!(bucket, key, size = value.len(), "value stored");
    Ok(())
}
