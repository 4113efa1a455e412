//! Delete command implementation.

use kvite_core::KvResult;
use std::path::Path;
use tracing::info;

/// Runs the delete command.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    bucket: &str,
    key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path, namespace)?;

    db.transaction(|txn| -> KvResult<()> { txn.bucket(bucket).delete(key) })?;

    info!(bucket, key, "key deleted");
    Ok(())
}
