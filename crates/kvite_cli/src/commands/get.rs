//! Get command implementation.

use std::path::Path;

/// Runs the get command.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    bucket: &str,
    key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path, namespace)?;
    let txn = db.begin()?;

    match txn.bucket(bucket).get(key)? {
        Some(value) => {
            println!("{}", super::display_value(&value));
            Ok(())
        }
        None => Err(format!("Key {key:?} not found in bucket {bucket:?}").into()),
    }
}
