//! Dump command implementation.

use kvite_core::KvError;
use serde::Serialize;
use std::path::Path;

/// A single bucket entry.
#[derive(Debug, Serialize)]
pub struct Entry {
    /// Key.
    pub key: String,
    /// Value as UTF-8 text, or hex if not valid UTF-8.
    pub value: String,
    /// Value size in bytes.
    pub size: usize,
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    bucket: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path, namespace)?;
    let txn = db.begin()?;

    let mut entries = Vec::new();
    txn.bucket(bucket).for_each(|key, value| -> Result<(), KvError> {
        entries.push(Entry {
            key: key.to_string(),
            value: super::display_value(value),
            size: value.len(),
        });
        Ok(())
    })?;
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
        _ => {
            println!("Bucket: {bucket} ({} entries)", entries.len());
            for entry in &entries {
                println!("  {} = {}", entry.key, entry.value);
            }
        }
    }

    Ok(())
}
