//! CLI command implementations.

pub mod buckets;
pub mod delete;
pub mod dump;
pub mod get;
pub mod put;

use kvite_core::Database;
use std::path::Path;

/// Opens an existing database for a command.
fn open_existing(
    path: &Path,
    namespace: Option<&str>,
) -> Result<Database, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No database found at {}", path.display()).into());
    }
    Ok(Database::open(path, namespace)?)
}

/// Renders a value as text, falling back to hex for non-UTF-8 bytes.
fn display_value(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(text) => text.to_string(),
        Err(_) => value.iter().map(|b| format!("{b:02x}")).collect(),
    }
}
