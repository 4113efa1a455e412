//! Buckets command implementation.

use serde::Serialize;
use std::path::Path;

/// Bucket listing result.
#[derive(Debug, Serialize)]
pub struct BucketsResult {
    /// Database path.
    pub path: String,
    /// Namespace the listing was taken from.
    pub namespace: String,
    /// Bucket names, sorted.
    pub buckets: Vec<String>,
}

/// Runs the buckets command.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path, namespace)?;

    let result = BucketsResult {
        path: path.display().to_string(),
        namespace: db.config().namespace.clone(),
        buckets: db.buckets()?,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            for name in &result.buckets {
                println!("{name}");
            }
        }
    }

    Ok(())
}
