//! Raw JSON snapshots of each pulled collection, so a build can be replayed
//! without touching the API.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

pub const FILINGS: &str = "filings";
pub const FILING_ELEMENTS: &str = "filing_elements";
pub const FILERS: &str = "filers";

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

/// Writes `records` as a pretty-printed JSON array to `<dir>/<name>.json`,
/// creating `dir` if needed.
pub fn save_snapshot(dir: &Path, name: &str, records: &[Value]) -> Result<PathBuf, SnapshotError> {
    let path = snapshot_path(dir, name);
    let io_err = |source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    let body = serde_json::to_string_pretty(records).map_err(|source| SnapshotError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(&path, body).map_err(io_err)?;
    tracing::info!("Saved {} {} records to {}", records.len(), name, path.display());
    Ok(path)
}

pub fn load_snapshot(dir: &Path, name: &str) -> Result<Vec<Value>, SnapshotError> {
    let path = snapshot_path(dir, name);
    let body = fs::read_to_string(&path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records: Vec<Value> = serde_json::from_str(&body).map_err(|source| SnapshotError::Json {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!("Loaded {} {} records from {}", records.len(), name, path.display());
    Ok(records)
}
