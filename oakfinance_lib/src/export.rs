//! CSV output with one-deep rotation of the previous file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CONTRIBUTIONS_CSV: &str = "contribs_socrata.csv";
pub const EXPENDITURES_CSV: &str = "expends_socrata.csv";

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("Export I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// `output/contribs.csv` -> `output/prev_contribs.csv`.
pub fn previous_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("prev_{}", name)))
}

/// Writes `rows` to `path`, header first. An existing file at `path` is
/// renamed to `prev_<name>` beforehand, replacing any older `prev_` file.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    if path.exists() {
        if let Some(prev) = previous_path(path) {
            fs::rename(path, &prev).map_err(io_err)?;
            tracing::debug!("Rotated {} to {}", path.display(), prev.display());
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(io_err)?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Reads back rows written by [`write_rows`].
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}
