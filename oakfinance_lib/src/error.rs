//! Error types for the library layer.

use std::fmt;

use crate::export::ExportError;
use crate::fetch::FetchError;
use crate::reference::ReferenceError;
use crate::snapshot::SnapshotError;

/// Errors that abort a pipeline stage.
#[derive(Debug)]
pub enum OakFinanceError {
    /// A pull failed after retries, or the server refused it.
    Fetch(FetchError),
    /// A reference table or the settings file could not be loaded.
    Reference(ReferenceError),
    Snapshot(SnapshotError),
    Export(ExportError),
    /// Credentials or client construction failed before any request.
    Api(netfile_api::Error),
}

impl fmt::Display for OakFinanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch failed: {}", e),
            Self::Reference(e) => write!(f, "Reference data error: {}", e),
            Self::Snapshot(e) => write!(f, "Snapshot error: {}", e),
            Self::Export(e) => write!(f, "Export error: {}", e),
            Self::Api(e) => write!(f, "API error: {}", e),
        }
    }
}

impl std::error::Error for OakFinanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Reference(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Api(e) => Some(e),
        }
    }
}

impl From<FetchError> for OakFinanceError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ReferenceError> for OakFinanceError {
    fn from(e: ReferenceError) -> Self {
        Self::Reference(e)
    }
}

impl From<SnapshotError> for OakFinanceError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

impl From<ExportError> for OakFinanceError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

impl From<netfile_api::Error> for OakFinanceError {
    fn from(e: netfile_api::Error) -> Self {
        Self::Api(e)
    }
}
