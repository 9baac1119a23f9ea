use std::fmt;

use serde::Serialize;

/// Why a record could not be turned into a normalized transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Unparseable {
    /// The element carried no nested model at all.
    MissingModel,
    /// The nested model was present but had the wrong shape.
    Malformed(String),
    MissingAmount,
    MissingDate,
    /// A date was present but in no recognized format.
    InvalidDate(String),
    /// The raw JSON record could not be decoded into its typed form.
    Undecodable(String),
}

impl fmt::Display for Unparseable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModel => write!(f, "missing transaction model"),
            Self::Malformed(reason) => write!(f, "malformed transaction model: {}", reason),
            Self::MissingAmount => write!(f, "missing amount"),
            Self::MissingDate => write!(f, "missing date"),
            Self::InvalidDate(raw) => write!(f, "invalid date {:?}", raw),
            Self::Undecodable(reason) => write!(f, "undecodable record: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnparseableRecord {
    /// Element ID, or the best identifier available for non-element records.
    pub element_id: Option<String>,
    pub filing_id: Option<String>,
    pub reason: Unparseable,
}

/// Everything normalization dropped or skipped, with counts.
///
/// Threaded through the normalizer by `&mut` and returned to the caller so
/// the operator can see how much data did not make it into the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub unparseable: Vec<UnparseableRecord>,
    pub superseded: u64,
    pub ignored_classification: u64,
    pub join_misses: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unparseable(
        &mut self,
        element_id: Option<&str>,
        filing_id: Option<&str>,
        reason: Unparseable,
    ) {
        tracing::debug!(
            "Unparseable record {:?} (filing {:?}): {}",
            element_id,
            filing_id,
            reason
        );
        self.unparseable.push(UnparseableRecord {
            element_id: element_id.map(str::to_string),
            filing_id: filing_id.map(str::to_string),
            reason,
        });
    }

    pub fn unparseable_count(&self) -> usize {
        self.unparseable.len()
    }

    /// True when no record was dropped for being unparseable or unjoinable.
    pub fn is_clean(&self) -> bool {
        self.unparseable.is_empty() && self.join_misses == 0
    }
}
