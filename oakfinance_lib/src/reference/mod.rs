//! Locally maintained reference tables: candidate mapping, filing deadlines
//! and expenditure codes.

mod candidates;
mod deadlines;
mod expenditure_codes;

pub use candidates::{load_candidate_mapping, parse_candidate_mapping, CandidateMapping};
pub use deadlines::{load_filing_deadlines, parse_filing_deadlines, FilingDeadline, FilingDeadlines};
pub use expenditure_codes::{load_expenditure_codes, parse_expenditure_codes, ExpenditureCodes};

use chrono::NaiveDate;

use crate::dates::parse_date;

/// Errors raised while loading reference data or settings.
#[derive(thiserror::Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid date in column {field}: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("Invalid election year: '{0}'")]
    InvalidYear(String),
    #[error("Invalid settings: {0}")]
    Config(String),
}

/// Empty cells are `None`; anything else must parse.
fn optional_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, ReferenceError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| ReferenceError::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

fn required_date(field: &'static str, raw: &str) -> Result<NaiveDate, ReferenceError> {
    optional_date(field, Some(raw))?.ok_or(ReferenceError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn read_file(path: &std::path::Path) -> Result<String, ReferenceError> {
    std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.display().to_string(),
        source,
    })
}
