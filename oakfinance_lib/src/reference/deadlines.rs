use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{optional_date, read_file, required_date, ReferenceError};

#[derive(Debug, Clone, PartialEq)]
pub struct FilingDeadline {
    pub election_date: Option<NaiveDate>,
    pub report_period_start: Option<NaiveDate>,
    pub report_period_end: Option<NaiveDate>,
    pub filing_deadline: NaiveDate,
}

#[derive(Deserialize)]
struct DeadlineRow {
    election_date: Option<String>,
    report_period_start: Option<String>,
    report_period_end: Option<String>,
    filing_deadline: String,
}

/// Filing deadline calendar from `filing_deadlines.csv`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilingDeadlines {
    deadlines: Vec<FilingDeadline>,
}

impl FilingDeadlines {
    pub fn new(deadlines: Vec<FilingDeadline>) -> Self {
        Self { deadlines }
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// The latest deadline strictly before `today`.
    pub fn last_before(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.deadlines
            .iter()
            .map(|d| d.filing_deadline)
            .filter(|deadline| *deadline < today)
            .max()
    }
}

pub fn parse_filing_deadlines(content: &str) -> Result<FilingDeadlines, ReferenceError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut deadlines = Vec::new();
    for record in reader.deserialize::<DeadlineRow>() {
        let row = record?;
        deadlines.push(FilingDeadline {
            election_date: optional_date("election_date", row.election_date.as_deref())?,
            report_period_start: optional_date(
                "report_period_start",
                row.report_period_start.as_deref(),
            )?,
            report_period_end: optional_date("report_period_end", row.report_period_end.as_deref())?,
            filing_deadline: required_date("filing_deadline", &row.filing_deadline)?,
        });
    }
    Ok(FilingDeadlines::new(deadlines))
}

pub fn load_filing_deadlines(path: &Path) -> Result<FilingDeadlines, ReferenceError> {
    parse_filing_deadlines(&read_file(path)?)
}
