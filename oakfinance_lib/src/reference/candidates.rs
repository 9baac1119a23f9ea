use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{optional_date, read_file, ReferenceError};

/// One candidacy period from `filer_to_candidate.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMapping {
    /// Committee name as the city knows it.
    pub filer_name_local: String,
    /// Secretary of State registration ID; joins to the filer's `CA SOS`.
    pub filer_id: String,
    /// Committee type, e.g. `Candidate or Officeholder` or `Ballot Measure Supporting`.
    pub jurisdiction: String,
    pub local_agency_id: Option<String>,
    pub election_year: Option<i32>,
    /// Candidate name for candidate committees.
    pub filer_name: Option<String>,
    pub office: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct CandidateRow {
    filer_name: Option<String>,
    sos_id: Option<String>,
    #[serde(rename = "type")]
    jurisdiction: Option<String>,
    local_agency_id: Option<String>,
    election_year: Option<String>,
    candidate: Option<String>,
    contest: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the candidate mapping. Columns not listed on [`CandidateMapping`]
/// (`is_terminated`, `citywide`, `incumbent`, ...) are ignored. Rows without
/// an SOS ID cannot join to anything and are skipped with a warning.
pub fn parse_candidate_mapping(content: &str) -> Result<Vec<CandidateMapping>, ReferenceError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<CandidateRow>().enumerate() {
        let row = record?;
        let Some(filer_id) = present(row.sos_id) else {
            tracing::warn!("Candidate mapping row {} has no sos_id, skipping", line + 2);
            continue;
        };
        let election_year = match present(row.election_year) {
            Some(year) => Some(
                year.parse::<i32>()
                    .map_err(|_| ReferenceError::InvalidYear(year.clone()))?,
            ),
            None => None,
        };
        rows.push(CandidateMapping {
            filer_name_local: present(row.filer_name).unwrap_or_default(),
            filer_id,
            jurisdiction: present(row.jurisdiction).unwrap_or_default(),
            local_agency_id: present(row.local_agency_id),
            election_year,
            filer_name: present(row.candidate),
            office: present(row.contest),
            start_date: optional_date("start", row.start.as_deref())?,
            end_date: optional_date("end", row.end.as_deref())?,
        });
    }
    Ok(rows)
}

pub fn load_candidate_mapping(path: &Path) -> Result<Vec<CandidateMapping>, ReferenceError> {
    let rows = parse_candidate_mapping(&read_file(path)?)?;
    tracing::info!("Loaded {} candidate mapping rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
filer_name,is_terminated,sos_id,type,local_agency_id,election_year,candidate,contest,citywide,incumbent,start,end,is_winner,ballot_status
Jane Doe for Mayor 2022,N,1001,Candidate or Officeholder,C-12,2022,Jane Doe,Mayor,Y,N,2021-06-01,2022-12-31,Y,
Parks Yes,N,1002,Ballot Measure Supporting,C-13,2022,,,Y,N,,,,
No Id Committee,N,,Candidate or Officeholder,C-14,2022,John Roe,Auditor,Y,N,,,,
";

    #[test]
    fn parses_and_renames_columns() {
        let rows = parse_candidate_mapping(CSV).unwrap();
        assert_eq!(rows.len(), 2);
        let jane = &rows[0];
        assert_eq!(jane.filer_id, "1001");
        assert_eq!(jane.filer_name_local, "Jane Doe for Mayor 2022");
        assert_eq!(jane.filer_name.as_deref(), Some("Jane Doe"));
        assert_eq!(jane.office.as_deref(), Some("Mayor"));
        assert_eq!(jane.jurisdiction, "Candidate or Officeholder");
        assert_eq!(jane.election_year, Some(2022));
        assert_eq!(jane.end_date, NaiveDate::from_ymd_opt(2022, 12, 31));
    }

    #[test]
    fn empty_dates_are_none() {
        let rows = parse_candidate_mapping(CSV).unwrap();
        assert_eq!(rows[1].start_date, None);
        assert_eq!(rows[1].end_date, None);
        assert_eq!(rows[1].filer_name, None);
    }

    #[test]
    fn bad_date_is_an_error() {
        let csv = "filer_name,sos_id,type,election_year,candidate,contest,start,end\nX,1,T,2022,,,soon,\n";
        match parse_candidate_mapping(csv) {
            Err(ReferenceError::InvalidDate { field, value }) => {
                assert_eq!(field, "start");
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }
}
