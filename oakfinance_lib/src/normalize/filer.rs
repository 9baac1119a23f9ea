use chrono::{Datelike, NaiveDate};
use netfile_api::types::{ElectionInfluence, Filer};

use crate::dates::parse_opt_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilerKind {
    Candidate,
    Measure,
    /// No election influence names a candidate or a measure.
    Unknown,
}

/// A filer with its current candidacy resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFiler {
    pub filer_nid: String,
    /// Secretary of State registration ID.
    pub sos_id: Option<String>,
    pub committee_name: Option<String>,
    pub kind: FilerKind,
    pub candidate_name: Option<String>,
    pub office: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub election_date: Option<NaiveDate>,
    pub election_year: Option<i32>,
}

fn select_influence(influences: &[ElectionInfluence]) -> (FilerKind, Option<&ElectionInfluence>) {
    if let Some(candidacy) = influences.iter().find(|i| i.candidate.is_some()) {
        return (FilerKind::Candidate, Some(candidacy));
    }
    if let Some(measure) = influences.iter().find(|i| i.measure.is_some()) {
        return (FilerKind::Measure, Some(measure));
    }
    (FilerKind::Unknown, None)
}

/// Resolves the filer's candidacy from the first influence naming a
/// candidate, else the first naming a measure. Later entries are ignored.
pub fn normalize_filer(filer: &Filer) -> NormalizedFiler {
    let (kind, influence) = select_influence(&filer.election_influences);
    let election_date =
        influence.and_then(|i| parse_opt_date(i.election_date.as_deref()));

    let (candidate_name, office) = match (kind, influence) {
        (FilerKind::Candidate, Some(i)) => (
            i.candidate
                .as_ref()
                .and_then(|c| c.candidate_name.clone())
                .or_else(|| filer.candidate_name.clone()),
            i.seat.as_ref().and_then(|s| s.office_name.clone()),
        ),
        _ => (None, None),
    };

    NormalizedFiler {
        filer_nid: filer.filer_nid.clone(),
        sos_id: filer.sos_id(),
        committee_name: filer.filer_name.clone(),
        kind,
        candidate_name,
        office,
        start_date: influence.and_then(|i| parse_opt_date(i.start_date.as_deref())),
        end_date: influence.and_then(|i| parse_opt_date(i.end_date.as_deref())),
        election_date,
        election_year: election_date.map(|d| d.year()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filer(value: serde_json::Value) -> Filer {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn first_candidate_influence_is_used() {
        let f = filer(json!({
            "filerNid": "1001",
            "registrations": {"CA SOS": "1440001"},
            "filerName": "Jane Doe for Mayor",
            "electionInfluences": [
                {"electionDate": "2020-11-03", "measure": {"measureNumber": "Y"}},
                {"electionDate": "2022-11-08", "startDate": "2021-06-01", "endDate": "2022-12-31",
                 "candidate": {"candidateName": "Jane Doe"}, "seat": {"officeName": "Mayor"}},
                {"electionDate": "2024-11-05", "candidate": {"candidateName": "Jane Doe"},
                 "seat": {"officeName": "Council District 3"}}
            ]
        }));
        let normalized = normalize_filer(&f);
        assert_eq!(normalized.kind, FilerKind::Candidate);
        assert_eq!(normalized.candidate_name.as_deref(), Some("Jane Doe"));
        assert_eq!(normalized.office.as_deref(), Some("Mayor"));
        assert_eq!(normalized.election_year, Some(2022));
        assert_eq!(normalized.end_date, NaiveDate::from_ymd_opt(2022, 12, 31));
        assert_eq!(normalized.sos_id.as_deref(), Some("1440001"));
    }

    #[test]
    fn measure_has_no_office() {
        let f = filer(json!({
            "filerNid": "1002",
            "electionInfluence": {"electionDate": "2022-11-08", "measure": {"measureNumber": "Q"}}
        }));
        let normalized = normalize_filer(&f);
        assert_eq!(normalized.kind, FilerKind::Measure);
        assert_eq!(normalized.office, None);
        assert_eq!(normalized.candidate_name, None);
        assert_eq!(normalized.election_year, Some(2022));
    }

    #[test]
    fn no_influence_leaves_everything_empty() {
        let normalized = normalize_filer(&filer(json!({"filerNid": "1003"})));
        assert_eq!(normalized.kind, FilerKind::Unknown);
        assert_eq!(normalized.election_date, None);
        assert_eq!(normalized.start_date, None);
    }
}
