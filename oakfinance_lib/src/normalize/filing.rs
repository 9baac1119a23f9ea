use chrono::NaiveDate;
use netfile_api::types::Filing;

use crate::dates::parse_opt_date;

/// A filing flattened to the fields the reconciler joins on.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFiling {
    pub filing_id: String,
    pub filer_nid: Option<String>,
    pub filing_date: Option<NaiveDate>,
    /// Form number without the `FPPC` prefix, e.g. `460` or `497`.
    pub form: Option<String>,
    pub committee_name: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

pub fn normalize_filing(filing: &Filing) -> NormalizedFiling {
    let filing_date = parse_opt_date(filing.calculated_date.as_deref())
        .or_else(|| parse_opt_date(filing.filing_meta.legal_filing_date.as_deref()));
    NormalizedFiling {
        filing_id: filing.filing_nid.clone(),
        filer_nid: filing.filer_meta.filer_id.clone(),
        filing_date,
        form: filing
            .specification_ref
            .name
            .as_deref()
            .map(|name| name.replace("FPPC", "")),
        committee_name: filing.filer_meta.common_name.clone(),
        period_start: parse_opt_date(filing.filing_meta.start_date.as_deref()),
        period_end: parse_opt_date(filing.filing_meta.end_date.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_fppc_prefix_and_parses_dates() {
        let filing: Filing = serde_json::from_value(json!({
            "filingNid": "f1",
            "filerMeta": {"filerId": 1001, "commonName": "Committee A"},
            "calculatedDate": "2022-07-29T16:02:11",
            "specificationRef": {"name": "FPPC460"},
            "filingMeta": {"startDate": "2022-01-01", "endDate": "2022-06-30"}
        }))
        .unwrap();
        let normalized = normalize_filing(&filing);
        assert_eq!(normalized.form.as_deref(), Some("460"));
        assert_eq!(normalized.filer_nid.as_deref(), Some("1001"));
        assert_eq!(normalized.filing_date, NaiveDate::from_ymd_opt(2022, 7, 29));
        assert_eq!(normalized.period_end, NaiveDate::from_ymd_opt(2022, 6, 30));
    }

    #[test]
    fn filing_date_falls_back_to_legal_date() {
        let filing: Filing = serde_json::from_value(json!({
            "filingNid": "f2",
            "calculatedDate": null,
            "specificationRef": {"name": "FPPC497"},
            "filingMeta": {"legalFilingDate": "2022-10-27"}
        }))
        .unwrap();
        let normalized = normalize_filing(&filing);
        assert_eq!(normalized.form.as_deref(), Some("497"));
        assert_eq!(normalized.filing_date, NaiveDate::from_ymd_opt(2022, 10, 27));
        assert_eq!(normalized.filer_nid, None);
    }
}
