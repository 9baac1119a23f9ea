//! Per-candidate totals over the published record sets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::reconcile::{ContributionRow, ExpenditureRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalRow {
    pub election_year: Option<i32>,
    pub filer_name: String,
    pub count: u64,
    pub total: f64,
}

fn group<'a>(keys: impl Iterator<Item = (Option<i32>, &'a str, f64)>) -> Vec<TotalRow> {
    let mut groups: BTreeMap<(Option<i32>, &str), (u64, f64)> = BTreeMap::new();
    for (year, name, amount) in keys {
        let entry = groups.entry((year, name)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount;
    }
    groups
        .into_iter()
        .map(|((election_year, filer_name), (count, total))| TotalRow {
            election_year,
            filer_name: filer_name.to_string(),
            count,
            // Cents, so float drift never shows up in reports.
            total: (total * 100.0).round() / 100.0,
        })
        .collect()
}

/// Contribution totals grouped by `(election_year, filer_name)`, in key order.
pub fn contribution_totals(rows: &[ContributionRow]) -> Vec<TotalRow> {
    group(
        rows.iter()
            .map(|r| (r.election_year, r.filer_name.as_str(), r.amount)),
    )
}

pub fn expenditure_totals(rows: &[ExpenditureRow]) -> Vec<TotalRow> {
    group(
        rows.iter()
            .map(|r| (r.election_year, r.filer_name.as_str(), r.amount)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_year_and_name() {
        let rows = vec![
            (Some(2022), "Jane Doe", 500.0),
            (Some(2020), "Jane Doe", 10.0),
            (Some(2022), "Jane Doe", 0.1),
            (Some(2022), "Jane Doe", 0.2),
            (None, "Parks Yes", 40.0),
        ];
        let totals = group(rows.into_iter());
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].filer_name, "Parks Yes");
        assert_eq!(totals[0].election_year, None);
        assert_eq!(totals[1].election_year, Some(2020));
        assert_eq!(totals[2].count, 3);
        assert_eq!(totals[2].total, 500.3);
    }
}
