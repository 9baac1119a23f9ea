//! Joins normalized records against the candidate mapping and projects the
//! contribution and expenditure record sets.
//!
//! Join chain: mapping (SOS ID) to filers (SOS ID) gives candidacies per
//! filer; candidacies to filings (internal filer ID); filings to
//! transactions (filing ID). Output is sorted, so identical inputs always
//! produce identical rows in identical order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::normalize::{
    NormalizedFiler, NormalizedFiling, NormalizedTransaction, TransactionKind,
};
use crate::reference::{CandidateMapping, ExpenditureCodes, FilingDeadlines};

/// Jurisdiction value marking a candidate-controlled committee.
pub const CANDIDATE_JURISDICTION: &str = "Candidate or Officeholder";

/// Published contribution columns, in output order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContributionRow {
    pub tran_id: String,
    pub filing_id: String,
    pub filer_id: String,
    pub filer_name: String,
    pub committee_name: Option<String>,
    pub contributor_name: String,
    pub contributor_type: String,
    pub contributor_category: Option<String>,
    pub contributor_address: String,
    pub contributor_location: Option<String>,
    pub contributor_region: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub amount: f64,
    pub receipt_date: Option<NaiveDate>,
    pub election_year: Option<i32>,
    pub office: Option<String>,
    pub jurisdiction: String,
    pub party: Option<String>,
    #[serde(skip)]
    pub element_id: String,
}

/// Published expenditure columns, in output order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExpenditureRow {
    pub tran_id: String,
    pub filing_id: String,
    pub filer_id: String,
    pub filer_name: String,
    pub committee_name: Option<String>,
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_location: Option<String>,
    pub expn_code: Option<String>,
    pub expenditure_type: Option<String>,
    pub expenditure_description: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub amount: f64,
    pub expenditure_date: Option<NaiveDate>,
    pub election_year: Option<i32>,
    pub office: Option<String>,
    pub jurisdiction: String,
    pub party: Option<String>,
    #[serde(skip)]
    pub element_id: String,
}

/// Counts of records that fell out of a join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub mapping_without_filer: u64,
    pub filers_without_filings: u64,
    pub filings_without_transactions: u64,
    pub transactions_without_candidacy: u64,
}

impl JoinStats {
    pub fn total_misses(&self) -> u64 {
        self.mapping_without_filer
            + self.filers_without_filings
            + self.filings_without_transactions
            + self.transactions_without_candidacy
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub contribution_forms: Vec<String>,
    pub late_contribution_form: String,
    pub expenditure_form: String,
    pub include_unitemized: bool,
    /// Reference date for the late-contribution cutoff.
    pub today: NaiveDate,
}

impl ReconcileOptions {
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            contribution_forms: settings.contribution_forms.clone(),
            late_contribution_form: settings.late_contribution_form.clone(),
            expenditure_form: settings.expenditure_form.clone(),
            include_unitemized: settings.include_unitemized,
            today,
        }
    }
}

pub struct ReconcileInput<'a> {
    pub filings: &'a [NormalizedFiling],
    pub transactions: &'a [NormalizedTransaction],
    pub filers: &'a [NormalizedFiler],
    pub candidate_mapping: &'a [CandidateMapping],
    pub deadlines: &'a FilingDeadlines,
    pub expenditure_codes: &'a ExpenditureCodes,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOutput {
    pub contributions: Vec<ContributionRow>,
    pub expenditures: Vec<ExpenditureRow>,
    pub stats: JoinStats,
}

/// One mapping row joined to one filer.
#[derive(Debug, Clone, Copy)]
struct Candidacy<'a> {
    mapping: &'a CandidateMapping,
    filer: &'a NormalizedFiler,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    order: usize,
}

impl Candidacy<'_> {
    fn new<'a>(mapping: &'a CandidateMapping, filer: &'a NormalizedFiler, order: usize) -> Candidacy<'a> {
        Candidacy {
            mapping,
            filer,
            start: mapping.start_date.or(filer.start_date),
            end: mapping.end_date.or(filer.end_date),
            order,
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= date) && self.end.map_or(true, |e| date <= e)
    }

    fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    fn election_year(&self) -> Option<i32> {
        self.mapping.election_year.or(self.filer.election_year)
    }

    /// Open-ended periods sort after every dated one.
    fn end_key(&self) -> (bool, Option<NaiveDate>) {
        (self.end.is_none(), self.end)
    }

    fn filer_name(&self) -> String {
        let name = if self.mapping.jurisdiction == CANDIDATE_JURISDICTION {
            self.filer
                .candidate_name
                .as_deref()
                .or(self.mapping.filer_name.as_deref())
                .unwrap_or(self.mapping.filer_name_local.as_str())
        } else {
            self.mapping.filer_name_local.as_str()
        };
        name.trim().to_string()
    }

    fn office(&self) -> Option<String> {
        self.filer.office.clone().or_else(|| self.mapping.office.clone())
    }
}

/// Picks the candidacy periods a transaction belongs to.
///
/// A single period always applies. With several, the ones whose window
/// contains `date` apply, narrowed to fully dated windows when any are; among
/// undated windows the election year decides. If no window contains `date`,
/// the earliest period ending after it applies, else the latest period.
fn resolve_candidacies<'c, 'a>(
    candidacies: &'c [Candidacy<'a>],
    date: Option<NaiveDate>,
) -> Vec<&'c Candidacy<'a>> {
    if candidacies.len() <= 1 {
        return candidacies.iter().collect();
    }
    let latest = || {
        candidacies
            .iter()
            .max_by_key(|c| (c.end_key(), c.election_year(), c.order))
            .into_iter()
            .collect::<Vec<_>>()
    };
    let Some(date) = date else {
        return latest();
    };

    let containing: Vec<&Candidacy> = candidacies.iter().filter(|c| c.contains(date)).collect();
    if containing.len() > 1 {
        let bounded: Vec<&Candidacy> =
            containing.iter().copied().filter(|c| c.is_bounded()).collect();
        if !bounded.is_empty() {
            return bounded;
        }
        return by_election_year(&containing, date.year());
    }
    if containing.len() == 1 {
        return containing;
    }

    candidacies
        .iter()
        .filter(|c| c.end.map_or(true, |e| e >= date))
        .min_by_key(|c| (c.end_key(), c.order))
        .map(|c| vec![c])
        .unwrap_or_else(latest)
}

/// Earliest election year not before `year`, else the latest one.
fn by_election_year<'c, 'a>(
    candidacies: &[&'c Candidacy<'a>],
    year: i32,
) -> Vec<&'c Candidacy<'a>> {
    let upcoming = candidacies
        .iter()
        .filter(|c| c.election_year().map_or(false, |y| y >= year))
        .min_by_key(|c| (c.election_year(), c.order));
    let chosen = upcoming.or_else(|| {
        candidacies
            .iter()
            .max_by_key(|c| (c.election_year(), c.order))
    });
    chosen.map(|c| vec![*c]).unwrap_or_default()
}

fn contribution_row(
    tx: &NormalizedTransaction,
    filing: &NormalizedFiling,
    candidacy: &Candidacy,
) -> ContributionRow {
    ContributionRow {
        tran_id: tx.tran_id.clone(),
        filing_id: filing.filing_id.clone(),
        filer_id: candidacy.mapping.filer_id.clone(),
        filer_name: candidacy.filer_name(),
        committee_name: filing.committee_name.clone(),
        contributor_name: tx.contributor_name.clone(),
        contributor_type: tx.contributor_type.clone(),
        contributor_category: tx.contributor_category.clone(),
        contributor_address: tx.contributor_address.clone(),
        contributor_location: tx.contributor_location.clone(),
        contributor_region: tx.contributor_region.clone(),
        city: tx.city.clone(),
        state: tx.state.clone(),
        zip_code: tx.zip_code.clone(),
        amount: tx.amount,
        receipt_date: tx.receipt_date,
        election_year: candidacy.election_year(),
        office: candidacy.office(),
        jurisdiction: candidacy.mapping.jurisdiction.clone(),
        party: tx.party.clone(),
        element_id: tx.element_id.clone(),
    }
}

fn expenditure_row(
    tx: &NormalizedTransaction,
    filing: &NormalizedFiling,
    candidacy: &Candidacy,
    codes: &ExpenditureCodes,
) -> ExpenditureRow {
    ExpenditureRow {
        tran_id: tx.tran_id.clone(),
        filing_id: filing.filing_id.clone(),
        filer_id: candidacy.mapping.filer_id.clone(),
        filer_name: candidacy.filer_name(),
        committee_name: filing.committee_name.clone(),
        recipient_name: tx.contributor_name.clone(),
        recipient_address: tx.contributor_address.clone(),
        recipient_location: tx.contributor_location.clone(),
        expn_code: tx.expn_code.clone(),
        expenditure_type: tx
            .expn_code
            .as_deref()
            .and_then(|code| codes.get(code))
            .map(str::to_string),
        expenditure_description: tx.description.clone(),
        city: tx.city.clone(),
        state: tx.state.clone(),
        zip_code: tx.zip_code.clone(),
        amount: tx.amount,
        expenditure_date: tx.receipt_date,
        election_year: candidacy.election_year(),
        office: candidacy.office(),
        jurisdiction: candidacy.mapping.jurisdiction.clone(),
        party: tx.party.clone(),
        element_id: tx.element_id.clone(),
    }
}

/// Joins everything and applies the form and date filters.
///
/// A transaction is a contribution when its schedule is a contribution form
/// and it was received before the candidacy ended (or the candidacy has no
/// end). Transactions on late-contribution filings are contributions too,
/// but only when the filing is dated on or after the most recent deadline
/// before `today`. Expenditures are the transactions on the expenditure form.
pub fn build_output(input: &ReconcileInput, options: &ReconcileOptions) -> ReconcileOutput {
    let mut stats = JoinStats::default();

    let mut filers_by_sos: BTreeMap<&str, Vec<&NormalizedFiler>> = BTreeMap::new();
    for filer in input.filers {
        if let Some(sos_id) = filer.sos_id.as_deref() {
            filers_by_sos.entry(sos_id).or_default().push(filer);
        }
    }

    let mut candidacies_by_filer: BTreeMap<&str, Vec<Candidacy>> = BTreeMap::new();
    for (order, mapping) in input.candidate_mapping.iter().enumerate() {
        match filers_by_sos.get(mapping.filer_id.as_str()) {
            Some(filers) => {
                for filer in filers {
                    candidacies_by_filer
                        .entry(filer.filer_nid.as_str())
                        .or_default()
                        .push(Candidacy::new(mapping, filer, order));
                }
            }
            None => {
                tracing::debug!(
                    "No filer registered under SOS ID {} ({})",
                    mapping.filer_id,
                    mapping.filer_name_local
                );
                stats.mapping_without_filer += 1;
            }
        }
    }

    let mut filings_by_id: BTreeMap<&str, (&NormalizedFiling, &[Candidacy])> = BTreeMap::new();
    let mut filers_with_filings: BTreeSet<&str> = BTreeSet::new();
    for filing in input.filings {
        let Some(filer_nid) = filing.filer_nid.as_deref() else {
            continue;
        };
        if let Some(candidacies) = candidacies_by_filer.get(filer_nid) {
            filers_with_filings.insert(filer_nid);
            filings_by_id.insert(filing.filing_id.as_str(), (filing, candidacies.as_slice()));
        }
    }
    stats.filers_without_filings = candidacies_by_filer
        .keys()
        .filter(|nid| !filers_with_filings.contains(*nid))
        .count() as u64;

    let late_cutoff = options.deadlines_cutoff(input.deadlines);

    let mut contributions = Vec::new();
    let mut expenditures = Vec::new();
    let mut filings_with_transactions: BTreeSet<&str> = BTreeSet::new();

    for tx in input.transactions {
        let Some((filing, candidacies)) = filings_by_id.get(tx.filing_id.as_str()) else {
            stats.transactions_without_candidacy += 1;
            continue;
        };
        filings_with_transactions.insert(filing.filing_id.as_str());
        if tx.kind == TransactionKind::Unitemized && !options.include_unitemized {
            continue;
        }

        let form = tx.form.as_deref().unwrap_or("");
        let is_contribution_form = options.contribution_forms.iter().any(|f| f == form);
        let is_late = filing.form.as_deref() == Some(options.late_contribution_form.as_str())
            && match (late_cutoff, filing.filing_date) {
                (Some(cutoff), Some(filed)) => filed >= cutoff,
                _ => false,
            };
        let is_expenditure = form == options.expenditure_form;

        let date = tx.receipt_date.or(filing.filing_date);
        for candidacy in resolve_candidacies(candidacies, date) {
            let before_end = match (candidacy.end, tx.receipt_date) {
                (None, _) => true,
                (Some(end), Some(received)) => received < end,
                (Some(_), None) => false,
            };
            if (is_contribution_form && before_end) || is_late {
                contributions.push(contribution_row(tx, filing, candidacy));
            }
            if is_expenditure {
                expenditures.push(expenditure_row(
                    tx,
                    filing,
                    candidacy,
                    input.expenditure_codes,
                ));
            }
        }
    }

    stats.filings_without_transactions = filings_by_id
        .keys()
        .filter(|id| !filings_with_transactions.contains(*id))
        .count() as u64;

    contributions.sort_by(|a, b| {
        (&a.filing_id, &a.tran_id, &a.element_id, a.election_year).cmp(&(
            &b.filing_id,
            &b.tran_id,
            &b.element_id,
            b.election_year,
        ))
    });
    expenditures.sort_by(|a, b| {
        (&a.filing_id, &a.tran_id, &a.element_id, a.election_year).cmp(&(
            &b.filing_id,
            &b.tran_id,
            &b.element_id,
            b.election_year,
        ))
    });

    if stats.total_misses() > 0 {
        tracing::info!(
            "Join misses: {} mapping rows without filer, {} filers without filings, {} filings without transactions, {} unjoined transactions",
            stats.mapping_without_filer,
            stats.filers_without_filings,
            stats.filings_without_transactions,
            stats.transactions_without_candidacy
        );
    }

    ReconcileOutput {
        contributions,
        expenditures,
        stats,
    }
}

impl ReconcileOptions {
    fn deadlines_cutoff(&self, deadlines: &FilingDeadlines) -> Option<NaiveDate> {
        let cutoff = deadlines.last_before(self.today);
        if cutoff.is_none() {
            tracing::warn!(
                "No filing deadline before {}, late contributions will be excluded",
                self.today
            );
        }
        cutoff
    }
}
