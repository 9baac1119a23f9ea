//! Stage orchestration: download raw collections, then build the published
//! record sets from snapshots and reference tables.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use netfile_api::types::{Filer, Filing, FilingElement};
use netfile_api::{FilerQuery, FilingElementQuery, FilingQuery, Query};
use serde_json::Value;

use crate::config::Settings;
use crate::error::OakFinanceError;
use crate::export::{write_rows, CONTRIBUTIONS_CSV, EXPENDITURES_CSV};
use crate::fetch::{PageSource, PaginatedFetcher};
use crate::normalize::{
    decode_records, normalize_elements, normalize_filer, normalize_filing, Diagnostics,
};
use crate::reconcile::{build_output, ReconcileInput, ReconcileOptions, ReconcileOutput};
use crate::reference::{
    load_candidate_mapping, load_expenditure_codes, load_filing_deadlines, CandidateMapping,
    ExpenditureCodes, FilingDeadlines, ReferenceError,
};
use crate::snapshot::{load_snapshot, save_snapshot, FILERS, FILINGS, FILING_ELEMENTS};

pub const CANDIDATE_MAPPING_CSV: &str = "filer_to_candidate.csv";
pub const FILING_DEADLINES_CSV: &str = "filing_deadlines.csv";
pub const EXPENDITURE_CODES_CSV: &str = "expenditure_codes.csv";

/// The three raw collections, exactly as the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCollections {
    pub filings: Vec<Value>,
    pub filing_elements: Vec<Value>,
    pub filers: Vec<Value>,
}

impl RawCollections {
    pub fn save(&self, dir: &Path) -> Result<(), OakFinanceError> {
        save_snapshot(dir, FILINGS, &self.filings)?;
        save_snapshot(dir, FILING_ELEMENTS, &self.filing_elements)?;
        save_snapshot(dir, FILERS, &self.filers)?;
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self, OakFinanceError> {
        Ok(Self {
            filings: load_snapshot(dir, FILINGS)?,
            filing_elements: load_snapshot(dir, FILING_ELEMENTS)?,
            filers: load_snapshot(dir, FILERS)?,
        })
    }
}

/// Which filing elements a download pulls.
#[derive(Debug, Clone, Copy)]
pub enum ElementScope<'a> {
    /// Every element visible to the agency.
    All,
    /// Only elements of filings by mapped candidates, one pull per filing.
    ByFiling(&'a [CandidateMapping]),
}

/// Pulls filers, filings and filing elements, in that order.
pub async fn download<S: PageSource>(
    fetcher: &PaginatedFetcher<S>,
    settings: &Settings,
    scope: ElementScope<'_>,
) -> Result<RawCollections, OakFinanceError> {
    let filers: Vec<Value> = fetcher.fetch_all(FilerQuery::default().with_parts()).await?;
    let filings: Vec<Value> = fetcher.fetch_all(FilingQuery::default()).await?;

    let elements_query = FilingElementQuery::default().with_parts();
    let filing_elements: Vec<Value> = match scope {
        ElementScope::All => fetcher.fetch_all(elements_query).await?,
        ElementScope::ByFiling(mapping) => {
            let ids = candidate_filing_ids(&filers, &filings, mapping);
            tracing::info!("Pulling elements for {} candidate filings", ids.len());
            fetcher
                .fetch_by_parents(elements_query, &ids, &settings.skip_list)
                .await?
        }
    };

    Ok(RawCollections {
        filings,
        filing_elements,
        filers,
    })
}

/// IDs of filings submitted by filers whose SOS ID is in `mapping`, in
/// filing order without repeats.
pub fn candidate_filing_ids(
    filers: &[Value],
    filings: &[Value],
    mapping: &[CandidateMapping],
) -> Vec<String> {
    let mut scratch = Diagnostics::new();
    let sos_ids: BTreeSet<&str> = mapping.iter().map(|m| m.filer_id.as_str()).collect();
    let filer_nids: BTreeSet<String> = decode_records::<Filer>(filers, &mut scratch)
        .iter()
        .map(normalize_filer)
        .filter(|f| f.sos_id.as_deref().map_or(false, |id| sos_ids.contains(id)))
        .map(|f| f.filer_nid)
        .collect();

    let mut seen = BTreeSet::new();
    decode_records::<Filing>(filings, &mut scratch)
        .iter()
        .map(normalize_filing)
        .filter(|f| f.filer_nid.as_ref().map_or(false, |nid| filer_nids.contains(nid)))
        .map(|f| f.filing_id)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Locally maintained lookup tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub candidate_mapping: Vec<CandidateMapping>,
    pub deadlines: FilingDeadlines,
    pub expenditure_codes: ExpenditureCodes,
}

impl ReferenceTables {
    /// The candidate mapping is required; deadlines and expenditure codes are
    /// optional and load empty when their file is absent.
    pub fn load(input_dir: &Path) -> Result<Self, ReferenceError> {
        let candidate_mapping = load_candidate_mapping(&input_dir.join(CANDIDATE_MAPPING_CSV))?;

        let deadlines_path = input_dir.join(FILING_DEADLINES_CSV);
        let deadlines = if deadlines_path.exists() {
            load_filing_deadlines(&deadlines_path)?
        } else {
            tracing::warn!("{} not found, no late contributions", deadlines_path.display());
            FilingDeadlines::default()
        };

        let codes_path = input_dir.join(EXPENDITURE_CODES_CSV);
        let expenditure_codes = if codes_path.exists() {
            load_expenditure_codes(&codes_path)?
        } else {
            tracing::debug!("{} not found", codes_path.display());
            ExpenditureCodes::default()
        };

        tracing::info!(
            "Loaded {} candidate mapping rows, {} expenditure codes",
            candidate_mapping.len(),
            expenditure_codes.len()
        );
        Ok(Self {
            candidate_mapping,
            deadlines,
            expenditure_codes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output: ReconcileOutput,
    pub diagnostics: Diagnostics,
    pub filings: usize,
    pub filers: usize,
    pub transactions: usize,
}

/// Decodes and normalizes the raw collections, then reconciles them.
pub fn build(
    raw: &RawCollections,
    tables: &ReferenceTables,
    settings: &Settings,
    today: NaiveDate,
) -> BuildReport {
    let mut diagnostics = Diagnostics::new();

    let filings: Vec<_> = decode_records::<Filing>(&raw.filings, &mut diagnostics)
        .iter()
        .map(normalize_filing)
        .collect();
    let filers: Vec<_> = decode_records::<Filer>(&raw.filers, &mut diagnostics)
        .iter()
        .map(normalize_filer)
        .collect();
    let elements = decode_records::<FilingElement>(&raw.filing_elements, &mut diagnostics);
    let transactions = normalize_elements(&elements, settings.region_rule, &mut diagnostics);

    let input = ReconcileInput {
        filings: &filings,
        transactions: &transactions,
        filers: &filers,
        candidate_mapping: &tables.candidate_mapping,
        deadlines: &tables.deadlines,
        expenditure_codes: &tables.expenditure_codes,
    };
    let output = build_output(&input, &ReconcileOptions::from_settings(settings, today));
    diagnostics.join_misses = output.stats.total_misses();

    tracing::info!(
        "Built {} contributions and {} expenditures from {} transactions",
        output.contributions.len(),
        output.expenditures.len(),
        transactions.len()
    );
    BuildReport {
        output,
        diagnostics,
        filings: filings.len(),
        filers: filers.len(),
        transactions: transactions.len(),
    }
}

/// Writes both CSVs into `output_dir`, returning their paths.
pub fn write_outputs(
    output_dir: &Path,
    output: &ReconcileOutput,
) -> Result<(PathBuf, PathBuf), OakFinanceError> {
    let contributions = output_dir.join(CONTRIBUTIONS_CSV);
    let expenditures = output_dir.join(EXPENDITURES_CSV);
    write_rows(&contributions, &output.contributions)?;
    write_rows(&expenditures, &output.expenditures)?;
    Ok((contributions, expenditures))
}
