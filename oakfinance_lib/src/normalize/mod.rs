//! Raw API records to flat, typed records.
//!
//! Nothing in here fails a run: records that cannot be normalized are
//! counted in [`Diagnostics`] and left out.

mod address;
mod diagnostics;
mod filer;
mod filing;
mod transaction;

pub use address::{canonical_city, location, normalize_address, NormalizedAddress, RegionRule};
pub use diagnostics::{Diagnostics, Unparseable, UnparseableRecord};
pub use filer::{normalize_filer, FilerKind, NormalizedFiler};
pub use filing::{normalize_filing, NormalizedFiling};
pub use transaction::{
    contributor_category, contributor_type, form_from_element_type, from_unitemized,
    normalize_transaction, NormalizedTransaction, TransactionKind, UNITEMIZED,
};

use netfile_api::types::{ElementClassification, FilingElement};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Normalizes a batch of filing elements, preserving input order.
///
/// Superseded elements are dropped first. `Transaction` elements go through
/// [`normalize_transaction`], `UnItemizedTransaction` through
/// [`from_unitemized`]; every other classification is counted and ignored.
pub fn normalize_elements(
    elements: &[FilingElement],
    region_rule: RegionRule,
    diagnostics: &mut Diagnostics,
) -> Vec<NormalizedTransaction> {
    let mut out = Vec::with_capacity(elements.len());
    let mut dropped = 0usize;
    for element in elements {
        if element.is_superseded() {
            diagnostics.superseded += 1;
            continue;
        }
        let result = match element.classification {
            ElementClassification::Transaction => normalize_transaction(element, region_rule),
            ElementClassification::UnItemizedTransaction => from_unitemized(element),
            _ => {
                diagnostics.ignored_classification += 1;
                continue;
            }
        };
        match result {
            Ok(tx) => out.push(tx),
            Err(reason) => {
                dropped += 1;
                diagnostics.record_unparseable(
                    Some(&element.element_nid),
                    Some(&element.filing_nid),
                    reason,
                );
            }
        }
    }
    if dropped > 0 {
        tracing::warn!("{} filing elements could not be normalized", dropped);
    }
    out
}

/// Decodes raw snapshot records, counting the ones that do not fit `T`.
pub fn decode_records<T: DeserializeOwned>(
    records: &[Value],
    diagnostics: &mut Diagnostics,
) -> Vec<T> {
    records
        .iter()
        .filter_map(|raw| match serde_json::from_value::<T>(raw.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                let id = ["elementNid", "filingNid", "filerNid"]
                    .iter()
                    .find_map(|key| raw.get(*key))
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                diagnostics.record_unparseable(
                    id.as_deref(),
                    raw.get("filingNid").and_then(Value::as_str),
                    Unparseable::Undecodable(e.to_string()),
                );
                None
            }
        })
        .collect()
}
