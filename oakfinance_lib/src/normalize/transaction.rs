//! Itemized and unitemized filing elements to [`NormalizedTransaction`].

use std::sync::OnceLock;

use chrono::NaiveDate;
use netfile_api::types::{FilingElement, RawTransactionPayload};
use regex::Regex;
use serde::Serialize;

use super::address::{location, normalize_address, RegionRule};
use super::diagnostics::Unparseable;
use crate::dates::parse_date;

/// Label used in every identity field of a synthesized unitemized record.
pub const UNITEMIZED: &str = "Unitemized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    Itemized,
    /// An aggregate below the itemization threshold; carries no payer identity.
    Unitemized,
}

/// The canonical flat transaction record.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    pub kind: TransactionKind,
    pub element_id: String,
    pub tran_id: String,
    pub filing_id: String,
    pub contributor_name: String,
    pub contributor_type: String,
    pub contributor_category: Option<String>,
    pub contributor_address: String,
    /// WKT `POINT (lon lat)`.
    pub contributor_location: Option<String>,
    pub contributor_region: String,
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub amount: f64,
    pub receipt_date: Option<NaiveDate>,
    pub expn_code: Option<String>,
    pub description: String,
    /// Schedule the line was reported on, e.g. `F460A` or `F460E`.
    pub form: Option<String>,
    pub party: Option<String>,
}

/// `Individual` for entity code `IND`, `Organization` for everything else.
pub fn contributor_type(entity_cd: Option<&str>) -> &'static str {
    if entity_cd == Some("IND") {
        "Individual"
    } else {
        "Organization"
    }
}

/// Human-readable label for a CAL entity code.
pub fn contributor_category(entity_cd: Option<&str>) -> Option<&'static str> {
    match entity_cd? {
        "RCP" => Some("Committee"),
        "IND" => Some("Individual"),
        "OTH" => Some("Business/Other"),
        "COM" => Some("Committee"),
        "PTY" => Some("Political Party"),
        "SCC" => Some("Small Contributor Committee"),
        _ => None,
    }
}

fn element_type_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(F\d{3}[A-Z]?)Line").ok())
        .as_ref()
}

/// Schedule encoded in an element type such as `F460ALine2`.
pub fn form_from_element_type(element_type: &str) -> Option<String> {
    element_type_pattern()?
        .captures(element_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `Ok(None)` for an absent or blank date, an error for one that does not parse.
fn checked_date(
    element: &FilingElement,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, Unparseable> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match parse_date(raw) {
        Some(date) => Ok(Some(date)),
        None => {
            tracing::warn!(
                "Element {} (filing {}) has unrecognized date {:?}",
                element.element_nid,
                element.filing_nid,
                raw
            );
            Err(Unparseable::InvalidDate(raw.to_string()))
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalizes an itemized element.
///
/// Accepts either payload generation. An element without a model, with a
/// malformed model, or with no amount is reported as unparseable.
pub fn normalize_transaction(
    element: &FilingElement,
    region_rule: RegionRule,
) -> Result<NormalizedTransaction, Unparseable> {
    let model = match &element.payload {
        RawTransactionPayload::Legacy(model) | RawTransactionPayload::Current(model) => model,
        RawTransactionPayload::Malformed(reason) => {
            return Err(Unparseable::Malformed(reason.clone()))
        }
        _ => return Err(Unparseable::MissingModel),
    };
    let amount = model.tran_amt1.ok_or(Unparseable::MissingAmount)?;
    let receipt_date = checked_date(element, model.tran_date.as_deref())?;

    let contributor_name = match non_empty(element.all_names.as_deref()) {
        Some(all_names) => all_names,
        None => format!(
            "{} {}",
            model.tran_nam_f.as_deref().unwrap_or(""),
            model.tran_nam_l.as_deref().unwrap_or("")
        )
        .trim()
        .to_string(),
    };

    let entity_cd = model.entity_cd.as_deref();
    let address = normalize_address(model, &element.addresses);
    let region = region_rule.region(address.city.as_deref(), address.state.as_deref());
    let form = non_empty(model.cal_transaction_type.as_deref())
        .or_else(|| element.element_type.as_deref().and_then(form_from_element_type))
        .or_else(|| non_empty(element.specification_ref.name.as_deref()));

    Ok(NormalizedTransaction {
        kind: TransactionKind::Itemized,
        element_id: element.element_nid.clone(),
        tran_id: model.tran_id.clone().unwrap_or_default(),
        filing_id: element.filing_nid.clone(),
        contributor_name,
        contributor_type: contributor_type(entity_cd).to_string(),
        contributor_category: contributor_category(entity_cd).map(str::to_string),
        contributor_address: address.display(),
        contributor_location: location(&element.addresses),
        contributor_region: region.to_string(),
        street: address.street,
        city: address.city,
        state: address.state,
        zip_code: address.zip_code,
        amount,
        receipt_date,
        expn_code: non_empty(model.tran_code.as_deref()),
        description: model.tran_dscr.clone().unwrap_or_default(),
        form,
        party: None,
    })
}

/// Synthesizes a transaction from an `UnItemizedTransaction` aggregate.
///
/// Identity fields are blank and the category, type and region are all
/// `Unitemized`. A missing amount or date makes the element unparseable.
pub fn from_unitemized(element: &FilingElement) -> Result<NormalizedTransaction, Unparseable> {
    let model = match &element.payload {
        RawTransactionPayload::Unitemized(model) => model,
        RawTransactionPayload::Malformed(reason) => {
            return Err(Unparseable::Malformed(reason.clone()))
        }
        _ => return Err(Unparseable::MissingModel),
    };
    let amount = model.amount.ok_or(Unparseable::MissingAmount)?;
    let receipt_date =
        checked_date(element, model.calculated_date.as_deref())?.ok_or(Unparseable::MissingDate)?;
    let form = element
        .element_type
        .as_deref()
        .and_then(form_from_element_type)
        .or_else(|| non_empty(element.specification_ref.name.as_deref()));

    Ok(NormalizedTransaction {
        kind: TransactionKind::Unitemized,
        element_id: element.element_nid.clone(),
        tran_id: UNITEMIZED.to_string(),
        filing_id: element.filing_nid.clone(),
        contributor_name: String::new(),
        contributor_type: UNITEMIZED.to_string(),
        contributor_category: Some(UNITEMIZED.to_string()),
        contributor_address: String::new(),
        contributor_location: None,
        contributor_region: UNITEMIZED.to_string(),
        street: String::new(),
        city: None,
        state: None,
        zip_code: None,
        amount,
        receipt_date: Some(receipt_date),
        expn_code: None,
        description: String::new(),
        form,
        party: None,
    })
}
