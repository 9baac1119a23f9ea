//! Filing elements: the line items of a filing.
//!
//! The nested transaction detail lives under `transaction` on the older
//! transaction-elements route and under `elementModel` on filing-elements.
//! Which one applies is decided here, once, while deserializing; downstream
//! code only ever sees a [`RawTransactionPayload`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use super::filing::SpecificationRef;

/// How NetFile classifies a filing element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementClassification {
    Transaction,
    UnItemizedTransaction,
    Summary,
    Other(String),
}

impl ElementClassification {
    fn parse(raw: &str) -> Self {
        match raw {
            "Transaction" => Self::Transaction,
            "UnItemizedTransaction" => Self::UnItemizedTransaction,
            "Summary" => Self::Summary,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Itemized transaction detail (CAL format field names).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionModel {
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub tran_id: Option<String>,
    pub tran_nam_f: Option<String>,
    pub tran_nam_l: Option<String>,
    pub entity_cd: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub tran_amt1: Option<f64>,
    pub tran_date: Option<String>,
    pub tran_code: Option<String>,
    pub tran_dscr: Option<String>,
    pub cal_transaction_type: Option<String>,
    pub tran_adr1: Option<String>,
    pub tran_adr2: Option<String>,
    pub tran_city: Option<String>,
    #[serde(rename = "tranST")]
    pub tran_st: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub tran_zip4: Option<String>,
}

/// Aggregate detail of an `UnItemizedTransaction` element.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitemizedModel {
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub amount: Option<f64>,
    pub calculated_date: Option<String>,
}

/// The element's nested detail, tagged by where it was found.
#[derive(Clone, Debug, PartialEq)]
pub enum RawTransactionPayload {
    /// Found under `transaction` (transaction-elements route).
    Legacy(TransactionModel),
    /// Found under `elementModel` (filing-elements route).
    Current(TransactionModel),
    Unitemized(UnitemizedModel),
    Summary,
    /// Neither key present for an element that needs one.
    Missing,
    /// A key was present but its shape did not match.
    Malformed(String),
}

impl RawTransactionPayload {
    /// The itemized model, whichever generation it came from.
    pub fn transaction_model(&self) -> Option<&TransactionModel> {
        match self {
            Self::Legacy(model) | Self::Current(model) => Some(model),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub longitude: Option<f64>,
}

/// One line item inside a filing.
#[derive(Deserialize, Clone, Debug)]
#[serde(from = "FilingElementWire")]
pub struct FilingElement {
    pub element_nid: String,
    pub filing_nid: String,
    pub filer_nid: Option<String>,
    pub classification: ElementClassification,
    pub element_activity_type: Option<String>,
    pub element_type: Option<String>,
    pub specification_ref: SpecificationRef,
    pub all_names: Option<String>,
    pub addresses: Vec<Address>,
    pub payload: RawTransactionPayload,
}

impl FilingElement {
    /// Superseded elements were amended out by a later filing.
    pub fn is_superseded(&self) -> bool {
        self.element_activity_type.as_deref() == Some("Superseded")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingElementWire {
    #[serde(deserialize_with = "de::string_or_number")]
    element_nid: String,
    #[serde(deserialize_with = "de::string_or_number")]
    filing_nid: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    filer_nid: Option<String>,
    element_classification: Option<String>,
    element_activity_type: Option<String>,
    element_type: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    specification_ref: SpecificationRef,
    all_names: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    addresses: Vec<Address>,
    transaction: Option<Value>,
    element_model: Option<Value>,
}

impl From<FilingElementWire> for FilingElement {
    fn from(wire: FilingElementWire) -> Self {
        // transaction-elements records carry no classification but are always itemized
        let classification = match (&wire.element_classification, &wire.transaction) {
            (Some(raw), _) => ElementClassification::parse(raw),
            (None, Some(_)) => ElementClassification::Transaction,
            (None, None) => ElementClassification::Other(String::new()),
        };
        let payload = resolve_payload(&classification, wire.transaction, wire.element_model);
        FilingElement {
            element_nid: wire.element_nid,
            filing_nid: wire.filing_nid,
            filer_nid: wire.filer_nid,
            classification,
            element_activity_type: wire.element_activity_type,
            element_type: wire.element_type,
            specification_ref: wire.specification_ref,
            all_names: wire.all_names,
            addresses: wire.addresses,
            payload,
        }
    }
}

fn resolve_payload(
    classification: &ElementClassification,
    transaction: Option<Value>,
    element_model: Option<Value>,
) -> RawTransactionPayload {
    match classification {
        ElementClassification::Summary => RawTransactionPayload::Summary,
        ElementClassification::UnItemizedTransaction => match element_model {
            Some(model) => match serde_json::from_value::<UnitemizedModel>(model) {
                Ok(model) => RawTransactionPayload::Unitemized(model),
                Err(e) => RawTransactionPayload::Malformed(e.to_string()),
            },
            None => RawTransactionPayload::Missing,
        },
        ElementClassification::Transaction | ElementClassification::Other(_) => {
            match (transaction, element_model) {
                (Some(model), _) => parse_model(model, RawTransactionPayload::Legacy),
                (None, Some(model)) => parse_model(model, RawTransactionPayload::Current),
                (None, None) => RawTransactionPayload::Missing,
            }
        }
    }
}

fn parse_model(
    value: Value,
    wrap: fn(TransactionModel) -> RawTransactionPayload,
) -> RawTransactionPayload {
    match serde_json::from_value::<TransactionModel>(value) {
        Ok(model) => wrap(model),
        Err(e) => RawTransactionPayload::Malformed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_model_resolves_to_current() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": "e1",
            "filingNid": "f1",
            "elementClassification": "Transaction",
            "elementActivityType": "Add",
            "elementModel": {"tranId": "INC1", "tranAmt1": 100.0, "entityCd": "IND"}
        }))
        .unwrap();
        match element.payload {
            RawTransactionPayload::Current(model) => {
                assert_eq!(model.tran_id.as_deref(), Some("INC1"));
                assert_eq!(model.tran_amt1, Some(100.0));
            }
            other => panic!("expected Current, got {:?}", other),
        }
    }

    #[test]
    fn transaction_key_wins_and_implies_classification() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": 7,
            "filingNid": "f1",
            "transaction": {"tranId": 55, "tranAmt1": "12.50", "tranST": "CA", "tranZip4": 94612}
        }))
        .unwrap();
        assert_eq!(element.element_nid, "7");
        assert_eq!(element.classification, ElementClassification::Transaction);
        let model = element.payload.transaction_model().unwrap();
        assert_eq!(model.tran_id.as_deref(), Some("55"));
        assert_eq!(model.tran_amt1, Some(12.5));
        assert_eq!(model.tran_st.as_deref(), Some("CA"));
        assert_eq!(model.tran_zip4.as_deref(), Some("94612"));
        assert!(matches!(element.payload, RawTransactionPayload::Legacy(_)));
    }

    #[test]
    fn unitemized_without_model_is_missing() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": "e2",
            "filingNid": "f1",
            "elementClassification": "UnItemizedTransaction",
            "elementModel": null
        }))
        .unwrap();
        assert_eq!(element.payload, RawTransactionPayload::Missing);
    }

    #[test]
    fn unitemized_model_keeps_absent_amount_as_none() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": "e3",
            "filingNid": "f1",
            "elementClassification": "UnItemizedTransaction",
            "elementModel": {"calculatedDate": "2022-06-30"}
        }))
        .unwrap();
        match element.payload {
            RawTransactionPayload::Unitemized(model) => {
                assert_eq!(model.amount, None);
                assert_eq!(model.calculated_date.as_deref(), Some("2022-06-30"));
            }
            other => panic!("expected Unitemized, got {:?}", other),
        }
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": "e4",
            "filingNid": "f1",
            "elementClassification": "Transaction",
            "elementModel": [1, 2, 3]
        }))
        .unwrap();
        assert!(matches!(element.payload, RawTransactionPayload::Malformed(_)));
    }

    #[test]
    fn superseded_flag() {
        let element: FilingElement = serde_json::from_value(json!({
            "elementNid": "e5",
            "filingNid": "f1",
            "elementClassification": "Summary",
            "elementActivityType": "Superseded"
        }))
        .unwrap();
        assert!(element.is_superseded());
        assert_eq!(element.payload, RawTransactionPayload::Summary);
    }
}
