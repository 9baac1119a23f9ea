use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;

/// A registered committee or candidate filer from `/filer/v101/filers`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Filer {
    #[serde(deserialize_with = "de::string_or_number")]
    pub filer_nid: String,

    /// Registration IDs keyed by registrar, e.g. `"CA SOS"`.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub registrations: BTreeMap<String, Value>,

    pub filer_name: Option<String>,
    pub candidate_name: Option<String>,

    #[serde(
        default,
        alias = "electionInfluence",
        deserialize_with = "de::one_or_many"
    )]
    pub election_influences: Vec<ElectionInfluence>,
}

impl Filer {
    /// The Secretary of State ID, if one has been issued.
    ///
    /// Newly registered committees show `"Pending"` until the state assigns
    /// an ID; that is treated the same as absent.
    pub fn sos_id(&self) -> Option<String> {
        let raw = match self.registrations.get("CA SOS")? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("pending") {
            None
        } else {
            Some(raw)
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElectionInfluence {
    pub election_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub candidate: Option<InfluenceCandidate>,
    pub seat: Option<Seat>,
    pub measure: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceCandidate {
    pub candidate_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub office_name: Option<String>,
}
