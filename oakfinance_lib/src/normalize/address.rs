//! Street address, city canonicalization, geocoordinates and region.

use netfile_api::types::{Address, TransactionModel};
use serde::{Deserialize, Serialize};

/// Misspellings of the home city seen in filed addresses.
const OAKLAND_MISSPELLINGS: &[&str] = &[
    "OAKLAND", "OakLand", "Oaklalnd", "Oaklannd", "Okaland", "oakland",
];

pub const HOME_CITY: &str = "Oakland";
pub const HOME_STATE: &str = "CA";

/// How `contributor_region` is assigned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RegionRule {
    /// Every record is `Out of State`. Matches previously published datasets.
    #[default]
    Legacy,
    /// `In Oakland`, then `Other CA City`, then `Out of State`.
    ThreeWay,
}

impl std::str::FromStr for RegionRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "three-way" => Ok(Self::ThreeWay),
            other => Err(format!(
                "unknown region rule '{}' (expected legacy or three-way)",
                other
            )),
        }
    }
}

impl RegionRule {
    pub fn region(&self, city: Option<&str>, state: Option<&str>) -> &'static str {
        match self {
            RegionRule::Legacy => "Out of State",
            RegionRule::ThreeWay => {
                if city == Some(HOME_CITY) {
                    "In Oakland"
                } else if state == Some(HOME_STATE) {
                    "Other CA City"
                } else {
                    "Out of State"
                }
            }
        }
    }
}

/// Maps known misspellings of Oakland to the canonical spelling.
pub fn canonical_city(city: &str) -> String {
    if OAKLAND_MISSPELLINGS.contains(&city) {
        HOME_CITY.to_string()
    } else {
        city.to_string()
    }
}

/// Address fields after cleanup, ready for output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedAddress {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl NormalizedAddress {
    /// `"<street>, <city state zip>"`, or empty unless both halves are present.
    pub fn display(&self) -> String {
        let city_state_zip = [&self.city, &self.state, &self.zip_code]
            .iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if self.street.is_empty() || city_state_zip.is_empty() {
            String::new()
        } else {
            format!("{}, {}", self.street, city_state_zip)
        }
    }

    fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn join_street(line1: Option<&str>, line2: Option<&str>) -> String {
    format!("{} {}", line1.unwrap_or(""), line2.unwrap_or(""))
        .trim()
        .to_string()
}

fn from_parts(
    line1: Option<&str>,
    line2: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
) -> NormalizedAddress {
    NormalizedAddress {
        street: join_street(line1, line2),
        city: clean(city).map(|c| canonical_city(&c)),
        state: clean(state),
        zip_code: clean(zip),
    }
}

/// Address from the transaction model, falling back to the element's first
/// structured address when the model has none.
pub fn normalize_address(model: &TransactionModel, addresses: &[Address]) -> NormalizedAddress {
    let from_model = from_parts(
        model.tran_adr1.as_deref(),
        model.tran_adr2.as_deref(),
        model.tran_city.as_deref(),
        model.tran_st.as_deref(),
        model.tran_zip4.as_deref(),
    );
    if !from_model.is_empty() {
        return from_model;
    }
    match addresses.first() {
        Some(addr) => from_parts(
            addr.line1.as_deref(),
            addr.line2.as_deref(),
            addr.city.as_deref(),
            addr.state.as_deref(),
            addr.zip.as_deref(),
        ),
        None => from_model,
    }
}

/// WKT point from the first address's coordinates, if both are present.
pub fn location(addresses: &[Address]) -> Option<String> {
    let addr = addresses.first()?;
    match (addr.latitude, addr.longitude) {
        (Some(lat), Some(lon)) => Some(format!("POINT ({} {})", lon, lat)),
        _ => None,
    }
}
