use serde::{Deserialize, Serialize};

use super::de;

/// A campaign-finance filing as returned by `/filing/v101/filings`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    #[serde(deserialize_with = "de::string_or_number")]
    pub filing_nid: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub filer_meta: FilerMeta,

    pub calculated_date: Option<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub specification_ref: SpecificationRef,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub filing_meta: FilingMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilerMeta {
    /// The filer's internal NetFile ID (`filerNid` elsewhere in the API).
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub filer_id: Option<String>,
    pub common_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilingMeta {
    pub legal_filing_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Names the form a filing or element was reported on (`FPPC460`, `F460A`, ...).
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SpecificationRef {
    pub name: Option<String>,
}
