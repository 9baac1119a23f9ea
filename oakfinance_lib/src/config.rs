//! Pipeline settings, optionally read from `oakfinance.toml`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::normalize::RegionRule;
use crate::reference::ReferenceError;

/// Filing IDs whose elements the API cannot serve.
pub const DEFAULT_SKIP_LIST: &[&str] = &[
    "95096360-1f8d-4502-a70b-451dc6a9a0b3",
    "8deaa063-883b-4459-a32a-558653ca4fef",
    "04855230-5387-4cd9-9cfa-3e0c10fe5318",
];

/// Settings for a download/build run. Every field has a default, so an
/// absent or partial settings file is fine.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub agency_id: String,
    pub page_size: u64,
    /// Pause between consecutive requests, in milliseconds.
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub skip_list: Vec<String>,
    /// Transaction schedules published as contributions.
    pub contribution_forms: Vec<String>,
    /// Filing form of late contribution reports (after the `FPPC` prefix is removed).
    pub late_contribution_form: String,
    pub expenditure_form: String,
    pub region_rule: RegionRule,
    pub include_unitemized: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agency_id: "COAK".to_string(),
            page_size: netfile_api::DEFAULT_LIMIT,
            page_delay_ms: 500,
            timeout_secs: 7,
            skip_list: DEFAULT_SKIP_LIST.iter().map(|s| s.to_string()).collect(),
            contribution_forms: vec!["F460A".to_string(), "F460C".to_string()],
            late_contribution_form: "497".to_string(),
            expenditure_form: "F460E".to_string(),
            region_rule: RegionRule::Legacy,
            include_unitemized: true,
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ReferenceError> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| ReferenceError::Config(e.to_string()))?;
        if settings.page_size == 0 || settings.page_size > netfile_api::DEFAULT_LIMIT {
            return Err(ReferenceError::Config(format!(
                "page_size must be between 1 and {}, got {}",
                netfile_api::DEFAULT_LIMIT,
                settings.page_size
            )));
        }
        Ok(settings)
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ReferenceError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
