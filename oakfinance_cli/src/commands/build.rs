//! `build`: snapshots + reference tables -> published CSVs.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use oakfinance_lib::dates::parse_date;
use oakfinance_lib::pipeline::{build, write_outputs, BuildReport};
use oakfinance_lib::{RawCollections, ReferenceTables, RegionRule, Settings};

use crate::output::{diagnostic_rows, print_rows, OutputFormat};

#[derive(Args, Clone)]
pub struct BuildArgs {
    /// Directory holding the raw JSON snapshots
    #[arg(long, default_value = "example")]
    pub data_dir: PathBuf,

    /// Directory holding the reference CSVs
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the CSVs are written to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Region rule: legacy or three-way; overrides the settings file
    #[arg(long)]
    pub region_rule: Option<String>,

    /// Reference date for the late-contribution cutoff (YYYY-MM-DD, default today)
    #[arg(long)]
    pub today: Option<String>,

    /// Leave unitemized aggregates out of the contributions
    #[arg(long)]
    pub no_unitemized: bool,
}

impl BuildArgs {
    /// Settings with this command's flags applied on top.
    fn effective_settings(&self, settings: &Settings) -> Result<Settings> {
        let mut settings = settings.clone();
        if let Some(rule) = &self.region_rule {
            settings.region_rule = rule.parse::<RegionRule>().map_err(anyhow::Error::msg)?;
        }
        if self.no_unitemized {
            settings.include_unitemized = false;
        }
        Ok(settings)
    }

    fn reference_date(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(raw) => match parse_date(raw) {
                Some(date) => Ok(date),
                None => bail!("--today must be a date like 2024-11-05, got '{}'", raw),
            },
            None => Ok(chrono::Local::now().date_naive()),
        }
    }
}

/// Builds from an in-memory pull, skipping the snapshot read.
pub fn run_with(
    args: &BuildArgs,
    raw: &RawCollections,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<BuildReport> {
    let settings = args.effective_settings(settings)?;
    let today = args.reference_date()?;
    let tables = ReferenceTables::load(&args.input_dir)?;

    let report = build(raw, &tables, &settings, today);
    let (contributions, expenditures) = write_outputs(&args.output_dir, &report.output)?;
    eprintln!(
        "Wrote {} contributions to {} and {} expenditures to {}",
        report.output.contributions.len(),
        contributions.display(),
        report.output.expenditures.len(),
        expenditures.display()
    );

    print_rows(diagnostic_rows(&report), format)?;
    if !report.diagnostics.is_clean() {
        tracing::warn!(
            "{} unparseable records, {} join misses",
            report.diagnostics.unparseable_count(),
            report.diagnostics.join_misses
        );
    }
    Ok(report)
}

pub fn run(args: &BuildArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let raw = RawCollections::load(&args.data_dir)?;
    run_with(args, &raw, settings, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> BuildArgs {
        BuildArgs {
            data_dir: "example".into(),
            input_dir: "input".into(),
            output_dir: "output".into(),
            region_rule: None,
            today: None,
            no_unitemized: false,
        }
    }

    #[test]
    fn flags_override_settings() {
        let mut a = args();
        a.region_rule = Some("three-way".into());
        a.no_unitemized = true;
        let settings = a.effective_settings(&Settings::default()).unwrap();
        assert_eq!(settings.region_rule, RegionRule::ThreeWay);
        assert!(!settings.include_unitemized);
    }

    #[test]
    fn bad_region_rule_is_rejected() {
        let mut a = args();
        a.region_rule = Some("nearby".into());
        assert!(a.effective_settings(&Settings::default()).is_err());
    }

    #[test]
    fn today_flag_parses() {
        let mut a = args();
        a.today = Some("2022-11-15".into());
        assert_eq!(
            a.reference_date().unwrap(),
            NaiveDate::from_ymd_opt(2022, 11, 15).unwrap()
        );
        a.today = Some("next tuesday".into());
        assert!(a.reference_date().is_err());
    }
}
