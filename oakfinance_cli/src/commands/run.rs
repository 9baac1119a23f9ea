//! `run`: download, then build from the fresh pull.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use oakfinance_lib::Settings;

use super::build::{self, BuildArgs};
use super::download::{self, DownloadArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RunArgs {
    /// Directory for the raw JSON snapshots
    #[arg(long, default_value = "example")]
    pub data_dir: PathBuf,

    /// Directory holding the reference CSVs
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the CSVs are written to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Pull filing elements per candidate filing instead of all at once
    #[arg(long)]
    pub by_filing: bool,

    /// Records per page (1-1000)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Agency ID
    #[arg(long)]
    pub agency: Option<String>,

    /// Region rule: legacy or three-way
    #[arg(long)]
    pub region_rule: Option<String>,

    /// Reference date for the late-contribution cutoff (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,

    /// Leave unitemized aggregates out of the contributions
    #[arg(long)]
    pub no_unitemized: bool,
}

impl RunArgs {
    fn download_args(&self) -> DownloadArgs {
        DownloadArgs {
            data_dir: self.data_dir.clone(),
            by_filing: self.by_filing,
            input_dir: self.input_dir.clone(),
            page_size: self.page_size,
            agency: self.agency.clone(),
        }
    }

    fn build_args(&self) -> BuildArgs {
        BuildArgs {
            data_dir: self.data_dir.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            region_rule: self.region_rule.clone(),
            today: self.today.clone(),
            no_unitemized: self.no_unitemized,
        }
    }
}

pub async fn run(args: &RunArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let raw = download::run(&args.download_args(), settings, format).await?;
    build::run_with(&args.build_args(), &raw, settings, format)?;
    Ok(())
}
