//! `download`: pull the raw collections and save them as snapshots.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use oakfinance_lib::netfile_api::{Client, Credentials};
use oakfinance_lib::pipeline::{download, ElementScope, CANDIDATE_MAPPING_CSV};
use oakfinance_lib::reference::load_candidate_mapping;
use oakfinance_lib::{PaginatedFetcher, RawCollections, RetryPolicy, Settings};

use crate::output::{fetch_summary_rows, print_rows, OutputFormat};

#[derive(Args, Clone)]
pub struct DownloadArgs {
    /// Directory for the raw JSON snapshots
    #[arg(long, default_value = "example")]
    pub data_dir: PathBuf,

    /// Pull filing elements per candidate filing instead of all at once
    #[arg(long)]
    pub by_filing: bool,

    /// Directory holding filer_to_candidate.csv (read with --by-filing)
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Records per page (1-1000); overrides the settings file
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Agency ID; overrides the settings file
    #[arg(long)]
    pub agency: Option<String>,
}

fn build_client(settings: &Settings, agency: &str) -> Result<Client> {
    let credentials =
        Credentials::from_env().context("NetFile credentials are required to download")?;
    let client = match std::env::var("NETFILE_BASE_URL") {
        Ok(base) if !base.is_empty() => Client::with_base_url(&base, credentials, agency)?,
        _ => Client::new(credentials, agency)?,
    };
    Ok(client.with_timeout(settings.timeout())?)
}

pub async fn run(
    args: &DownloadArgs,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<RawCollections> {
    let agency = args.agency.as_deref().unwrap_or(&settings.agency_id);
    let page_size = args.page_size.unwrap_or(settings.page_size);
    if !(1..=1000).contains(&page_size) {
        anyhow::bail!("--page-size must be between 1 and 1000, got {}", page_size);
    }

    let mapping = if args.by_filing {
        let path = args.input_dir.join(CANDIDATE_MAPPING_CSV);
        Some(load_candidate_mapping(&path)?)
    } else {
        None
    };
    let scope = match &mapping {
        Some(rows) => ElementScope::ByFiling(rows),
        None => ElementScope::All,
    };

    let fetcher = PaginatedFetcher::new(build_client(settings, agency)?)
        .with_policy(RetryPolicy::from_env())
        .with_page_size(page_size)
        .with_page_delay(settings.page_delay());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("pulling {} filers, filings and filing elements...", agency));

    let result = download(&fetcher, settings, scope).await;
    let raw = match result {
        Ok(raw) => raw,
        Err(e) => {
            pb.abandon_with_message("download failed");
            return Err(e.into());
        }
    };
    pb.finish_with_message(format!(
        "{} filers, {} filings, {} filing elements",
        raw.filers.len(),
        raw.filings.len(),
        raw.filing_elements.len()
    ));

    raw.save(&args.data_dir)?;
    print_rows(fetch_summary_rows(&fetcher.tracker().summary()), format)?;
    Ok(raw)
}
