//! `totals`: per-candidate sums over the published CSVs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use oakfinance_lib::export::{read_rows, CONTRIBUTIONS_CSV, EXPENDITURES_CSV};
use oakfinance_lib::summary::{contribution_totals, expenditure_totals};
use oakfinance_lib::{ContributionRow, ExpenditureRow};

use crate::output::{print_rows, total_rows, OutputFormat};

#[derive(Args)]
pub struct TotalsArgs {
    /// Directory holding contribs_socrata.csv and expends_socrata.csv
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
}

pub fn run(args: &TotalsArgs, format: &OutputFormat) -> Result<()> {
    let contribs_path = args.output_dir.join(CONTRIBUTIONS_CSV);
    let contributions: Vec<ContributionRow> = read_rows(&contribs_path)
        .with_context(|| format!("reading {}", contribs_path.display()))?;

    let expends_path = args.output_dir.join(EXPENDITURES_CSV);
    let expenditures: Vec<ExpenditureRow> = if expends_path.exists() {
        read_rows(&expends_path).with_context(|| format!("reading {}", expends_path.display()))?
    } else {
        Vec::new()
    };

    let mut rows = total_rows("Contributions", &contribution_totals(&contributions));
    rows.extend(total_rows("Expenditures", &expenditure_totals(&expenditures)));
    print_rows(rows, format)
}
