mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use oakfinance_lib::Settings;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "oakfinance")]
#[command(about = "Build Oakland campaign-finance datasets from NetFile filings")]
struct Cli {
    /// Pipeline settings file (TOML); defaults apply when it does not exist
    #[arg(long, default_value = "oakfinance.toml", global = true)]
    config: PathBuf,

    /// Output format: table, markdown, csv or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull filers, filings and filing elements into JSON snapshots
    Download(commands::download::DownloadArgs),
    /// Build the contribution and expenditure CSVs from snapshots
    Build(commands::build::BuildArgs),
    /// Download, then build
    Run(commands::run::RunArgs),
    /// Summarize the published CSVs per candidate
    Totals(commands::totals::TotalsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oakfinance=info".parse()?),
        )
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);
    let settings = Settings::load(&cli.config)?;

    match &cli.command {
        Commands::Download(args) => {
            commands::download::run(args, &settings, &format).await?;
        }
        Commands::Build(args) => commands::build::run(args, &settings, &format)?,
        Commands::Run(args) => commands::run::run(args, &settings, &format).await?,
        Commands::Totals(args) => commands::totals::run(args, &format)?,
    }

    Ok(())
}
