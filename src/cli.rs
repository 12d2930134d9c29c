use std::path::PathBuf;

use clap::Parser;

use crate::models::config::DEFAULT_CONFIG_PATH;
use crate::services::pipeline::RunOptions;

/// Append storefront catalog feeds to CSV and mirror them into spreadsheets.
#[derive(Debug, Parser)]
#[command(name = "storefront-sync", version)]
pub struct Cli {
    /// YAML configuration file; `STOREFRONT__*` variables override it.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Only fetch and append, skip spreadsheet synchronization.
    #[arg(long, conflicts_with = "sync_only")]
    pub fetch_only: bool,
    /// Only synchronize the existing CSV files.
    #[arg(long)]
    pub sync_only: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            fetch: !self.sync_only,
            sync: !self.fetch_only,
        }
    }
}
