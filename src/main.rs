use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use storefront_sync::cli::Cli;
use storefront_sync::models::config::{AppConfig, PipelineConfig};
use storefront_sync::services::PipelineResult;
use storefront_sync::services::pipeline::{RunReport, run};
use storefront_sync::services::sync::SyncOutcome;

fn execute(cli: &Cli) -> PipelineResult<RunReport> {
    let config = PipelineConfig::try_from(AppConfig::load(&cli.config)?)?;
    run(&config, cli.run_options())
}

fn print_report(report: &RunReport) {
    if let Some(fetch) = &report.fetch {
        for source in &fetch.sources {
            println!(
                "{}: appended {} products, {} variants",
                source.url, source.products, source.variants
            );
        }
    }
    for (name, outcome) in &report.sync {
        match outcome {
            SyncOutcome::Skipped { credentials } => {
                println!("{name}: credentials {credentials} not found, sync skipped");
            }
            SyncOutcome::Completed { tabs } => {
                for tab in tabs {
                    println!(
                        "{name}: wrote {} {} rows to '{}'",
                        tab.rows, tab.dataset, tab.worksheet.tab
                    );
                }
            }
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(report) => {
            print_report(&report);
            println!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Run failed: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
