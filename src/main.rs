//! Scenario Charts - static charts for energy-system model runs
//!
//! Reads model result CSVs of a base run, scenario runs and sensitivity runs
//! and writes capacity, generation, cost and emission charts, plus their
//! deltas against the base run, as PNG files.

mod charts;
mod cli;
mod config;
mod data;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use report::{ChartGroup, Reporter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Run {
            config,
            output_root,
        } => {
            let mut settings = Config::from_toml_file(&config)
                .with_context(|| format!("Failed to load configuration {}", config.display()))?;
            if let Some(root) = output_root {
                settings.output_root = root;
            }

            tracing::info!(
                config = %config.display(),
                base = %settings.base,
                scenarios = settings.scenarios.len(),
                sensitivities = settings.sensitivities.runs.len(),
                "starting report"
            );

            let reporter = Reporter::new(&settings);
            let summary = reporter.run().context("Report run failed")?;
            if summary.failed() > 0 {
                anyhow::bail!(
                    "{} chart(s) failed, see {}",
                    summary.failed(),
                    reporter.layout().summary_path().display()
                );
            }
        }
        Command::ListCharts => {
            for group in ChartGroup::ALL {
                for chart in group.charts() {
                    println!("{}.{chart}", group.key());
                }
            }
        }
    }

    Ok(())
}
