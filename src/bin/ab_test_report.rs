//! A/B test report CLI.
//!
//! Usage:
//!   cargo run --bin ab_test_report -- --dataset cookie_cats.csv --metric retention_7

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use retention_analytics::analytics::{summarize, test_significance, Metric};
use retention_analytics::report::{self, ExperimentReport};
use retention_analytics::{Config, DatasetLoader};

#[derive(Parser, Debug)]
#[command(name = "ab_test_report")]
#[command(about = "A/B retention report for the gate placement experiment")]
struct Args {
    /// Player dataset CSV
    #[arg(long, env = "RETENTION_DATASET")]
    dataset: Option<PathBuf>,

    /// Only report this metric (retention_1 | retention_7), default both
    #[arg(long)]
    metric: Option<Metric>,
}

fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("retention_analytics=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::new();
    let path = args.dataset.unwrap_or(config.dataset_path);
    let loader = DatasetLoader::new(path);

    let table = match loader.load()? {
        Some(table) => table,
        None => {
            eprintln!("{}", report::missing_dataset_message(loader.path()));
            return Ok(());
        }
    };

    let metrics = match args.metric {
        Some(metric) => vec![metric],
        None => Metric::ALL.to_vec(),
    };

    for metric in metrics {
        match test_significance(&table, metric) {
            Ok(significance) => {
                let experiment =
                    ExperimentReport::new(metric, summarize(&table, metric), significance);
                println!("{}", report::render_experiment(&experiment));
            }
            Err(e) => {
                eprintln!("Significance test for {} failed: {}", metric, e);
            }
        }
    }

    Ok(())
}
