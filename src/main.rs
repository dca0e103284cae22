//! Retention analytics CLI - main entry point
//!
//! Runs the A/B retention report, trains the churn model and answers
//! point predictions against it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use retention_analytics::analytics::{summarize, test_significance, Metric};
use retention_analytics::report::{self, ExperimentReport, OutputFormat, PredictionReport};
use retention_analytics::{AnalyticsSession, ChurnFeatures, Config, DatasetLoader, PlayerTable};

#[derive(Parser)]
#[command(name = "retention_analytics")]
#[command(about = "Cookie Cats A/B testing & churn prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.yml (defaults to ./config.yml, then ../config.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Player dataset CSV, overrides the config value
    #[arg(long, global = true, env = "RETENTION_DATASET")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retention by variant and chi-squared significance
    Report {
        /// Metric: retention_1 | retention_7
        #[arg(short, long, default_value = "retention_1")]
        metric: Metric,

        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Train the churn model and print held-out accuracy
    Train {
        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Train the churn model, then predict for one new player
    Predict {
        /// Total rounds played
        #[arg(short, long, default_value = "15", allow_hyphen_values = true)]
        rounds: i64,

        /// Whether the player came back on day 1
        #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
        retention_1: bool,

        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Re-export the loaded player table as CSV
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("retention_analytics=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::new(),
    };
    if let Some(dataset) = cli.dataset {
        config = config.with_dataset_path(dataset);
    }

    let loader = DatasetLoader::new(&config.dataset_path);
    let Some(table) = loader.load()? else {
        eprintln!("{}", report::missing_dataset_message(loader.path()));
        return Ok(());
    };

    execute_command(cli.command, &config, table)
}

fn execute_command(
    command: Commands,
    config: &Config,
    table: Arc<PlayerTable>,
) -> anyhow::Result<()> {
    match command {
        Commands::Report { metric, format } => {
            let retention = summarize(&table, metric);
            let significance = test_significance(&table, metric)?;
            let experiment = ExperimentReport::new(metric, retention, significance);

            match format {
                OutputFormat::Table => print!("{}", report::render_experiment(&experiment)),
                OutputFormat::Json => println!("{}", report::to_json(&experiment)?),
            }
        }
        Commands::Train { format } => {
            let mut session = AnalyticsSession::new();
            let training = session.train(&table, &config.arms, &config.training)?;

            match format {
                OutputFormat::Table => print!("{}", report::render_training(training)),
                OutputFormat::Json => println!("{}", report::to_json(training)?),
            }
        }
        Commands::Predict {
            rounds,
            retention_1,
            format,
        } => {
            info!("Training churn model on {} players", table.len());
            let mut session = AnalyticsSession::new();
            let training = session.train(&table, &config.arms, &config.training)?;
            if format == OutputFormat::Table {
                print!("{}", report::render_training(training));
            }

            let features = ChurnFeatures::for_new_player(rounds, retention_1);
            let Some(prediction) = session.predict(&features) else {
                anyhow::bail!("No trained model in session");
            };

            match format {
                OutputFormat::Table => print!("{}", report::render_prediction(&prediction)),
                OutputFormat::Json => println!(
                    "{}",
                    report::to_json(&PredictionReport {
                        features,
                        prediction,
                    })?
                ),
            }
        }
        Commands::Export { output } => {
            table.export(&output)?;
            println!("Exported {} players to {}", table.len(), output.display());
        }
    }

    Ok(())
}
