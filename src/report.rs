//! Text and JSON rendering of analysis results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

use crate::analytics::{Metric, SignificanceReport, VariantRetention};
use crate::model::{ChurnFeatures, ChurnOutcome, ChurnPrediction, TrainingReport};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::InvalidArgument(format!(
                "Unknown output format: {} (expected table | json)",
                other
            ))),
        }
    }
}

/// A/B section of the dashboard for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub generated_at: DateTime<Utc>,
    pub metric: Metric,
    pub retention: Vec<VariantRetention>,
    pub significance: SignificanceReport,
}

impl ExperimentReport {
    pub fn new(
        metric: Metric,
        retention: Vec<VariantRetention>,
        significance: SignificanceReport,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            metric,
            retention,
            significance,
        }
    }
}

/// Churn prediction together with the input it was made for.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub features: ChurnFeatures,
    pub prediction: ChurnPrediction,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Message shown when the dataset file does not exist.
pub fn missing_dataset_message(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("File '{}' is missing.", name)
}

pub fn render_retention(retention: &[VariantRetention], metric: Metric) -> String {
    let header = format!("📊 Average {} (%)", metric);
    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.chars().count()));
    out.push('\n');

    if retention.is_empty() {
        out.push_str("No players in the dataset.\n");
        return out;
    }

    out.push_str(&format!(
        "{:22} {:>8} {:>9} {:>7}\n",
        "Variant", "Players", "Retained", "Rate %"
    ));
    for v in retention {
        out.push_str(&format!(
            "{:22} {:>8} {:>9} {:>7.2}\n",
            v.variant.chars().take(22).collect::<String>(),
            v.players,
            v.retained,
            v.rate
        ));
    }
    out
}

pub fn render_significance(report: &SignificanceReport) -> String {
    let verdict = if report.verdict.is_significant() {
        format!(
            "✅ The result is **{}** (p-value: {:.5}). The difference is statistically established.",
            report.verdict, report.p_value
        )
    } else {
        format!(
            "⚠️  The result is **{}** (p-value: {:.5}).",
            report.verdict, report.p_value
        )
    };
    format!(
        "χ² = {:.4}, dof = {}\n{}\n",
        report.statistic, report.dof, verdict
    )
}

pub fn render_experiment(report: &ExperimentReport) -> String {
    format!(
        "{}\n{}",
        render_retention(&report.retention, report.metric),
        render_significance(&report.significance)
    )
}

pub fn render_training(report: &TrainingReport) -> String {
    format!(
        "🎉 Model trained! Accuracy: **{:.1}%** ({} trees, {} train / {} test rows, seed {}, {} ms)\n",
        report.accuracy * 100.0,
        report.n_estimators,
        report.train_size,
        report.test_size,
        report.seed,
        report.elapsed_ms
    )
}

pub fn render_prediction(prediction: &ChurnPrediction) -> String {
    let percent = prediction.probability * 100.0;
    match prediction.outcome {
        ChurnOutcome::Stays => {
            format!("✅ The player will stay! (probability: {:.0}%)\n", percent)
        }
        ChurnOutcome::Churns => format!(
            "❌ Warning: churn risk! The player will probably quit. (probability of staying: {:.0}%)\n",
            percent
        ),
    }
}
