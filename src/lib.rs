//! Cookie Cats Retention Analytics Library
//!
//! This library provides tools to:
//! - Load the Cookie Cats player table from CSV (and re-export it)
//! - Compare day-1 / day-7 retention between the two gate-placement arms
//! - Test the difference for significance with a chi-squared test
//! - Train a random-forest churn classifier on demand and query it
//! - Keep the trained model in an explicit, caller-owned session

pub mod analytics;
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod report;
pub mod session;

// Re-export common types
pub use analytics::{aggregate, test_significance, Metric, SignificanceReport, Verdict};
pub use config::{ArmLabels, Config, TrainingConfig};
pub use dataset::{DatasetLoader, PlayerRecord, PlayerTable};
pub use error::{Error, Result};
pub use model::{predict, train, ChurnFeatures, ChurnModel, ChurnPrediction, TrainingReport};
pub use session::AnalyticsSession;
