//! Day-7 churn classifier: training and point predictions.
//!
//! Features are `[sum_gamerounds, retention_1, version_code]` and the label
//! is `retention_7`. Training holds out a seeded test partition and reports
//! accuracy on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::info;

use super::forest::{ForestParams, RandomForest};
use super::split::train_test_split;
use crate::config::{ArmLabels, TrainingConfig};
use crate::dataset::{PlayerRecord, PlayerTable};
use crate::{Error, Result};

pub const FEATURE_NAMES: [&str; 3] = ["sum_gamerounds", "retention_1", "version_code"];

/// Input row for the classifier.
///
/// `sum_gamerounds` is signed so out-of-range inputs reach the model as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnFeatures {
    pub sum_gamerounds: i64,
    pub retention_1: bool,
    pub version_code: u8,
}

impl ChurnFeatures {
    pub fn new(sum_gamerounds: i64, retention_1: bool, version_code: u8) -> Self {
        Self {
            sum_gamerounds,
            retention_1,
            version_code,
        }
    }

    /// Features for an ad hoc player, evaluated against the control arm.
    pub fn for_new_player(sum_gamerounds: i64, retention_1: bool) -> Self {
        Self::new(sum_gamerounds, retention_1, 0)
    }

    /// Fails when the record's `version` is not one of the two configured arms.
    pub fn from_record(record: &PlayerRecord, arms: &ArmLabels) -> Result<Self> {
        Ok(Self::new(
            i64::from(record.sum_gamerounds),
            record.retention_1,
            arms.version_code(&record.version)?,
        ))
    }

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.sum_gamerounds as f64,
            if self.retention_1 { 1.0 } else { 0.0 },
            f64::from(self.version_code),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnOutcome {
    /// Label 0: does not return on day 7.
    Churns,
    /// Label 1: returns on day 7.
    Stays,
}

impl ChurnOutcome {
    pub fn label(self) -> u8 {
        match self {
            ChurnOutcome::Churns => 0,
            ChurnOutcome::Stays => 1,
        }
    }
}

impl fmt::Display for ChurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnOutcome::Churns => f.write_str("churns"),
            ChurnOutcome::Stays => f.write_str("stays"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChurnPrediction {
    pub outcome: ChurnOutcome,
    pub label: u8,
    /// Estimated probability of `Stays`.
    pub probability: f64,
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub n_estimators: usize,
    pub seed: u64,
    pub elapsed_ms: u128,
}

/// A fitted churn classifier. Lives in memory only.
#[derive(Debug, Clone)]
pub struct ChurnModel {
    forest: RandomForest,
}

impl ChurnModel {
    pub fn predict(&self, features: &ChurnFeatures) -> ChurnPrediction {
        let probability = self.forest.predict_proba(&features.to_vector());
        let outcome = if probability > 0.5 {
            ChurnOutcome::Stays
        } else {
            ChurnOutcome::Churns
        };
        ChurnPrediction {
            outcome,
            label: outcome.label(),
            probability,
        }
    }

    pub fn predict_batch(&self, rows: &[ChurnFeatures]) -> Vec<ChurnPrediction> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    pub fn n_estimators(&self) -> usize {
        self.forest.trees().len()
    }
}

/// A freshly trained model with its held-out evaluation.
#[derive(Debug, Clone)]
pub struct TrainedChurnModel {
    pub model: ChurnModel,
    pub report: TrainingReport,
}

/// Fit the churn classifier on a seeded split of `table`.
pub fn train(
    table: &PlayerTable,
    arms: &ArmLabels,
    config: &TrainingConfig,
) -> Result<TrainedChurnModel> {
    config.validate()?;
    if table.len() < 2 {
        return Err(Error::InsufficientData {
            required: 2,
            actual: table.len(),
        });
    }

    let start = Instant::now();
    let rows: Vec<Vec<f64>> = table
        .records()
        .iter()
        .map(|r| ChurnFeatures::from_record(r, arms).map(|f| f.to_vector()))
        .collect::<Result<_>>()?;
    let labels: Vec<bool> = table.records().iter().map(|r| r.retention_7).collect();

    let split = train_test_split(rows.len(), config.test_size, config.seed)?;
    let train_x: Vec<Vec<f64>> = split.train.iter().map(|&i| rows[i].clone()).collect();
    let train_y: Vec<bool> = split.train.iter().map(|&i| labels[i]).collect();

    info!(
        rows = table.len(),
        train = split.train.len(),
        test = split.test.len(),
        n_estimators = config.n_estimators,
        seed = config.seed,
        "Training churn model"
    );

    let forest = RandomForest::fit(
        &train_x,
        &train_y,
        &ForestParams::new(config.n_estimators, config.seed),
    )?;

    let correct = split
        .test
        .iter()
        .filter(|&&i| forest.predict(&rows[i]) == labels[i])
        .count();
    let accuracy = correct as f64 / split.test.len() as f64;

    let elapsed_ms = start.elapsed().as_millis();
    info!(accuracy, elapsed_ms, "Churn model trained");

    Ok(TrainedChurnModel {
        model: ChurnModel { forest },
        report: TrainingReport {
            accuracy,
            train_size: split.train.len(),
            test_size: split.test.len(),
            n_estimators: config.n_estimators,
            seed: config.seed,
            elapsed_ms,
        },
    })
}

/// Point prediction against a fitted model.
pub fn predict(model: &ChurnModel, features: &ChurnFeatures) -> ChurnPrediction {
    model.predict(features)
}
