//! Session state for interactive analysis
//!
//! Provides:
//! - At most one trained churn model per session
//! - Explicit re-training that replaces the previous model
//! - Gated predictions: no model, no prediction

use tracing::info;

use crate::config::{ArmLabels, TrainingConfig};
use crate::dataset::PlayerTable;
use crate::error::Result;
use crate::model::{train, ChurnFeatures, ChurnModel, ChurnPrediction, TrainingReport};

/// Owned by the caller; dropped when the session ends. Nothing is persisted.
#[derive(Debug, Default)]
pub struct AnalyticsSession {
    model: Option<ChurnModel>,
    last_report: Option<TrainingReport>,
}

impl AnalyticsSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Train a fresh model and replace any previous one.
    ///
    /// On error the previously trained model is kept.
    pub fn train(
        &mut self,
        table: &PlayerTable,
        arms: &ArmLabels,
        config: &TrainingConfig,
    ) -> Result<&TrainingReport> {
        let trained = train(table, arms, config)?;
        if self.model.is_some() {
            info!("Replacing previously trained churn model");
        }
        self.model = Some(trained.model);
        Ok(self.last_report.insert(trained.report))
    }

    /// The trained model, if the train action has run in this session.
    pub fn model(&self) -> Option<&ChurnModel> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn last_report(&self) -> Option<&TrainingReport> {
        self.last_report.as_ref()
    }

    /// Predict with the session model; `None` until a model exists.
    pub fn predict(&self, features: &ChurnFeatures) -> Option<ChurnPrediction> {
        self.model.as_ref().map(|model| model.predict(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::PlayerRecord;

    fn table() -> PlayerTable {
        PlayerTable::from_records(
            (0..120u64)
                .map(|i| {
                    let rounds = (i % 40) as u32;
                    PlayerRecord::new(i, "gate_30", rounds, rounds > 5, rounds > 25)
                })
                .collect(),
        )
    }

    fn config() -> TrainingConfig {
        TrainingConfig::default().with_n_estimators(5)
    }

    #[test]
    fn test_new_session_has_no_model() {
        let session = AnalyticsSession::new();
        assert!(!session.has_model());
        assert!(session.model().is_none());
        assert!(session.last_report().is_none());
        assert!(session.predict(&ChurnFeatures::for_new_player(15, true)).is_none());
    }

    #[test]
    fn test_train_enables_predictions() {
        let mut session = AnalyticsSession::new();
        let report = session
            .train(&table(), &ArmLabels::default(), &config())
            .unwrap();
        assert_eq!(report.n_estimators, 5);

        assert!(session.has_model());
        let prediction = session
            .predict(&ChurnFeatures::for_new_player(15, true))
            .unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
    }

    #[test]
    fn test_retrain_replaces_model() {
        let mut session = AnalyticsSession::new();
        session
            .train(&table(), &ArmLabels::default(), &config())
            .unwrap();
        session
            .train(
                &table(),
                &ArmLabels::default(),
                &TrainingConfig::default().with_n_estimators(3),
            )
            .unwrap();

        assert_eq!(session.model().unwrap().n_estimators(), 3);
        assert_eq!(session.last_report().unwrap().n_estimators, 3);
    }

    #[test]
    fn test_failed_training_keeps_previous_model() {
        let mut session = AnalyticsSession::new();
        session
            .train(&table(), &ArmLabels::default(), &config())
            .unwrap();

        let result = session.train(&PlayerTable::default(), &ArmLabels::default(), &config());
        assert!(result.is_err());
        assert_eq!(session.model().unwrap().n_estimators(), 5);
    }
}
