//! Tests for training and querying the churn model

use retention_analytics::config::{ArmLabels, TrainingConfig};
use retention_analytics::model::{predict, train, ChurnFeatures};
use retention_analytics::AnalyticsSession;

use super::two_arm_table;

fn arms() -> ArmLabels {
    ArmLabels::new("control", "treatment")
}

fn fast_config() -> TrainingConfig {
    TrainingConfig::default().with_n_estimators(8)
}

#[test]
fn test_train_then_predict_training_row() {
    let table = two_arm_table((400, 80), (400, 60));
    let trained = train(&table, &arms(), &fast_config()).unwrap();

    assert!((0.0..=1.0).contains(&trained.report.accuracy));

    let row = &table.records()[0];
    let features = ChurnFeatures::from_record(row, &arms()).unwrap();
    let prediction = predict(&trained.model, &features);
    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(prediction.label, prediction.outcome.label());
}

#[test]
fn test_predict_zero_rounds_control_arm() {
    let table = two_arm_table((300, 60), (300, 50));
    let trained = train(&table, &arms(), &fast_config()).unwrap();

    let prediction = predict(&trained.model, &ChurnFeatures::new(0, false, 0));
    assert!(prediction.label == 0 || prediction.label == 1);
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn test_session_gates_prediction() {
    let table = two_arm_table((200, 40), (200, 30));
    let mut session = AnalyticsSession::new();

    let features = ChurnFeatures::for_new_player(15, true);
    assert!(session.predict(&features).is_none());

    session.train(&table, &arms(), &fast_config()).unwrap();
    assert!(session.predict(&features).is_some());
}

#[test]
fn test_same_seed_same_accuracy() {
    let table = two_arm_table((250, 50), (250, 45));
    let a = train(&table, &arms(), &fast_config()).unwrap();
    let b = train(&table, &arms(), &fast_config()).unwrap();
    assert_eq!(a.report.accuracy, b.report.accuracy);
    assert_eq!(a.report.test_size, 100);
}
