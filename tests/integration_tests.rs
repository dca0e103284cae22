//! Integration tests for retention_analytics library
//!
//! These tests verify the public API and module interactions.

mod scenarios;

use retention_analytics::{
    config::{ArmLabels, Config, TrainingConfig, DEFAULT_DATASET_PATH, DEFAULT_SEED},
    error::{Error, Result},
    Metric, PlayerRecord, PlayerTable,
};

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::defaults();
    assert_eq!(config.dataset_path.to_str(), Some(DEFAULT_DATASET_PATH));
    assert_eq!(config.training.seed, DEFAULT_SEED);
    assert_eq!(config.training, TrainingConfig::default());
}

#[test]
fn test_default_seed_is_42() {
    assert_eq!(DEFAULT_SEED, 42);
}

#[test]
fn test_arm_labels_version_code() {
    let arms = ArmLabels::new("control", "treatment");
    assert_eq!(arms.version_code("control").unwrap(), 0);
    assert_eq!(arms.version_code("treatment").unwrap(), 1);
    assert!(arms.version_code("gate_30").is_err());
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_error_variants_display() {
    let errors = vec![
        Error::Dataset("bad row".into()),
        Error::Statistics("zero expected".into()),
        Error::InsufficientData {
            required: 2,
            actual: 0,
        },
        Error::InvalidArgument("bad arg".into()),
        Error::Config("missing".into()),
        Error::SerializationError("json".into()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "Error message should not be empty");
    }
}

#[test]
fn test_result_type_alias() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }

    fn returns_err() -> Result<i32> {
        Err(Error::InvalidArgument("test".into()))
    }

    assert!(returns_ok().is_ok());
    assert!(returns_err().is_err());
}

// ============================================================================
// Metric / Table Tests
// ============================================================================

#[test]
fn test_metric_columns() {
    assert_eq!(Metric::Day1.column(), "retention_1");
    assert_eq!(Metric::Day7.column(), "retention_7");
}

#[test]
fn test_table_variants() {
    let table = PlayerTable::from_records(vec![
        PlayerRecord::new(1, "gate_40", 3, true, false),
        PlayerRecord::new(2, "gate_30", 9, false, false),
        PlayerRecord::new(3, "gate_40", 0, false, false),
    ]);
    let variants: Vec<&str> = table.variants().into_iter().collect();
    assert_eq!(variants, vec!["gate_30", "gate_40"]);
    assert_eq!(table.len(), 3);
    assert!(!table.is_empty());
}
