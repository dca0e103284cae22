//! Configuration for the dataset source, experiment arms and model training
//!
//! Loads configuration from config.yml file

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const DEFAULT_DATASET_PATH: &str = "cookie_cats.csv";
pub const DEFAULT_CONTROL_ARM: &str = "gate_30";
pub const DEFAULT_TREATMENT_ARM: &str = "gate_40";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_N_ESTIMATORS: usize = 50;

/// YAML config structures
#[derive(Debug, Deserialize)]
struct YamlConfig {
    dataset: Option<DatasetSection>,
    arms: Option<ArmsSection>,
    training: Option<TrainingSection>,
}

#[derive(Debug, Deserialize)]
struct DatasetSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArmsSection {
    control: Option<String>,
    treatment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrainingSection {
    seed: Option<u64>,
    test_size: Option<f64>,
    n_estimators: Option<usize>,
}

/// Raw `version` labels of the two experiment arms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmLabels {
    pub control: String,
    pub treatment: String,
}

impl Default for ArmLabels {
    fn default() -> Self {
        Self {
            control: DEFAULT_CONTROL_ARM.to_string(),
            treatment: DEFAULT_TREATMENT_ARM.to_string(),
        }
    }
}

impl ArmLabels {
    pub fn new(control: impl Into<String>, treatment: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            treatment: treatment.into(),
        }
    }

    /// 0 for the control arm, 1 for the treatment arm.
    pub fn version_code(&self, version: &str) -> Result<u8> {
        if version == self.control {
            Ok(0)
        } else if version == self.treatment {
            Ok(1)
        } else {
            Err(Error::Dataset(format!(
                "version {:?} is neither the control arm {:?} nor the treatment arm {:?}",
                version, self.control, self.treatment
            )))
        }
    }
}

/// Parameters for the churn model fit.
///
/// `seed` drives both the train/test shuffle and the forest, so two runs with
/// the same seed over the same table produce the same model and accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    pub test_size: f64,
    pub n_estimators: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            n_estimators: DEFAULT_N_ESTIMATORS,
        }
    }
}

impl TrainingConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.n_estimators == 0 {
            return Err(Error::InvalidArgument(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: PathBuf,
    pub arms: ArmLabels,
    pub training: TrainingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::defaults().with_env_overrides())
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return Some(env_val);
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return Some(env_val);
        }
        value
    }

    /// Resolve a u64 from env var, falling back to the config value
    fn resolve_env_u64(value: Option<u64>, env_key: &str) -> Option<u64> {
        std::env::var(env_key)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .or(value)
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text, then apply env overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: YamlConfig = serde_yaml::from_str(content)?;

        let dataset = yaml.dataset.unwrap_or(DatasetSection { path: None });
        let arms = yaml.arms.unwrap_or(ArmsSection {
            control: None,
            treatment: None,
        });
        let training = yaml.training.unwrap_or(TrainingSection {
            seed: None,
            test_size: None,
            n_estimators: None,
        });

        let dataset_path = Self::resolve_env_string(dataset.path, "RETENTION_DATASET")
            .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string());
        let control = Self::resolve_env_string(arms.control, "RETENTION_CONTROL_ARM")
            .unwrap_or_else(|| DEFAULT_CONTROL_ARM.to_string());
        let treatment = Self::resolve_env_string(arms.treatment, "RETENTION_TREATMENT_ARM")
            .unwrap_or_else(|| DEFAULT_TREATMENT_ARM.to_string());
        let seed = Self::resolve_env_u64(training.seed, "RETENTION_SEED").unwrap_or(DEFAULT_SEED);

        let training = TrainingConfig {
            seed,
            test_size: training.test_size.unwrap_or(DEFAULT_TEST_SIZE),
            n_estimators: training.n_estimators.unwrap_or(DEFAULT_N_ESTIMATORS),
        };
        training.validate()?;

        Ok(Self {
            dataset_path: PathBuf::from(dataset_path),
            arms: ArmLabels::new(control, treatment),
            training,
        })
    }

    /// Create config with built-in defaults (fallback)
    pub fn defaults() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            arms: ArmLabels::default(),
            training: TrainingConfig::default(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("RETENTION_DATASET") {
            self.dataset_path = PathBuf::from(path);
        }
        if let Ok(control) = std::env::var("RETENTION_CONTROL_ARM") {
            self.arms.control = control;
        }
        if let Ok(treatment) = std::env::var("RETENTION_TREATMENT_ARM") {
            self.arms.treatment = treatment;
        }
        if let Some(seed) = Self::resolve_env_u64(None, "RETENTION_SEED") {
            self.training.seed = seed;
        }
        self
    }

    /// Override the dataset path (CLI flag)
    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }
}
