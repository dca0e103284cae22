//! Churn prediction model
//!
//! Provides:
//! - Seeded train/test partitioning
//! - CART trees and a bagged random forest
//! - The day-7 churn trainer and predictor

pub mod churn;
pub mod forest;
pub mod split;
pub mod tree;

pub use churn::{
    predict, train, ChurnFeatures, ChurnModel, ChurnOutcome, ChurnPrediction, TrainedChurnModel,
    TrainingReport,
};
pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use split::{train_test_split, TrainTestSplit};
pub use tree::{DecisionTree, Node, TreeParams};
