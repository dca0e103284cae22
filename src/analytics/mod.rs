//! A/B retention analytics module
//!
//! Provides:
//! - Per-variant retention rates
//! - Chi-squared significance testing of variant vs. retention

pub mod distribution;
pub mod retention;
pub mod significance;

pub use retention::{aggregate, summarize, Metric, VariantRetention};
pub use significance::{
    chi2_contingency, test_significance, ChiSquaredTest, ContingencyTable, SignificanceReport,
    Verdict, SIGNIFICANCE_LEVEL,
};
