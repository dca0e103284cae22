//! Chi-squared test of independence between experiment arm and retention.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use super::distribution::chi_squared_sf;
use super::retention::Metric;
use crate::dataset::PlayerTable;
use crate::{Error, Result};

/// p-values below this are reported as significant. Fixed, not configurable.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Cross-tabulation of variant (rows) against metric value (columns).
///
/// Only observed values appear: rows are the sorted distinct variants and
/// columns are the metric outcomes present in the data, `false` before
/// `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub variants: Vec<String>,
    pub outcomes: Vec<bool>,
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn from_table(table: &PlayerTable, metric: Metric) -> Self {
        let mut cells: BTreeMap<(&str, bool), u64> = BTreeMap::new();
        for record in table.records() {
            *cells
                .entry((record.version.as_str(), metric.value(record)))
                .or_insert(0) += 1;
        }

        let mut variants: Vec<String> = cells.keys().map(|(v, _)| v.to_string()).collect();
        variants.dedup();
        let mut outcomes: Vec<bool> = cells.keys().map(|(_, o)| *o).collect();
        outcomes.sort_unstable();
        outcomes.dedup();

        let counts = variants
            .iter()
            .map(|variant| {
                outcomes
                    .iter()
                    .map(|&outcome| {
                        cells
                            .get(&(variant.as_str(), outcome))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();

        Self {
            variants,
            outcomes,
            counts,
        }
    }

    /// Build directly from counts, e.g. for a published 2×2 table.
    pub fn from_counts(
        variants: Vec<String>,
        outcomes: Vec<bool>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self> {
        if counts.len() != variants.len()
            || counts.iter().any(|row| row.len() != outcomes.len())
        {
            return Err(Error::InvalidArgument(format!(
                "counts must be {}x{}",
                variants.len(),
                outcomes.len()
            )));
        }
        Ok(Self {
            variants,
            outcomes,
            counts,
        })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_totals(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|row| row.iter().sum::<u64>() as f64)
            .collect()
    }

    fn column_totals(&self) -> Vec<f64> {
        (0..self.outcomes.len())
            .map(|j| self.counts.iter().map(|row| row[j]).sum::<u64>() as f64)
            .collect()
    }
}

/// Result of a chi-squared independence test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquaredTest {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    pub expected: Vec<Vec<f64>>,
}

/// Chi-squared test of independence on a contingency table.
///
/// With `correction` set and one degree of freedom, Yates' continuity
/// correction moves every observed count towards its expected count by
/// at most 0.5 before the statistic is computed.
pub fn chi2_contingency(table: &ContingencyTable, correction: bool) -> Result<ChiSquaredTest> {
    let total = table.total() as f64;
    let rows = table.row_totals();
    let cols = table.column_totals();

    let expected: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| cols.iter().map(|c| r * c / total).collect())
        .collect();

    if total == 0.0 || expected.iter().flatten().any(|&e| e == 0.0) {
        return Err(Error::Statistics(
            "expected frequency table has a zero element".to_string(),
        ));
    }

    let dof = rows.len().saturating_sub(1) * cols.len().saturating_sub(1);
    if dof == 0 {
        return Ok(ChiSquaredTest {
            statistic: 0.0,
            p_value: 1.0,
            dof,
            expected,
        });
    }

    let yates = correction && dof == 1;
    let statistic: f64 = table
        .counts
        .iter()
        .flatten()
        .zip(expected.iter().flatten())
        .map(|(&observed, &exp)| {
            let mut observed = observed as f64;
            if yates {
                let diff = exp - observed;
                observed += diff.signum() * diff.abs().min(0.5);
            }
            (observed - exp).powi(2) / exp
        })
        .sum();

    let p_value = chi_squared_sf(statistic, dof)?;
    debug!(statistic, p_value, dof, yates, "Chi-squared test");

    Ok(ChiSquaredTest {
        statistic,
        p_value,
        dof,
        expected,
    })
}

/// Significance decision at [`SIGNIFICANCE_LEVEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Significant,
    NotSignificant,
}

impl Verdict {
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < SIGNIFICANCE_LEVEL {
            Verdict::Significant
        } else {
            Verdict::NotSignificant
        }
    }

    pub fn is_significant(self) -> bool {
        self == Verdict::Significant
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Significant => f.write_str("Significant"),
            Verdict::NotSignificant => f.write_str("Not Significant"),
        }
    }
}

/// Full output of the A/B significance check for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceReport {
    pub metric: Metric,
    pub contingency: ContingencyTable,
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    pub expected: Vec<Vec<f64>>,
    pub verdict: Verdict,
}

/// Cross-tabulate `metric` by variant and run the corrected chi-squared test.
pub fn test_significance(table: &PlayerTable, metric: Metric) -> Result<SignificanceReport> {
    let contingency = ContingencyTable::from_table(table, metric);
    let test = chi2_contingency(&contingency, true)?;

    Ok(SignificanceReport {
        metric,
        contingency,
        statistic: test.statistic,
        p_value: test.p_value,
        dof: test.dof,
        expected: test.expected,
        verdict: Verdict::from_p_value(test.p_value),
    })
}
