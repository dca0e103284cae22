//! Per-variant retention rates.
//!
//! Groups players by experiment arm and reports the share of players that
//! came back on day 1 or day 7.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::dataset::{PlayerRecord, PlayerTable};
use crate::Error;

/// Retention column used for aggregation and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "retention_1")]
    Day1,
    #[serde(rename = "retention_7")]
    Day7,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Day1, Metric::Day7];

    /// Column name in the player table.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Day1 => "retention_1",
            Metric::Day7 => "retention_7",
        }
    }

    pub fn value(self, record: &PlayerRecord) -> bool {
        match self {
            Metric::Day1 => record.retention_1,
            Metric::Day7 => record.retention_7,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retention_1" | "1" | "day1" | "d1" => Ok(Metric::Day1),
            "retention_7" | "7" | "day7" | "d7" => Ok(Metric::Day7),
            other => Err(Error::InvalidArgument(format!("Unknown metric: {}", other))),
        }
    }
}

/// Retention figures for a single variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRetention {
    pub variant: String,
    pub players: u64,
    pub retained: u64,
    /// Percentage of retained players, 0..=100.
    pub rate: f64,
}

/// Per-variant counts and rates, ordered by variant label.
pub fn summarize(table: &PlayerTable, metric: Metric) -> Vec<VariantRetention> {
    let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in table.records() {
        let entry = counts.entry(record.version.as_str()).or_default();
        entry.0 += 1;
        if metric.value(record) {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(variant, (players, retained))| VariantRetention {
            variant: variant.to_string(),
            players,
            retained,
            rate: retained as f64 / players as f64 * 100.0,
        })
        .collect()
}

/// Mean retention per variant as a percentage.
pub fn aggregate(table: &PlayerTable, metric: Metric) -> BTreeMap<String, f64> {
    summarize(table, metric)
        .into_iter()
        .map(|v| (v.variant, v.rate))
        .collect()
}
