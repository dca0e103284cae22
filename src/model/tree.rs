//! CART classification tree for binary labels.
//!
//! Nodes live in a flat arena; `Split` nodes reference their children by
//! index. Samples carry integer weights so a bootstrap draw can be expressed
//! as draw counts instead of duplicated rows. Impurity is Gini, thresholds sit
//! halfway between adjacent distinct feature values, and a sample goes left
//! when `x[feature] <= threshold`.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Weighted fraction of positive samples that reached this leaf.
        probability: f64,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    /// Informative features examined per split; `None` examines all.
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_features: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    cost: f64,
}

fn gini(positive: f64, total: f64) -> f64 {
    let p = positive / total;
    2.0 * p * (1.0 - p)
}

impl DecisionTree {
    /// Grow a tree on the rows whose weight is non-zero.
    pub fn fit<R: Rng + ?Sized>(
        features: &[Vec<f64>],
        labels: &[bool],
        weights: &[u32],
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self> {
        if features.len() != labels.len() || features.len() != weights.len() {
            return Err(Error::InvalidArgument(format!(
                "features ({}), labels ({}) and weights ({}) differ in length",
                features.len(),
                labels.len(),
                weights.len()
            )));
        }

        let samples: Vec<usize> = (0..features.len()).filter(|&i| weights[i] > 0).collect();
        if samples.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let n_features = features[samples[0]].len();

        let mut nodes = vec![Node::Leaf { probability: 0.0 }];
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((index, samples, depth)) = stack.pop() {
            let (total, positive) = samples.iter().fold((0.0, 0.0), |(t, p), &i| {
                let w = f64::from(weights[i]);
                (t + w, if labels[i] { p + w } else { p })
            });
            let probability = positive / total;

            let can_split = samples.len() >= params.min_samples_split
                && samples.len() >= 2 * params.min_samples_leaf
                && positive > 0.0
                && positive < total
                && params.max_depth.map_or(true, |max| depth < max);

            let candidate = if can_split {
                best_split(features, labels, weights, &samples, n_features, params, rng)
            } else {
                None
            };

            let Some(candidate) = candidate else {
                nodes[index] = Node::Leaf { probability };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| features[i][candidate.feature] <= candidate.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { probability: 0.0 });
            nodes.push(Node::Leaf { probability: 0.0 });
            nodes[index] = Node::Split {
                feature: candidate.feature,
                threshold: candidate.threshold,
                left,
                right,
            };

            stack.push((right, right_samples, depth + 1));
            stack.push((left, left_samples, depth + 1));
        }

        Ok(Self { nodes, n_features })
    }

    /// Probability of the positive class for one feature row.
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { probability } => return probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[index] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }
}

/// Lowest weighted-Gini split over a random subset of informative features.
///
/// Features are visited in random order; constant features are skipped and
/// do not count towards `max_features`.
fn best_split<R: Rng + ?Sized>(
    features: &[Vec<f64>],
    labels: &[bool],
    weights: &[u32],
    samples: &[usize],
    n_features: usize,
    params: &TreeParams,
    rng: &mut R,
) -> Option<Candidate> {
    let max_features = params
        .max_features
        .unwrap_or(n_features)
        .clamp(1, n_features.max(1));

    let mut order: Vec<usize> = (0..n_features).collect();
    order.shuffle(rng);

    let mut informative = 0;
    let mut best: Option<Candidate> = None;
    let mut column: Vec<(f64, bool, f64)> = Vec::with_capacity(samples.len());

    for feature in order {
        if informative >= max_features {
            break;
        }

        column.clear();
        column.extend(
            samples
                .iter()
                .map(|&i| (features[i][feature], labels[i], f64::from(weights[i]))),
        );
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (first, last) = (column[0].0, column[column.len() - 1].0);
        if first == last {
            continue;
        }
        informative += 1;

        let (total, positive) = column.iter().fold((0.0, 0.0), |(t, p), &(_, label, w)| {
            (t + w, if label { p + w } else { p })
        });

        let mut left_total = 0.0;
        let mut left_positive = 0.0;
        for k in 0..column.len() - 1 {
            let (value, label, weight) = column[k];
            left_total += weight;
            if label {
                left_positive += weight;
            }

            let next = column[k + 1].0;
            if value == next {
                continue;
            }

            let left_count = k + 1;
            let right_count = column.len() - left_count;
            if left_count < params.min_samples_leaf || right_count < params.min_samples_leaf {
                continue;
            }

            let right_total = total - left_total;
            let right_positive = positive - left_positive;
            let cost = left_total * gini(left_positive, left_total)
                + right_total * gini(right_positive, right_total);

            if best.as_ref().map_or(true, |b| cost < b.cost) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(Candidate {
                    feature,
                    threshold,
                    cost,
                });
            }
        }
    }

    best
}
