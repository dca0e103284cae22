//! Bagged ensemble of classification trees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::tree::{DecisionTree, TreeParams};
use crate::{Error, Result};

/// How many informative features each split examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(n_features)))`
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let resolved = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(n) => n.min(n_features),
        };
        resolved.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 0,
        }
    }
}

impl ForestParams {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit `n_estimators` fully grown trees, each on its own bootstrap draw.
    ///
    /// Every tree gets a seed drawn from the forest seed, so the ensemble is
    /// reproducible for a fixed `params.seed`.
    pub fn fit(features: &[Vec<f64>], labels: &[bool], params: &ForestParams) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if params.n_estimators == 0 {
            return Err(Error::InvalidArgument(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let n = features.len();
        let n_features = features[0].len();
        let tree_params = TreeParams {
            max_features: Some(params.max_features.resolve(n_features)),
            ..TreeParams::default()
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for t in 0..params.n_estimators {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());

            let weights = if params.bootstrap {
                let mut counts = vec![0u32; n];
                for _ in 0..n {
                    counts[tree_rng.gen_range(0..n)] += 1;
                }
                counts
            } else {
                vec![1u32; n]
            };

            let tree = DecisionTree::fit(features, labels, &weights, &tree_params, &mut tree_rng)?;
            debug!(
                tree = t,
                nodes = tree.nodes().len(),
                depth = tree.depth(),
                "Fitted tree"
            );
            trees.push(tree);
        }

        Ok(Self { trees, n_features })
    }

    /// Mean positive-class probability across trees.
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(x)).sum();
        sum / self.trees.len() as f64
    }

    /// Positive class when the averaged probability exceeds one half.
    pub fn predict(&self, x: &[f64]) -> bool {
        self.predict_proba(x) > 0.5
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![f64::from(i), f64::from(i % 2), 0.0])
            .collect();
        let labels: Vec<bool> = (0..60).map(|i| i >= 30).collect();
        (features, labels)
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
        assert_eq!(MaxFeatures::All.resolve(3), 3);
        assert_eq!(MaxFeatures::Fixed(5).resolve(3), 3);
        assert_eq!(MaxFeatures::Fixed(0).resolve(3), 1);
    }

    #[test]
    fn test_fit_tree_count() {
        let (features, labels) = separable();
        let forest = RandomForest::fit(&features, &labels, &ForestParams::new(7, 42)).unwrap();
        assert_eq!(forest.trees().len(), 7);
        assert_eq!(forest.n_features(), 3);
    }

    #[test]
    fn test_separable_data_classified() {
        let (features, labels) = separable();
        let forest = RandomForest::fit(&features, &labels, &ForestParams::new(25, 42)).unwrap();

        assert!(!forest.predict(&[2.0, 0.0, 0.0]));
        assert!(forest.predict(&[57.0, 1.0, 0.0]));

        let correct = features
            .iter()
            .zip(&labels)
            .filter(|&(x, &y)| forest.predict(x) == y)
            .count();
        assert!(correct >= 55, "only {correct} of 60 correct");
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (features, labels) = separable();
        let a = RandomForest::fit(&features, &labels, &ForestParams::new(5, 42)).unwrap();
        let b = RandomForest::fit(&features, &labels, &ForestParams::new(5, 42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_probability_is_tree_mean() {
        let (features, labels) = separable();
        let forest = RandomForest::fit(&features, &labels, &ForestParams::new(4, 3)).unwrap();

        let x = [29.5, 1.0, 0.0];
        let mean = forest
            .trees()
            .iter()
            .map(|t| t.predict_proba(&x))
            .sum::<f64>()
            / 4.0;
        assert!((forest.predict_proba(&x) - mean).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&forest.predict_proba(&x)));
    }

    #[test]
    fn test_without_bootstrap_trees_fit_training_set() {
        let (features, labels) = separable();
        let params = ForestParams {
            bootstrap: false,
            ..ForestParams::new(3, 9)
        };
        let forest = RandomForest::fit(&features, &labels, &params).unwrap();
        for (x, &y) in features.iter().zip(&labels) {
            assert_eq!(forest.predict(x), y);
        }
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = RandomForest::fit(&[], &[], &ForestParams::new(3, 1));
        assert!(matches!(result, Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_zero_trees_is_error() {
        let (features, labels) = separable();
        let result = RandomForest::fit(&features, &labels, &ForestParams::new(0, 1));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
