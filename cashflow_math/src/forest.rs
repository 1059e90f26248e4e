//! Bagged random forest regressor
//!
//! Each tree is grown on a bootstrap sample of the training rows and considers
//! a random subset of the features at every split. The whole ensemble is a
//! pure function of the training data and the seed.

use crate::tree::{validate_training_set, RegressionTree, TreeConfig};
use crate::{MathError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Default number of trees in the ensemble
pub const DEFAULT_N_TREES: usize = 100;

/// Default seed for reproducible fits
pub const DEFAULT_SEED: u64 = 42;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree instead of using every row
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForestConfig {
    /// Check that the configuration can produce a forest
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(MathError::InvalidInput(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(MathError::InvalidInput(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(MathError::InvalidInput(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    /// Fit a forest on `features` / `targets`
    pub fn fit(config: &ForestConfig, features: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        config.validate()?;
        validate_training_set(features, targets)?;

        let n_samples = features.len();
        let n_features = features[0].len();
        let mut trees = Vec::with_capacity(config.n_trees);

        for i in 0..config.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
            let indices: Vec<usize> = if config.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let tree_config = TreeConfig {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                max_features: config.max_features,
                seed: rng.gen(),
            };
            trees.push(RegressionTree::fit_on_indices(
                &tree_config,
                features,
                targets,
                &indices,
            )?);
        }

        let mut feature_importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, importance) in feature_importances.iter_mut().zip(tree.feature_importances()) {
                *total += importance;
            }
        }
        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            for importance in &mut feature_importances {
                *importance /= sum;
            }
        }

        Ok(Self {
            trees,
            n_features,
            feature_importances,
        })
    }

    /// Predict for a single row: the mean of the tree predictions
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_one(row)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Predict for every row of a matrix
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of features the forest expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalized feature importances averaged over the trees
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
