//! CART regression tree
//!
//! Splits minimize the summed squared error of the two children. Nodes live in
//! a flat arena and reference their children by index.

use crate::{MathError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of the tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for the feature permutation
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    gain: f64,
}

struct TreeBuilder<'a> {
    config: &'a TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    nodes: Vec<Node>,
    importances: Vec<f64>,
    rng: ChaCha8Rng,
}

impl RegressionTree {
    /// Fit a tree on every row of `features`
    pub fn fit(config: &TreeConfig, features: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        let indices: Vec<usize> = (0..features.len()).collect();
        Self::fit_on_indices(config, features, targets, &indices)
    }

    /// Fit a tree on the rows named by `indices`. Indices may repeat, which is
    /// how bootstrap samples are passed in.
    pub fn fit_on_indices(
        config: &TreeConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
    ) -> Result<Self> {
        validate_training_set(features, targets)?;
        if indices.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a tree on an empty sample".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= features.len()) {
            return Err(MathError::InvalidInput(format!(
                "Sample index {} out of range for {} rows",
                bad,
                features.len()
            )));
        }
        if config.min_samples_leaf == 0 {
            return Err(MathError::InvalidInput(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        let n_features = features[0].len();
        let mut builder = TreeBuilder {
            config,
            features,
            targets,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        };
        builder.build(indices.to_vec(), 0);

        let mut feature_importances = builder.importances;
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut feature_importances {
                *importance /= total;
            }
        }

        Ok(Self {
            nodes: builder.nodes,
            n_features,
            feature_importances,
        })
    }

    /// Predict the target for a single row
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Tree was fitted on {} features, got {}",
                self.n_features,
                row.len()
            )));
        }

        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Normalized impurity-decrease importance per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Number of features the tree expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            let y = self.targets[i];
            (s + y, sq + y * y)
        });
        let mean = sum / n as f64;
        let sse = (sum_sq - sum * sum / n as f64).max(0.0);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse / (n as f64) < 1e-12
        {
            return self.push(Node::Leaf { value: mean });
        }

        let Some(split) = self.find_best_split(&indices, sse) else {
            return self.push(Node::Leaf { value: mean });
        };

        self.importances[split.feature] += split.gain;
        let slot = self.push(Node::Leaf { value: mean });
        let left = self.build(split.left, depth + 1);
        let right = self.build(split.right, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn find_best_split(&mut self, indices: &[usize], parent_sse: f64) -> Option<BestSplit> {
        let n_features = self.features[0].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(max_features);

        let min_leaf = self.config.min_samples_leaf;
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for &feature in &candidates {
            let mut pairs: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.features[i][feature], self.targets[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
            let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 1..n {
                let y = pairs[k - 1].1;
                left_sum += y;
                left_sq += y * y;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let (lower, upper) = (pairs[k - 1].0, pairs[k].0);
                if lower >= upper {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - k) as f64;
                let gain = parent_sse - (left_sse + right_sse);

                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    let mut threshold = lower + (upper - lower) / 2.0;
                    if threshold >= upper {
                        threshold = lower;
                    }
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][feature] <= threshold);

        Some(BestSplit {
            feature,
            threshold,
            left,
            right,
            gain,
        })
    }
}

/// Check that a training set is non-empty, rectangular, finite and paired with targets
pub(crate) fn validate_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
    let first = features.first().ok_or_else(|| {
        MathError::InsufficientData("Training set has no rows".to_string())
    })?;
    if features.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature rows ({}) and targets ({}) differ in length",
            features.len(),
            targets.len()
        )));
    }
    let width = first.len();
    if width == 0 {
        return Err(MathError::InvalidInput(
            "Training rows have no features".to_string(),
        ));
    }
    if features.iter().any(|row| row.len() != width) {
        return Err(MathError::InvalidInput(
            "Training rows have inconsistent widths".to_string(),
        ));
    }
    if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Training set contains non-finite values".to_string(),
        ));
    }
    Ok(())
}
