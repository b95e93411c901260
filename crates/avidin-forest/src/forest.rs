//! Bagged ensemble of regression trees.
use crate::tree::{RegressionTree, TreeParams};
use anyhow::{anyhow, Result};
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How many candidate features each split may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Every feature at every split, classic bagging.
    All,
    /// `sqrt(n_features)`, the usual random-forest default.
    Sqrt,
    /// A fixed fraction of the features, at least one.
    Fraction(f64),
}

impl MaxFeatures {
    fn resolve(&self, n_features: usize) -> Option<usize> {
        match self {
            MaxFeatures::All => None,
            MaxFeatures::Sqrt => Some(((n_features as f64).sqrt() as usize).max(1)),
            MaxFeatures::Fraction(f) => {
                Some(((n_features as f64 * f) as usize).clamp(1, n_features))
            }
        }
    }
}

/// Forest hyperparameters. The seed fixes the bootstrap and any feature
/// subsampling, so a config and a training set fully determine the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed: 42,
        }
    }
}

pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Fit `config.n_trees` trees, each on its own bootstrap resample of
    /// the rows of `x`.
    pub fn fit(config: &RandomForestConfig, x: ArrayView2<f32>, y: &[f64]) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(anyhow!("cannot fit a forest on an empty training set"));
        }
        if y.len() != n {
            return Err(anyhow!(
                "feature rows ({n}) and labels ({}) differ in count",
                y.len()
            ));
        }
        if config.n_trees == 0 {
            return Err(anyhow!("forest needs at least one tree"));
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            min_samples_leaf: config.min_samples_leaf.max(1),
            max_features: config.max_features.resolve(x.ncols()),
        };

        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            // Per-tree streams keyed off the config seed, so changing the
            // tree count never reshuffles the trees already grown.
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));
            let mut rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(&x, y, &mut rows, &params, &mut rng));
        }

        Ok(Self {
            trees,
            n_features: x.ncols(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict one feature row as the mean over all trees.
    pub fn predict(&self, row: &[f32]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(anyhow!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            ));
        }
        Ok(self.mean_over_trees(row))
    }

    /// Predict a batch; the output index matches the input row index.
    pub fn predict_batch(&self, x: ArrayView2<f32>) -> Result<Vec<f64>> {
        if x.ncols() != self.n_features {
            return Err(anyhow!(
                "expected {} features, got {}",
                self.n_features,
                x.ncols()
            ));
        }
        let mut out = Vec::with_capacity(x.nrows());
        let mut buf = vec![0.0f32; self.n_features];
        for row in x.rows() {
            for (slot, v) in buf.iter_mut().zip(row.iter()) {
                *slot = *v;
            }
            out.push(self.mean_over_trees(&buf));
        }
        Ok(out)
    }

    fn mean_over_trees(&self, row: &[f32]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }
}
