//! Fused feature rows paired with affinity labels, and the deterministic
//! train/held-out split over them.
use anyhow::{anyhow, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Ordered (feature row, affinity) pairs with a single fixed row width.
///
/// The first row pushed fixes the width; an embedder changing its output
/// length mid-run is a bug and is rejected at the point of collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureDataset {
    features: Vec<Vec<f32>>,
    labels: Vec<f64>,
}

impl FeatureDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fused row and its affinity label.
    pub fn push(&mut self, features: Vec<f32>, affinity_nm: f64) -> Result<()> {
        if let Some(width) = self.feature_width() {
            if features.len() != width {
                return Err(anyhow!(
                    "feature width changed mid-run: row {} has {} values, expected {}",
                    self.len(),
                    features.len(),
                    width
                ));
            }
        }
        self.features.push(features);
        self.labels.push(affinity_nm);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row width, or `None` before the first push.
    pub fn feature_width(&self) -> Option<usize> {
        self.features.first().map(Vec::len)
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Dense `[rows, width]` matrix handed to the regressor.
    pub fn feature_matrix(&self) -> Result<Array2<f32>> {
        let width = self
            .feature_width()
            .ok_or_else(|| anyhow!("empty dataset has no feature matrix"))?;
        let mut flat = Vec::with_capacity(self.len() * width);
        for row in &self.features {
            flat.extend_from_slice(row);
        }
        Ok(Array2::from_shape_vec((self.len(), width), flat)?)
    }

    fn take_rows(&self, indices: &[usize]) -> Self {
        let mut subset = Self::new();
        for &i in indices {
            subset.features.push(self.features[i].clone());
            subset.labels.push(self.labels[i]);
        }
        subset
    }
}

/// Deterministically partition `dataset` into (train, held_out).
///
/// The same seed and the same input order always produce the same
/// partition; reordering the input reshuffles it. Held-out size is
/// `round(len × test_fraction)`; the subsets are disjoint, cover the
/// input, and each keeps the input's relative row order.
pub fn train_test_split(
    dataset: &FeatureDataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(FeatureDataset, FeatureDataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(anyhow!(
            "test fraction must be in (0, 1), got {test_fraction}"
        ));
    }
    let n = dataset.len();
    let n_test = (n as f64 * test_fraction).round() as usize;
    if n_test == 0 || n_test == n {
        return Err(anyhow!(
            "test fraction {test_fraction} leaves an empty subset for {n} rows"
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (test_idx, train_idx) = order.split_at_mut(n_test);
    test_idx.sort_unstable();
    train_idx.sort_unstable();

    Ok((dataset.take_rows(train_idx), dataset.take_rows(test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> FeatureDataset {
        let mut ds = FeatureDataset::new();
        for i in 0..n {
            // Labels double as row identifiers in the assertions below.
            ds.push(vec![i as f32, (i * 2) as f32], i as f64).unwrap();
        }
        ds
    }

    #[test]
    fn push_rejects_width_change() {
        let mut ds = FeatureDataset::new();
        ds.push(vec![1.0, 2.0], 10.0).unwrap();
        let err = ds.push(vec![1.0, 2.0, 3.0], 11.0).unwrap_err();
        assert!(err.to_string().contains("feature width changed"));
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn feature_matrix_shape_and_content() {
        let ds = dataset(3);
        let m = ds.feature_matrix().unwrap();
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m[[2, 1]], 4.0);
    }

    #[test]
    fn empty_dataset_has_no_matrix() {
        assert!(FeatureDataset::new().feature_matrix().is_err());
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let ds = dataset(100);
        let (train_a, test_a) = train_test_split(&ds, 0.2, 42).unwrap();
        let (train_b, test_b) = train_test_split(&ds, 0.2, 42).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let (_, test_c) = train_test_split(&ds, 0.2, 43).unwrap();
        assert_ne!(test_a, test_c, "a different seed should repartition");
    }

    #[test]
    fn split_sizes_and_disjointness() {
        let ds = dataset(100);
        let (train, test) = train_test_split(&ds, 0.2, 7).unwrap();
        assert_eq!(test.len(), 20);
        assert_eq!(train.len() + test.len(), ds.len());

        let mut seen: Vec<i64> = train
            .labels()
            .iter()
            .chain(test.labels())
            .map(|&v| v as i64)
            .collect();
        seen.sort_unstable();
        let expected: Vec<i64> = (0..100).collect();
        assert_eq!(seen, expected, "subsets must cover the input exactly once");
    }

    #[test]
    fn split_rejects_degenerate_fractions() {
        let ds = dataset(10);
        assert!(train_test_split(&ds, 0.0, 1).is_err());
        assert!(train_test_split(&ds, 1.0, 1).is_err());
        assert!(train_test_split(&ds, 0.001, 1).is_err());
    }
}
