//! Regression trees grown by recursive binary splitting on squared error.
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

/// One node in the flattened tree. Children point back into the arena.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn (without replacement) at each split. `None` tries all.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grow a tree over `rows`, indices into `x`/`y` possibly repeated by
    /// the caller's bootstrap. `rows` is reordered in place while
    /// partitioning and must be non-empty.
    pub fn fit(
        x: &ArrayView2<f32>,
        y: &[f64],
        rows: &mut [usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, rows, 0, params, rng);
        tree
    }

    /// Returns the arena index of the subtree root. A leaf is pushed first
    /// and only promoted to a split once both children exist.
    fn grow(
        &mut self,
        x: &ArrayView2<f32>,
        y: &[f64],
        rows: &mut [usize],
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean_label(y, rows),
        });

        if rows.len() < params.min_samples_split {
            return node_id;
        }
        if params.max_depth.map_or(false, |limit| depth >= limit) {
            return node_id;
        }
        let Some(split) = best_split(x, y, rows, params, rng) else {
            return node_id;
        };

        let mid = partition(x, rows, split.feature, split.threshold);
        if mid == 0 || mid == rows.len() {
            // Every row landed on one side; the leaf stands.
            return node_id;
        }
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.grow(x, y, left_rows, depth + 1, params, rng);
        let right = self.grow(x, y, right_rows, depth + 1, params, rng);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Walk a single row down to its leaf. Rows at a threshold go left.
    pub fn predict_row(&self, row: &[f32]) -> f64 {
        let mut node = &self.nodes[0];
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        &self.nodes[*left]
                    } else {
                        &self.nodes[*right]
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.depth_below(0)
    }

    fn depth_below(&self, node: usize) -> usize {
        match &self.nodes[node] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.depth_below(*left).max(self.depth_below(*right))
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f32,
}

/// Pick the (feature, threshold) pair minimizing the summed squared error
/// of the two children. `None` when the labels are already pure or no
/// admissible split improves on the parent.
fn best_split(
    x: &ArrayView2<f32>,
    y: &[f64],
    rows: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let parent_sse = sse(y, rows);
    if parent_sse <= 1e-12 {
        return None;
    }

    let mut features: Vec<usize> = (0..x.ncols()).collect();
    if let Some(k) = params.max_features {
        features.shuffle(rng);
        features.truncate(k.clamp(1, x.ncols()));
    }

    let mut best: Option<(f64, SplitCandidate)> = None;
    let mut order: Vec<usize> = Vec::with_capacity(n);
    for &feature in &features {
        order.clear();
        order.extend_from_slice(rows);
        order.sort_unstable_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(Ordering::Equal)
        });

        let total_sum: f64 = order.iter().map(|&r| y[r]).sum();
        let total_sq: f64 = order.iter().map(|&r| y[r] * y[r]).sum();
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        // Prefix scan over rows in feature order; boundary i splits
        // order[..i] from order[i..].
        for i in 1..n {
            let prev = order[i - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            let lo = x[[prev, feature]];
            let hi = x[[order[i], feature]];
            if lo == hi {
                // Equal feature values cannot be separated.
                continue;
            }
            let (n_left, n_right) = (i, n - i);
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let left_sse = left_sq - left_sum * left_sum / n_left as f64;
            let right_sse = right_sq - right_sum * right_sum / n_right as f64;
            let score = left_sse + right_sse;

            if best.as_ref().map_or(true, |(b, _)| score < *b) {
                // The midpoint of adjacent floats can round up to `hi`
                // itself; clamp to `lo` so rows at `hi` stay right.
                let mut threshold = (lo + hi) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some((score, SplitCandidate { feature, threshold }));
            }
        }
    }

    best.filter(|(score, _)| *score < parent_sse - 1e-12)
        .map(|(_, candidate)| candidate)
}

/// Move rows with `feature <= threshold` to the front; returns the count.
fn partition(x: &ArrayView2<f32>, rows: &mut [usize], feature: usize, threshold: f32) -> usize {
    let mut mid = 0;
    for i in 0..rows.len() {
        if x[[rows[i], feature]] <= threshold {
            rows.swap(mid, i);
            mid += 1;
        }
    }
    mid
}

fn mean_label(y: &[f64], rows: &[usize]) -> f64 {
    let sum: f64 = rows.iter().map(|&r| y[r]).sum();
    sum / rows.len() as f64
}

fn sse(y: &[f64], rows: &[usize]) -> f64 {
    let m = mean_label(y, rows);
    rows.iter().map(|&r| (y[r] - m).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }

    fn fit(x: &Array2<f32>, y: &[f64], params: &TreeParams) -> RegressionTree {
        let mut rows: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        RegressionTree::fit(&x.view(), y, &mut rows, params, &mut rng)
    }

    #[test]
    fn recovers_a_step_function() {
        let x = Array2::from_shape_vec((6, 1), vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).unwrap();
        let y = vec![5.0, 5.0, 5.0, 50.0, 50.0, 50.0];
        let tree = fit(&x, &y, &params());

        assert_eq!(tree.predict_row(&[2.0]), 5.0);
        assert_eq!(tree.predict_row(&[11.0]), 50.0);
        // One split is enough for a perfect fit.
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn pure_labels_stay_a_single_leaf() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = vec![7.0; 4];
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(&[99.0]), 7.0);
    }

    #[test]
    fn constant_features_stay_a_single_leaf() {
        let x = Array2::from_shape_vec((4, 2), vec![3.0; 8]).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(&[3.0, 3.0]), 2.5);
    }

    #[test]
    fn max_depth_zero_pins_the_root() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let tree = fit(
            &x,
            &y,
            &TreeParams {
                max_depth: Some(0),
                ..params()
            },
        );
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(&[1.0]), 2.5);
    }

    #[test]
    fn adjacent_float_values_still_split() {
        // (lo + 1.0) / 2.0 rounds to 1.0 exactly; the clamped threshold
        // must keep the 1.0 rows on the right.
        let lo = 1.0_f32 - f32::EPSILON / 2.0;
        let x = Array2::from_shape_vec((4, 1), vec![lo, lo, 1.0, 1.0]).unwrap();
        let y = vec![2.0, 2.0, 8.0, 8.0];
        let tree = fit(&x, &y, &params());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict_row(&[lo]), 2.0);
        assert_eq!(tree.predict_row(&[1.0]), 8.0);
    }

    #[test]
    fn min_samples_leaf_blocks_lonely_leaves() {
        // Splitting off the outlier alone would leave a 1-row leaf.
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 100.0]).unwrap();
        let y = vec![1.0, 1.0, 1.0, 99.0];
        let tree = fit(
            &x,
            &y,
            &TreeParams {
                min_samples_leaf: 2,
                ..params()
            },
        );
        // The only admissible boundary is 2|2, so the outlier shares its
        // leaf with one clean row and drags the leaf mean to 50.
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict_row(&[100.0]), 50.0);
        assert_eq!(tree.predict_row(&[1.5]), 1.0);
    }
}
