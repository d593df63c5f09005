//! CART decision tree with random feature subsets per split
//!
//! Trees are grown fully (until leaves are pure or no valid split remains)
//! using gini impurity. Nodes live in a flat arena indexed by `usize`, which
//! keeps serialization non-recursive regardless of tree depth. Node 0 is
//! always the root.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// A single tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Internal split: `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf holding the class probability distribution of its training samples
    Leaf { probabilities: Vec<f64> },
}

/// A fitted decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit a tree on the rows of `vectors` selected by `indices`
    ///
    /// `indices` may contain duplicates (bootstrap resample). At each split,
    /// `features_per_split` candidate features are drawn without replacement
    /// from the fitting RNG.
    pub fn fit(
        vectors: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        class_count: usize,
        features_per_split: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            vectors,
            labels,
            class_count,
            features_per_split,
            nodes: Vec::new(),
        };
        builder.build(indices.to_vec(), rng);
        DecisionTree {
            nodes: builder.nodes,
        }
    }

    /// Class probability distribution for one feature vector
    pub fn predict_proba(&self, vector: &FeatureVector) -> &[f64] {
        let x = vector.as_slice();
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { probabilities } => return probabilities,
            }
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check that a deserialized tree is structurally sound for
    /// `class_count` classes
    ///
    /// Every leaf must hold exactly one probability per class and every
    /// split must reference children inside the node arena; traversal of a
    /// tree that fails this check would return garbage distributions or
    /// panic on an out-of-bounds index.
    pub fn is_consistent_with(&self, class_count: usize) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.nodes.iter().all(|node| match node {
            Node::Split { left, right, feature, .. } => {
                *left < self.nodes.len()
                    && *right < self.nodes.len()
                    && *feature < crate::constants::features::FEATURE_LEN
            }
            Node::Leaf { probabilities } => probabilities.len() == class_count,
        })
    }
}

struct TreeBuilder<'a> {
    vectors: &'a [FeatureVector],
    labels: &'a [usize],
    class_count: usize,
    features_per_split: usize,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Recursively grow the subtree for `indices`, returning its node index
    fn build(&mut self, indices: Vec<usize>, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&indices);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if pure || indices.len() < 2 {
            return self.push_leaf(&counts, indices.len());
        }

        let Some((feature, threshold)) = self.best_split(&indices, rng) else {
            // All candidate features constant over this node
            return self.push_leaf(&counts, indices.len());
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.vectors[i].as_slice()[feature] <= threshold);

        // Reserve the split slot before descending so node 0 stays the root
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            probabilities: Vec::new(),
        });
        let left = self.build(left_indices, rng);
        let right = self.build(right_indices, rng);
        self.nodes[index] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        index
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let probabilities = counts
            .iter()
            .map(|&c| if total > 0 { c as f64 / total as f64 } else { 0.0 })
            .collect();
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { probabilities });
        index
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_count];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    /// Search a random feature subset for the lowest weighted gini split
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<(usize, f64)> {
        let feature_count = crate::constants::features::FEATURE_LEN;
        let subset_size = self.features_per_split.clamp(1, feature_count);
        let candidates = rand::seq::index::sample(rng, feature_count, subset_size);

        let mut best: Option<(usize, f64, f64)> = None;
        for feature in candidates {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.vectors[i].as_slice()[feature], self.labels[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total = column.len();
            let mut left_counts = vec![0usize; self.class_count];
            let mut right_counts = self.class_counts(indices);

            for split_at in 1..total {
                let (value, label) = column[split_at - 1];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                // Only split between distinct values
                if value == column[split_at].0 {
                    continue;
                }

                let impurity = weighted_gini(&left_counts, split_at, &right_counts, total - split_at);
                let better = match best {
                    Some((_, _, best_impurity)) => impurity < best_impurity,
                    None => true,
                };
                if better {
                    // The midpoint of two values one ulp apart can round up
                    // to the larger value, which would send every sample
                    // left; fall back to the smaller value in that case
                    let mut threshold = (value + column[split_at].0) / 2.0;
                    if threshold >= column[split_at].0 {
                        threshold = value;
                    }
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

/// Size-weighted gini impurity of a two-way partition
fn weighted_gini(
    left_counts: &[usize],
    left_total: usize,
    right_counts: &[usize],
    right_total: usize,
) -> f64 {
    let total = (left_total + right_total) as f64;
    let left = gini(left_counts, left_total);
    let right = gini(right_counts, right_total);
    (left_total as f64 * left + right_total as f64 * right) / total
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let sum_squared: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - sum_squared
}
