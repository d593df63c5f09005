//! Random forest ensemble over feature vectors
//!
//! Each tree is fit on a bootstrap resample of the training partition with
//! a sqrt-of-feature-count random subset per split. Prediction averages the
//! per-tree leaf distributions; the label is the argmax class. Fitting is
//! fully deterministic for a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::DecisionTree;
use crate::constants::features::FEATURE_LEN;
use crate::features::FeatureVector;

/// A fitted, immutable tree ensemble
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit an ensemble of `tree_count` trees
    ///
    /// `labels` holds indices into `classes`. The output probability order
    /// follows `classes`.
    pub fn fit(
        vectors: &[FeatureVector],
        labels: &[usize],
        classes: Vec<String>,
        tree_count: usize,
        seed: u64,
    ) -> Self {
        let features_per_split = ((FEATURE_LEN as f64).sqrt() as usize).max(1);
        let sample_count = vectors.len();

        let mut master = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(tree_count);
        for _ in 0..tree_count {
            let bootstrap: Vec<usize> = (0..sample_count)
                .map(|_| master.gen_range(0..sample_count))
                .collect();
            let mut tree_rng = StdRng::seed_from_u64(master.gen());
            trees.push(DecisionTree::fit(
                vectors,
                labels,
                &bootstrap,
                classes.len(),
                features_per_split,
                &mut tree_rng,
            ));
        }

        Self { classes, trees }
    }

    /// Reassemble a forest from persisted parts
    pub fn from_parts(classes: Vec<String>, trees: Vec<DecisionTree>) -> Self {
        Self { classes, trees }
    }

    /// Class labels in output probability order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Fitted trees
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Per-class probability distribution, averaged over all trees
    pub fn predict_proba(&self, vector: &FeatureVector) -> Vec<f64> {
        let mut probabilities = vec![0.0f64; self.classes.len()];
        for tree in &self.trees {
            for (slot, p) in probabilities.iter_mut().zip(tree.predict_proba(vector)) {
                *slot += p;
            }
        }
        let tree_count = self.trees.len() as f64;
        for slot in probabilities.iter_mut() {
            *slot /= tree_count;
        }
        probabilities
    }

    /// Most probable class label (ties resolve to the earlier class)
    pub fn predict(&self, vector: &FeatureVector) -> &str {
        let probabilities = self.predict_proba(vector);
        let mut best = 0;
        for (index, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = index;
            }
        }
        &self.classes[best]
    }
}
