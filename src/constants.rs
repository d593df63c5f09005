//! Pipeline constants shared across preprocessing, segmentation, features, and training
//!
//! Any change to the values in [`features`] alters the feature vector layout and
//! invalidates previously trained model artifacts.

/// Canonical image dimensions after normalization
pub mod image {
    /// Width every image is resized to before segmentation
    pub const CANONICAL_WIDTH: u32 = 256;

    /// Height every image is resized to before segmentation
    pub const CANONICAL_HEIGHT: u32 = 256;
}

/// K-means color segmentation parameters
pub mod segmentation {
    /// Number of color clusters (foreground/diseased vs. background/healthy)
    pub const CLUSTER_COUNT: usize = 2;

    /// Maximum Lloyd iterations per attempt
    pub const MAX_ITERATIONS: usize = 10;

    /// Centroid shift below which an attempt is considered converged,
    /// in raw color-value units
    pub const CONVERGENCE_EPSILON: f32 = 1.0;

    /// Random restarts; the attempt with the lowest within-cluster
    /// sum of squared distances wins
    pub const RESTART_ATTEMPTS: usize = 10;
}

/// Feature vector layout
pub mod features {
    /// Per-channel mean and standard deviation for R, G, B
    pub const COLOR_FEATURE_COUNT: usize = 6;

    /// GLCM contrast, correlation, energy
    pub const TEXTURE_FEATURE_COUNT: usize = 3;

    /// Foreground area ratio
    pub const SHAPE_FEATURE_COUNT: usize = 1;

    /// Total feature vector length
    pub const FEATURE_LEN: usize =
        COLOR_FEATURE_COUNT + TEXTURE_FEATURE_COUNT + SHAPE_FEATURE_COUNT;

    /// Gray-level quantization for the co-occurrence matrix
    pub const GLCM_LEVELS: usize = 256;
}

/// Training and persistence parameters
pub mod training {
    /// Number of trees in the random forest
    pub const TREE_COUNT: usize = 100;

    /// Fraction of samples held out for evaluation
    pub const TEST_FRACTION: f64 = 0.2;

    /// Default seed used for segmentation restarts, the train/test
    /// shuffle, and ensemble fitting
    pub const DEFAULT_SEED: u64 = 42;

    /// Version tag written into every persisted model artifact
    pub const MODEL_FORMAT_VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_layout() {
        assert_eq!(features::FEATURE_LEN, 10);
        assert_eq!(
            features::FEATURE_LEN,
            features::COLOR_FEATURE_COUNT
                + features::TEXTURE_FEATURE_COUNT
                + features::SHAPE_FEATURE_COUNT
        );
    }

    #[test]
    fn test_parameter_ranges() {
        assert!(segmentation::CLUSTER_COUNT >= 2);
        assert!(segmentation::CONVERGENCE_EPSILON > 0.0);
        assert!(training::TEST_FRACTION > 0.0 && training::TEST_FRACTION < 1.0);
        assert!(training::TREE_COUNT > 0);
    }
}
