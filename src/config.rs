//! Configuration structures for the leafscan training pipeline.
//!
//! This module defines all tunable parameters for training runs,
//! organized into logical groups for segmentation and ensemble fitting.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use leafscan::TrainingConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = TrainingConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = TrainingConfig::default_plant_village();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{segmentation, training};

/// Complete configuration for a training run.
///
/// Contains all parameters needed to go from a labeled image directory
/// to a persisted model artifact. Can be serialized to/from JSON for
/// reproducible experiments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Root directory whose immediate subdirectories are class names
    pub dataset_dir: PathBuf,

    /// Output path for the trained model artifact
    pub model_path: PathBuf,

    /// Seed applied to segmentation restarts, the train/test shuffle,
    /// and ensemble fitting
    pub seed: u64,

    /// Fraction of samples held out for evaluation (0.0-1.0)
    pub test_fraction: f64,

    /// Segmentation parameters
    pub segmentation: SegmentationConfig,

    /// Ensemble parameters
    pub ensemble: EnsembleConfig,
}

/// Color segmentation parameters.
///
/// Controls the K=2 K-means pass that separates the dominant foreground
/// region from the background before feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Maximum Lloyd iterations per attempt
    pub max_iterations: usize,

    /// Centroid shift convergence threshold in raw color-value units
    pub convergence_epsilon: f32,

    /// Number of random restarts; lowest within-cluster variance wins
    pub restart_attempts: usize,
}

/// Random forest parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Number of decision trees
    pub tree_count: usize,
}

impl TrainingConfig {
    /// Create default configuration (PlantVillage baseline)
    pub fn default_plant_village() -> Self {
        Self {
            dataset_dir: PathBuf::from("PlantVillage"),
            model_path: PathBuf::from("plant_disease_model.json"),
            seed: training::DEFAULT_SEED,
            test_fraction: training::TEST_FRACTION,
            segmentation: SegmentationConfig {
                max_iterations: segmentation::MAX_ITERATIONS,
                convergence_epsilon: segmentation::CONVERGENCE_EPSILON,
                restart_attempts: segmentation::RESTART_ATTEMPTS,
            },
            ensemble: EnsembleConfig {
                tree_count: training::TREE_COUNT,
            },
        }
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
