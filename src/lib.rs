//! # Leafscan
//!
//! A Rust crate for classifying plant-leaf diseases from hand-engineered
//! visual features.
//!
//! The pipeline works by:
//! - Normalizing every image to a canonical 256×256 RGB resolution
//! - Separating foreground from background with seeded K=2 K-means color
//!   clustering
//! - Reducing the segmented image to a fixed 10-value feature vector
//!   (color statistics, GLCM texture statistics, foreground area ratio)
//! - Classifying with a 100-tree random forest fit offline on a labeled
//!   image corpus
//!
//! ## Example
//!
//! ```rust,no_run
//! use leafscan::{extract_features, InferenceAdapter};
//! use std::path::Path;
//!
//! let adapter = InferenceAdapter::from_model_file(Path::new("model.json"))?;
//! let features = extract_features(Path::new("leaf.jpg"))?;
//! let prediction = adapter.predict_vector(&features);
//! println!("{} ({:.1}%)", prediction.label, prediction.confidence * 100.0);
//! # Ok::<(), leafscan::PipelineError>(())
//! ```

use std::path::Path;

pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod image_loader;
pub mod inference;
pub mod model;
pub mod segmentation;
pub mod training;

pub use classifier::RandomForest;
pub use config::TrainingConfig;
pub use error::{PipelineError, Result};
pub use features::{FeatureExtractor, FeatureVector};
pub use inference::{InferenceAdapter, Prediction};
pub use model::{load_model, save_model, TrainedModel};
pub use segmentation::KMeansSegmenter;
pub use training::{train, TrainingReport};

/// Extract the feature vector for one image file with default parameters
///
/// Convenience wrapper around [`FeatureExtractor`] seeded with
/// [`constants::training::DEFAULT_SEED`], matching the seed the training
/// pipeline uses by default.
///
/// # Errors
///
/// Returns `PipelineError::DecodeError` if the path does not exist or the
/// content is not a recognized raster format.
pub fn extract_features(image_path: &Path) -> Result<FeatureVector> {
    FeatureExtractor::new(constants::training::DEFAULT_SEED).extract_from_path(image_path)
}
