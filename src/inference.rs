//! Inference boundary for consumers of the pipeline
//!
//! Thin adapter over a loaded model: the UI layer (or any caller) hands it
//! an image path or a precomputed feature vector and receives the predicted
//! label, a confidence percentage, and the full per-class distribution. An
//! adapter can only be constructed from a persisted artifact, so inference
//! without a trained model is unrepresentable.

use std::path::Path;

use crate::classifier::RandomForest;
use crate::error::Result;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::model;
use crate::segmentation::KMeansSegmenter;

/// Single classification outcome
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Most probable class label
    pub label: String,
    /// Maximum class probability in [0.0, 1.0]
    pub confidence: f64,
    /// Per-class probabilities, paired with their labels
    pub distribution: Vec<(String, f64)>,
}

/// Loaded-model inference adapter
#[derive(Debug)]
pub struct InferenceAdapter {
    forest: RandomForest,
    extraction_seed: u64,
    extractor: FeatureExtractor,
}

impl InferenceAdapter {
    /// Load a model artifact and build the adapter around it
    ///
    /// The feature extractor is seeded with the extraction seed persisted
    /// in the artifact, so segmentation here matches segmentation during
    /// training.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ModelLoadError` if the artifact is missing,
    /// corrupt, or incompatible.
    pub fn from_model_file(path: &Path) -> Result<Self> {
        let trained = model::load_model(path)?;
        Ok(Self::from_forest(trained.forest, trained.extraction_seed))
    }

    /// Build an adapter around an already-fitted forest
    pub fn from_forest(forest: RandomForest, extraction_seed: u64) -> Self {
        Self {
            forest,
            extraction_seed,
            extractor: FeatureExtractor::with_segmenter(KMeansSegmenter::new(extraction_seed)),
        }
    }

    /// Class labels in distribution order
    pub fn classes(&self) -> &[String] {
        self.forest.classes()
    }

    /// Seed the adapter's feature extractor segments with
    pub fn extraction_seed(&self) -> u64 {
        self.extraction_seed
    }

    /// Classify a precomputed feature vector
    pub fn predict_vector(&self, vector: &FeatureVector) -> Prediction {
        let probabilities = self.forest.predict_proba(vector);

        let mut best = 0;
        for (class, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = class;
            }
        }

        let classes = self.forest.classes();
        Prediction {
            label: classes[best].clone(),
            confidence: probabilities[best],
            distribution: classes
                .iter()
                .cloned()
                .zip(probabilities)
                .collect(),
        }
    }

    /// Extract features from an image file and classify it
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::DecodeError` if the image cannot be read;
    /// the failure is surfaced to the caller, never a crash.
    pub fn predict_image(&self, path: &Path) -> Result<Prediction> {
        let vector = self.extractor.extract_from_path(path)?;
        Ok(self.predict_vector(&vector))
    }
}
