//! Model artifact persistence
//!
//! The trained ensemble is written as an explicit, versioned JSON schema:
//! format version, feature length, extraction seed, ordered class labels,
//! and the full tree structures. Loading verifies the version, the feature
//! length, and the structural soundness of every tree so that a corrupt or
//! hollow artifact surfaces `ModelLoadError` instead of producing garbage
//! predictions later. Serialization is byte-for-byte deterministic for a
//! given model.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classifier::{DecisionTree, RandomForest};
use crate::constants::features::FEATURE_LEN;
use crate::constants::training::MODEL_FORMAT_VERSION;
use crate::error::{PipelineError, Result};

/// A persisted-or-loadable trained model
///
/// Couples the fitted forest with the seed its training features were
/// extracted under, so inference segments images exactly the way training
/// did.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub forest: RandomForest,
    /// Seed the feature extractor used during training
    pub extraction_seed: u64,
}

/// On-disk model schema
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    feature_len: usize,
    extraction_seed: u64,
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

/// Persist a trained model to `path`
///
/// # Errors
///
/// Returns `PipelineError::ModelSaveError` if serialization fails or the
/// file cannot be written.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<()> {
    let artifact = ModelArtifact {
        format_version: MODEL_FORMAT_VERSION,
        feature_len: FEATURE_LEN,
        extraction_seed: model.extraction_seed,
        classes: model.forest.classes().to_vec(),
        trees: model.forest.trees().to_vec(),
    };

    let bytes = serde_json::to_vec(&artifact)
        .map_err(|e| PipelineError::model_save("Failed to serialize model", e))?;
    fs::write(path, bytes).map_err(|e| {
        PipelineError::model_save(format!("Failed to write {}", path.display()), e)
    })?;
    Ok(())
}

/// Load a persisted model from `path`
///
/// # Errors
///
/// Returns `PipelineError::ModelLoadError` if the artifact is missing,
/// corrupt, written for a different format version or feature layout, or
/// structurally hollow (no classes, no trees, or tree leaves whose
/// distributions don't match the class count).
pub fn load_model(path: &Path) -> Result<TrainedModel> {
    let bytes = fs::read(path).map_err(|e| {
        PipelineError::model_load(format!("Failed to read {}", path.display()), e)
    })?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::model_load("Model artifact is corrupt", e))?;

    if artifact.format_version != MODEL_FORMAT_VERSION {
        return Err(load_error(format!(
            "Unsupported model format version {} (expected {})",
            artifact.format_version, MODEL_FORMAT_VERSION
        )));
    }
    if artifact.feature_len != FEATURE_LEN {
        return Err(load_error(format!(
            "Model expects {} features but this build produces {}",
            artifact.feature_len, FEATURE_LEN
        )));
    }
    if artifact.classes.is_empty() {
        return Err(load_error("Model artifact has no class labels"));
    }
    if artifact.trees.is_empty() {
        return Err(load_error("Model artifact has no trees"));
    }
    if let Some(index) = artifact
        .trees
        .iter()
        .position(|tree| !tree.is_consistent_with(artifact.classes.len()))
    {
        return Err(load_error(format!(
            "Model artifact tree {} is inconsistent with {} classes",
            index,
            artifact.classes.len()
        )));
    }

    Ok(TrainedModel {
        forest: RandomForest::from_parts(artifact.classes, artifact.trees),
        extraction_seed: artifact.extraction_seed,
    })
}

fn load_error(message: impl Into<String>) -> PipelineError {
    PipelineError::ModelLoadError {
        message: message.into(),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    fn fitted_model() -> TrainedModel {
        let vectors: Vec<FeatureVector> = (0..30)
            .map(|i| {
                let mut values = [0.0; FEATURE_LEN];
                values[0] = i as f64;
                values[5] = (i % 4) as f64;
                FeatureVector(values)
            })
            .collect();
        let labels: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let classes = vec!["rust".into(), "scab".into(), "healthy".into()];
        TrainedModel {
            forest: RandomForest::fit(&vectors, &labels, classes, 15, 42),
            extraction_seed: 42,
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("leafscan_model_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_round_trip_preserves_predictions_and_seed() {
        let model = fitted_model();
        let path = temp_path("round_trip.json");
        save_model(&model, &path).unwrap();
        let restored = load_model(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(restored.forest.classes(), model.forest.classes());
        assert_eq!(restored.extraction_seed, model.extraction_seed);
        for i in 0..30 {
            let mut values = [0.0; FEATURE_LEN];
            values[0] = i as f64 + 0.5;
            let sample = FeatureVector(values);
            assert_eq!(
                model.forest.predict_proba(&sample),
                restored.forest.predict_proba(&sample)
            );
        }
    }

    #[test]
    fn test_save_is_deterministic() {
        let model = fitted_model();
        let first = temp_path("bytes_a.json");
        let second = temp_path("bytes_b.json");
        save_model(&model, &first).unwrap();
        save_model(&model, &second).unwrap();
        let a = fs::read(&first).unwrap();
        let b = fs::read(&second).unwrap();
        fs::remove_file(&first).ok();
        fs::remove_file(&second).ok();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let result = load_model(Path::new("no_such_model.json"));
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }

    #[test]
    fn test_load_corrupt_artifact_fails() {
        let path = temp_path("corrupt.json");
        fs::write(&path, b"{not json").unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }

    #[test]
    fn test_load_version_mismatch_fails() {
        let model = fitted_model();
        let path = temp_path("version.json");
        save_model(&model, &path).unwrap();
        let mut text = fs::read_to_string(&path).unwrap();
        text = text.replacen(
            "\"format_version\":1",
            "\"format_version\":999",
            1,
        );
        fs::write(&path, text).unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }

    #[test]
    fn test_load_artifact_without_trees_fails() {
        // Well-formed JSON but nothing to predict with; accepting it would
        // average over zero trees and every probability would be NaN
        let path = temp_path("no_trees.json");
        fs::write(
            &path,
            br#"{"format_version":1,"feature_len":10,"extraction_seed":42,"classes":["healthy","blight"],"trees":[]}"#,
        )
        .unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }

    #[test]
    fn test_load_artifact_without_classes_fails() {
        let model = fitted_model();
        let path = temp_path("no_classes.json");
        save_model(&model, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let text = text.replacen(
            r#""classes":["rust","scab","healthy"]"#,
            r#""classes":[]"#,
            1,
        );
        fs::write(&path, text).unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }

    #[test]
    fn test_load_artifact_with_mismatched_leaf_width_fails() {
        // A single-node tree whose leaf carries one probability for a
        // two-class label set
        let path = temp_path("leaf_width.json");
        fs::write(
            &path,
            br#"{"format_version":1,"feature_len":10,"extraction_seed":42,"classes":["healthy","blight"],"trees":[{"nodes":[{"Leaf":{"probabilities":[1.0]}}]}]}"#,
        )
        .unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PipelineError::ModelLoadError { .. })));
    }
}
