//! Offline training pipeline
//!
//! Walks a labeled image corpus (`root/<class_name>/<image_file>`), extracts
//! a feature vector per image, fits the tree ensemble on a seeded 80/20
//! split, evaluates it on the held-out partition, and persists the model
//! artifact. Per-image extraction failures are logged and skipped so one bad
//! file never aborts a long run; dataset-level problems abort before any
//! partial model is written.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::classifier::RandomForest;
use crate::config::TrainingConfig;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::image_loader;
use crate::model;
use crate::segmentation::KMeansSegmenter;

/// Precision/recall/F1 for one class on the held-out partition
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Outcome of a full training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Discovered class labels, in model probability order
    pub classes: Vec<String>,
    /// Feature vectors successfully extracted
    pub sample_count: usize,
    /// Images skipped due to per-image failures
    pub skipped_count: usize,
    pub train_count: usize,
    pub test_count: usize,
    /// Overall held-out accuracy in [0.0, 1.0]
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
}

impl TrainingReport {
    /// Render the human-readable evaluation report
    pub fn format(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Classes: {}", self.classes.join(", "));
        let _ = writeln!(
            out,
            "Samples: {} ({} train / {} test, {} skipped)",
            self.sample_count, self.train_count, self.test_count, self.skipped_count
        );
        let _ = writeln!(out, "Accuracy: {:.2}%", self.accuracy * 100.0);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<30} {:>9} {:>9} {:>9} {:>9}",
            "class", "precision", "recall", "f1-score", "support"
        );
        for metrics in &self.per_class {
            let _ = writeln!(
                out,
                "{:<30} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                metrics.label, metrics.precision, metrics.recall, metrics.f1, metrics.support
            );
        }
        out
    }
}

/// Run the full training pipeline described by `config`
///
/// # Errors
///
/// Returns `PipelineError::DatasetDirectoryError` if the dataset root is
/// missing or has no class subdirectories, `ProcessingError` if too few
/// images survive extraction, and `ModelSaveError` if the artifact cannot
/// be written. Per-image decode failures are skipped, not propagated.
pub fn train(config: &TrainingConfig) -> Result<TrainingReport> {
    let classes = discover_classes(&config.dataset_dir)?;
    info!(classes = ?classes, "discovered classes");

    let segmenter = KMeansSegmenter::with_params(
        config.segmentation.max_iterations,
        config.segmentation.convergence_epsilon,
        config.segmentation.restart_attempts,
        config.seed,
    );
    let extractor = FeatureExtractor::with_segmenter(segmenter);

    let mut vectors: Vec<FeatureVector> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut skipped_count = 0usize;
    for (class_index, class_name) in classes.iter().enumerate() {
        let class_dir = config.dataset_dir.join(class_name);
        let files = image_files(&class_dir);
        info!(class = %class_name, files = files.len(), "extracting features");

        for path in files {
            match extractor.extract_from_path(&path) {
                Ok(vector) => {
                    vectors.push(vector);
                    labels.push(class_index);
                }
                Err(error) if error.is_per_image() => {
                    warn!(path = %path.display(), %error, "skipping image");
                    skipped_count += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    let sample_count = vectors.len();
    if sample_count < 2 {
        return Err(PipelineError::ProcessingError {
            message: format!(
                "Need at least 2 usable images to train, found {}",
                sample_count
            ),
        });
    }
    info!(samples = sample_count, skipped = skipped_count, "extraction complete");

    let (train_indices, test_indices) = split(sample_count, config.test_fraction, config.seed);

    let train_vectors: Vec<FeatureVector> =
        train_indices.iter().map(|&i| vectors[i].clone()).collect();
    let train_labels: Vec<usize> = train_indices.iter().map(|&i| labels[i]).collect();

    info!(
        trees = config.ensemble.tree_count,
        train = train_vectors.len(),
        "fitting random forest"
    );
    let forest = RandomForest::fit(
        &train_vectors,
        &train_labels,
        classes.clone(),
        config.ensemble.tree_count,
        config.seed,
    );

    let (accuracy, per_class) = evaluate(&forest, &vectors, &labels, &test_indices, &classes);

    let trained = model::TrainedModel {
        forest,
        extraction_seed: config.seed,
    };
    model::save_model(&trained, &config.model_path)?;
    info!(path = %config.model_path.display(), "model saved");

    Ok(TrainingReport {
        classes,
        sample_count,
        skipped_count,
        train_count: train_indices.len(),
        test_count: test_indices.len(),
        accuracy,
        per_class,
    })
}

/// Enumerate class subdirectories of the dataset root, sorted by name
fn discover_classes(dataset_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dataset_dir).map_err(|e| PipelineError::DatasetDirectoryError {
        path: dataset_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut classes: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();

    if classes.is_empty() {
        return Err(PipelineError::DatasetDirectoryError {
            path: dataset_dir.to_path_buf(),
            reason: "no class subdirectories found".to_string(),
        });
    }

    // Directory enumeration order is filesystem-dependent; sort for
    // reproducible class indices and model bytes
    classes.sort();
    Ok(classes)
}

/// Collect supported image files under a class directory, sorted by path
fn image_files(class_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(class_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(image_loader::is_supported_extension)
        })
        .collect()
}

/// Seeded shuffle split into train and test index sets (non-stratified)
fn split(sample_count: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..sample_count).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // Ceiling keeps the test partition non-empty for any usable dataset
    let test_count = ((sample_count as f64 * test_fraction).ceil() as usize)
        .clamp(1, sample_count - 1);
    let test_indices = indices.split_off(sample_count - test_count);
    (indices, test_indices)
}

/// Held-out accuracy plus per-class precision/recall/F1
fn evaluate(
    forest: &RandomForest,
    vectors: &[FeatureVector],
    labels: &[usize],
    test_indices: &[usize],
    classes: &[String],
) -> (f64, Vec<ClassMetrics>) {
    let class_count = classes.len();
    let mut true_positive = vec![0usize; class_count];
    let mut false_positive = vec![0usize; class_count];
    let mut false_negative = vec![0usize; class_count];
    let mut correct = 0usize;

    for &i in test_indices {
        let probabilities = forest.predict_proba(&vectors[i]);
        let mut predicted = 0;
        for (class, &p) in probabilities.iter().enumerate() {
            if p > probabilities[predicted] {
                predicted = class;
            }
        }

        let actual = labels[i];
        if predicted == actual {
            correct += 1;
            true_positive[actual] += 1;
        } else {
            false_positive[predicted] += 1;
            false_negative[actual] += 1;
        }
    }

    let accuracy = if test_indices.is_empty() {
        0.0
    } else {
        correct as f64 / test_indices.len() as f64
    };

    let per_class = classes
        .iter()
        .enumerate()
        .map(|(class, label)| {
            let tp = true_positive[class] as f64;
            let fp = false_positive[class] as f64;
            let fn_ = false_negative[class] as f64;
            let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support: true_positive[class] + false_negative[class],
            }
        })
        .collect();

    (accuracy, per_class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let (train_a, test_a) = split(100, 0.2, 42);
        let (train_b, test_b) = split(100, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        assert_eq!(train_a.len(), 80);
        assert_eq!(test_a.len(), 20);
        for i in &test_a {
            assert!(!train_a.contains(i));
        }
    }

    #[test]
    fn test_split_never_empties_either_partition() {
        let (train, test) = split(2, 0.2, 42);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);

        let (train, test) = split(5, 0.9, 42);
        assert!(!train.is_empty());
        assert!(!test.is_empty());
    }

    #[test]
    fn test_discover_classes_missing_root() {
        let result = discover_classes(Path::new("no_such_dataset_root"));
        assert!(matches!(
            result,
            Err(PipelineError::DatasetDirectoryError { .. })
        ));
    }

    #[test]
    fn test_report_format_contains_metrics() {
        let report = TrainingReport {
            classes: vec!["blight".into(), "healthy".into()],
            sample_count: 50,
            skipped_count: 2,
            train_count: 40,
            test_count: 10,
            accuracy: 0.9,
            per_class: vec![
                ClassMetrics {
                    label: "blight".into(),
                    precision: 1.0,
                    recall: 0.8,
                    f1: 0.89,
                    support: 5,
                },
                ClassMetrics {
                    label: "healthy".into(),
                    precision: 0.83,
                    recall: 1.0,
                    f1: 0.91,
                    support: 5,
                },
            ],
        };
        let text = report.format();
        assert!(text.contains("Accuracy: 90.00%"));
        assert!(text.contains("blight"));
        assert!(text.contains("precision"));
        assert!(text.contains("support"));
    }
}
