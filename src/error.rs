//! Error types for the leafscan library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for leafscan operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Comprehensive error types for the feature-extraction and classification pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image file could not be read or decoded
    #[error("Failed to decode image: {message}")]
    DecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A numeric step failed on well-decoded input
    #[error("Feature extraction failed: {message}")]
    ExtractionError { message: String },

    /// Training root missing or contains no class subdirectories
    #[error("Dataset directory error for '{}': {reason}", path.display())]
    DatasetDirectoryError { path: PathBuf, reason: String },

    /// Model artifact missing, corrupt, or incompatible
    #[error("Failed to load model: {message}")]
    ModelLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Model artifact could not be written
    #[error("Failed to save model: {message}")]
    ModelSaveError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic processing error
    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

impl PipelineError {
    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a model load error with context
    pub fn model_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a model save error with context
    pub fn model_save<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelSaveError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error only affects a single image (skippable during bulk training)
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            PipelineError::DecodeError { .. } | PipelineError::ExtractionError { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::DecodeError { .. } => {
                "Could not read the image. Please check the file format and try again.".to_string()
            }
            PipelineError::DatasetDirectoryError { path, .. } => {
                format!(
                    "Dataset folder '{}' is missing or has no class subdirectories.",
                    path.display()
                )
            }
            PipelineError::ModelLoadError { .. } => {
                "Could not load the trained model. Train a model first or check the file path."
                    .to_string()
            }
            PipelineError::ModelSaveError { .. } => {
                "Could not write the model file. Check the output path and permissions.".to_string()
            }
            _ => "Image classification failed. Please try with a different image.".to_string(),
        }
    }
}
