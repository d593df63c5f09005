//! Feature computation module
//!
//! Derives the fixed-length numeric vector consumed by the classifier:
//! color statistics, GLCM texture statistics, and a foreground area ratio.

pub mod extractor;
pub mod glcm;

pub use extractor::{FeatureExtractor, FeatureVector};
pub use glcm::GlcmFeatures;
