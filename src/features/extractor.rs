//! Fixed-layout feature vector extraction
//!
//! Converts a segmented leaf image into the 10-value vector consumed by the
//! classifier. Layout, in order:
//!
//! 1. Color (6): mean and population standard deviation for R, G, B
//! 2. Texture (3): GLCM contrast, correlation, energy
//! 3. Shape (1): non-background area ratio
//!
//! Segmentation runs before any statistics so that the color and texture
//! values characterize the dominant foreground region rather than the
//! whole uncontrolled scene.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::features::FEATURE_LEN;
use crate::error::Result;
use crate::features::glcm;
use crate::image_loader;
use crate::segmentation::KMeansSegmenter;

/// Ordered fixed-length feature vector
///
/// The layout is a model constant; vectors produced by different layouts
/// are incompatible with previously trained models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_LEN]);

impl FeatureVector {
    /// Feature values as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of features (always [`FEATURE_LEN`])
    pub fn len(&self) -> usize {
        FEATURE_LEN
    }

    /// Always false; the layout has a fixed non-zero length
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Feature extractor combining segmentation, color, texture, and shape steps
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    segmenter: KMeansSegmenter,
}

impl FeatureExtractor {
    /// Create an extractor whose segmentation restarts use the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            segmenter: KMeansSegmenter::new(seed),
        }
    }

    /// Create an extractor with a preconfigured segmenter
    pub fn with_segmenter(segmenter: KMeansSegmenter) -> Self {
        Self { segmenter }
    }

    /// Load an image file and extract its feature vector
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::DecodeError` if the path is missing or not a
    /// recognized raster format. A returned vector is always fully
    /// populated; there is no partial result.
    pub fn extract_from_path(&self, path: &Path) -> Result<FeatureVector> {
        let image = image_loader::load_normalized(path)?;
        Ok(self.extract(&image))
    }

    /// Extract the feature vector from a decoded image
    ///
    /// The image is normalized to the canonical resolution if needed,
    /// segmented, and reduced to the fixed 10-value layout.
    pub fn extract(&self, image: &RgbImage) -> FeatureVector {
        let normalized = image_loader::normalize(image.clone());
        let segmented = self.segmenter.segment(&normalized);

        let mut values = [0.0f64; FEATURE_LEN];

        let (means, stds) = channel_statistics(&segmented.image);
        for channel in 0..3 {
            values[channel * 2] = means[channel];
            values[channel * 2 + 1] = stds[channel];
        }

        let gray = grayscale_bt601(&segmented.image);
        let width = segmented.image.width() as usize;
        let height = segmented.image.height() as usize;
        let matrix = glcm::cooccurrence_matrix(&gray, width, height);
        let texture = glcm::glcm_features(&matrix);
        values[6] = texture.contrast;
        values[7] = texture.correlation;
        values[8] = texture.energy;

        values[9] = area_ratio(&gray);

        FeatureVector(values)
    }
}

/// Per-channel mean and population standard deviation across the whole image
fn channel_statistics(image: &RgbImage) -> ([f64; 3], [f64; 3]) {
    let pixel_count = (image.width() * image.height()) as f64;

    let mut sums = [0.0f64; 3];
    for pixel in image.pixels() {
        for channel in 0..3 {
            sums[channel] += pixel[channel] as f64;
        }
    }
    let means = [
        sums[0] / pixel_count,
        sums[1] / pixel_count,
        sums[2] / pixel_count,
    ];

    let mut squared = [0.0f64; 3];
    for pixel in image.pixels() {
        for channel in 0..3 {
            let d = pixel[channel] as f64 - means[channel];
            squared[channel] += d * d;
        }
    }
    let stds = [
        (squared[0] / pixel_count).sqrt(),
        (squared[1] / pixel_count).sqrt(),
        (squared[2] / pixel_count).sqrt(),
    ];

    (means, stds)
}

/// Convert to single-channel intensity with BT.601 luma weights
fn grayscale_bt601(image: &RgbImage) -> Vec<u8> {
    image
        .pixels()
        .map(|p| {
            let luma =
                0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
            luma.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// Ratio of non-zero intensity pixels to total pixel count, in [0.0, 1.0]
///
/// An empty buffer reports 0.0 rather than dividing by zero.
fn area_ratio(gray: &[u8]) -> f64 {
    if gray.is_empty() {
        return 0.0;
    }
    let non_zero = gray.iter().filter(|&&v| v != 0).count();
    non_zero as f64 / gray.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_extract_returns_full_vector() {
        let image = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 5 == 0 {
                Rgb([160, 80, 40])
            } else {
                Rgb([30, 150, 60])
            }
        });
        let extractor = FeatureExtractor::new(42);
        let vector = extractor.extract(&image);
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(vector.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_uniform_image_statistics() {
        let image = RgbImage::from_pixel(64, 64, Rgb([120, 200, 40]));
        let extractor = FeatureExtractor::new(42);
        let vector = extractor.extract(&image);
        let v = vector.as_slice();

        // Segmentation of a uniform image is a no-op, so means match the
        // input color and every standard deviation is zero
        assert!((v[0] - 120.0).abs() < 1e-9);
        assert!((v[2] - 200.0).abs() < 1e-9);
        assert!((v[4] - 40.0).abs() < 1e-9);
        assert_eq!(v[1], 0.0);
        assert_eq!(v[3], 0.0);
        assert_eq!(v[5], 0.0);

        // Single-intensity co-occurrence: no contrast, maximum energy
        assert_eq!(v[6], 0.0);
        assert!((v[8] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_ratio_bounds() {
        let black = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        let white = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
        let extractor = FeatureExtractor::new(42);

        let black_vector = extractor.extract(&black);
        let white_vector = extractor.extract(&white);
        assert_eq!(black_vector.as_slice()[9], 0.0);
        assert_eq!(white_vector.as_slice()[9], 1.0);
    }

    #[test]
    fn test_area_ratio_empty_buffer() {
        assert_eq!(area_ratio(&[]), 0.0);
    }

    #[test]
    fn test_grayscale_bt601_weights() {
        let red = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let green = RgbImage::from_pixel(1, 1, Rgb([0, 255, 0]));
        let blue = RgbImage::from_pixel(1, 1, Rgb([0, 0, 255]));
        assert_eq!(grayscale_bt601(&red)[0], 76);
        assert_eq!(grayscale_bt601(&green)[0], 150);
        assert_eq!(grayscale_bt601(&blue)[0], 29);
    }

    #[test]
    fn test_extract_from_missing_path_fails() {
        let extractor = FeatureExtractor::new(42);
        let result = extractor.extract_from_path(Path::new("no_such_leaf.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extraction_deterministic_under_fixed_seed() {
        let image = RgbImage::from_fn(48, 48, |x, y| {
            Rgb([(x * 5) as u8, (y * 3) as u8, ((x + y) * 2) as u8])
        });
        let a = FeatureExtractor::new(11).extract(&image);
        let b = FeatureExtractor::new(11).extract(&image);
        assert_eq!(a, b);
    }
}
