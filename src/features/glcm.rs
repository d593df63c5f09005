//! Gray-level co-occurrence texture statistics
//!
//! Builds a symmetric, normalized co-occurrence matrix for horizontally
//! adjacent pixel pairs (offset distance 1, angle 0°) over 256 intensity
//! levels, and derives contrast, correlation, and energy from it.

use ndarray::Array2;

use crate::constants::features::GLCM_LEVELS;

/// Correlation denominators below this are treated as degenerate
const VARIANCE_EPSILON: f64 = 1e-12;

/// Texture statistics derived from one co-occurrence matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlcmFeatures {
    /// Sum of squared intensity differences weighted by co-occurrence probability
    pub contrast: f64,
    /// Linear dependency of neighboring intensities, in [-1, 1]
    pub correlation: f64,
    /// Sum of squared co-occurrence probabilities; 1.0 for a uniform image
    pub energy: f64,
}

/// Build the symmetric, normalized co-occurrence matrix for a grayscale buffer
///
/// Pairs are counted at horizontal offset 1; each pair contributes to both
/// `(i, j)` and `(j, i)`. The result sums to 1.0 whenever the image is at
/// least two pixels wide, and is all zeros otherwise.
pub fn cooccurrence_matrix(gray: &[u8], width: usize, height: usize) -> Array2<f64> {
    debug_assert_eq!(gray.len(), width * height);

    let mut matrix = Array2::<f64>::zeros((GLCM_LEVELS, GLCM_LEVELS));
    if width < 2 {
        return matrix;
    }

    for row in 0..height {
        let offset = row * width;
        for col in 0..width - 1 {
            let i = gray[offset + col] as usize;
            let j = gray[offset + col + 1] as usize;
            matrix[[i, j]] += 1.0;
            matrix[[j, i]] += 1.0;
        }
    }

    let total: f64 = matrix.sum();
    if total > 0.0 {
        matrix.mapv_inplace(|v| v / total);
    }
    matrix
}

/// Derive contrast, correlation, and energy from a normalized matrix
///
/// A matrix with zero marginal variance (single gray level) reports a
/// correlation of 1.0 rather than dividing by zero.
pub fn glcm_features(matrix: &Array2<f64>) -> GlcmFeatures {
    let mut contrast = 0.0;
    let mut energy = 0.0;
    for ((i, j), &p) in matrix.indexed_iter() {
        if p == 0.0 {
            continue;
        }
        let diff = i as f64 - j as f64;
        contrast += p * diff * diff;
        energy += p * p;
    }

    // Marginal mean and variance; the matrix is symmetric so the row and
    // column marginals coincide.
    let mut mean = 0.0;
    for (i, row) in matrix.rows().into_iter().enumerate() {
        mean += i as f64 * row.sum();
    }
    let mut variance = 0.0;
    for (i, row) in matrix.rows().into_iter().enumerate() {
        let d = i as f64 - mean;
        variance += d * d * row.sum();
    }

    let correlation = if variance < VARIANCE_EPSILON {
        1.0
    } else {
        let mut cov = 0.0;
        for ((i, j), &p) in matrix.indexed_iter() {
            if p == 0.0 {
                continue;
            }
            cov += p * (i as f64 - mean) * (j as f64 - mean);
        }
        cov / variance
    };

    GlcmFeatures {
        contrast,
        correlation,
        energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_is_normalized_and_symmetric() {
        let gray = vec![0u8, 50, 100, 50, 0, 50, 100, 50, 0];
        let matrix = cooccurrence_matrix(&gray, 3, 3);

        let total: f64 = matrix.sum();
        assert!((total - 1.0).abs() < 1e-12);

        for ((i, j), &p) in matrix.indexed_iter() {
            assert_eq!(p, matrix[[j, i]]);
        }
    }

    #[test]
    fn test_uniform_image_collapses_to_single_entry() {
        let gray = vec![128u8; 16];
        let matrix = cooccurrence_matrix(&gray, 4, 4);
        assert!((matrix[[128, 128]] - 1.0).abs() < 1e-12);

        let features = glcm_features(&matrix);
        assert_eq!(features.contrast, 0.0);
        assert_eq!(features.correlation, 1.0);
        assert!((features.energy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_alternating_stripes_have_high_contrast() {
        // 0/255 checker columns: every horizontal pair differs by 255
        let gray: Vec<u8> = (0..16).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let matrix = cooccurrence_matrix(&gray, 4, 4);

        let features = glcm_features(&matrix);
        assert!((features.contrast - 255.0 * 255.0).abs() < 1e-6);
        assert!((features.correlation - (-1.0)).abs() < 1e-9);
        // Probability mass split evenly across (0,255) and (255,0)
        assert!((features.energy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_column_image_yields_empty_matrix() {
        let gray = vec![10u8, 20, 30];
        let matrix = cooccurrence_matrix(&gray, 1, 3);
        assert_eq!(matrix.sum(), 0.0);

        // No pairs at all: contrast/energy zero, correlation degenerate
        let features = glcm_features(&matrix);
        assert_eq!(features.contrast, 0.0);
        assert_eq!(features.energy, 0.0);
        assert_eq!(features.correlation, 1.0);
    }
}
