//! K-means color clustering with seeded random restarts
//!
//! Implements pixel-space segmentation that:
//! - Treats each pixel as an independent 3D point in RGB space
//! - Runs Lloyd's algorithm with K=2, bounded iterations, and an epsilon
//!   convergence criterion on centroid shift
//! - Repeats from several random initializations and keeps the attempt
//!   with the lowest within-cluster sum of squared distances
//! - Replaces every pixel with its centroid color to produce the
//!   quantized segmented image

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::segmentation::{
    CLUSTER_COUNT, CONVERGENCE_EPSILON, MAX_ITERATIONS, RESTART_ATTEMPTS,
};

/// Result of segmenting one image
#[derive(Debug, Clone)]
pub struct SegmentedImage {
    /// Image with every pixel replaced by its cluster centroid color
    pub image: RgbImage,
    /// Final cluster centroids in RGB space
    pub centroids: [[f32; 3]; CLUSTER_COUNT],
    /// Per-pixel cluster index, row-major
    pub assignments: Vec<u8>,
    /// Within-cluster sum of squared distances of the winning attempt
    pub inertia: f64,
}

/// Two-cluster color segmenter with deterministic seeded restarts
#[derive(Debug, Clone)]
pub struct KMeansSegmenter {
    max_iterations: usize,
    convergence_epsilon: f32,
    restart_attempts: usize,
    seed: u64,
}

impl KMeansSegmenter {
    /// Create a segmenter with default parameters and the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            convergence_epsilon: CONVERGENCE_EPSILON,
            restart_attempts: RESTART_ATTEMPTS,
            seed,
        }
    }

    /// Create a segmenter with custom parameters
    pub fn with_params(
        max_iterations: usize,
        convergence_epsilon: f32,
        restart_attempts: usize,
        seed: u64,
    ) -> Self {
        Self {
            max_iterations,
            convergence_epsilon,
            restart_attempts,
            seed,
        }
    }

    /// Segment an image into two dominant color regions
    ///
    /// Identical input and seed always produce identical output. The
    /// degenerate all-one-color image collapses both centroids onto the
    /// same color and segmentation becomes a no-op.
    pub fn segment(&self, image: &RgbImage) -> SegmentedImage {
        let pixels: Vec<[f32; 3]> = image
            .pixels()
            .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
            .collect();

        if pixels.is_empty() {
            return SegmentedImage {
                image: image.clone(),
                centroids: [[0.0; 3]; CLUSTER_COUNT],
                assignments: Vec::new(),
                inertia: 0.0,
            };
        }

        let mut rng = StdRng::seed_from_u64(self.seed);

        let (mut centroids, mut assignments, mut inertia) = self.run_attempt(&pixels, &mut rng);
        for _ in 1..self.restart_attempts.max(1) {
            let attempt = self.run_attempt(&pixels, &mut rng);
            if attempt.2 < inertia {
                (centroids, assignments, inertia) = attempt;
            }
        }

        let quantized: [Rgb<u8>; CLUSTER_COUNT] =
            std::array::from_fn(|k| quantize(&centroids[k]));
        let mut segmented = RgbImage::new(image.width(), image.height());
        for (pixel, &cluster) in segmented.pixels_mut().zip(assignments.iter()) {
            *pixel = quantized[cluster as usize];
        }

        SegmentedImage {
            image: segmented,
            centroids,
            assignments,
            inertia,
        }
    }

    /// One full Lloyd run from a fresh random initialization
    fn run_attempt(
        &self,
        pixels: &[[f32; 3]],
        rng: &mut StdRng,
    ) -> ([[f32; 3]; CLUSTER_COUNT], Vec<u8>, f64) {
        // Initialize centroids from existing pixel colors. Duplicate picks
        // are not specially handled; a duplicated centroid simply leaves
        // one cluster empty until the means drift apart.
        let mut centroids = [[0.0f32; 3]; CLUSTER_COUNT];
        for centroid in centroids.iter_mut() {
            *centroid = pixels[rng.gen_range(0..pixels.len())];
        }

        let mut assignments = vec![0u8; pixels.len()];
        for _ in 0..self.max_iterations {
            assign(pixels, &centroids, &mut assignments);

            let mut sums = [[0.0f64; 3]; CLUSTER_COUNT];
            let mut counts = [0usize; CLUSTER_COUNT];
            for (pixel, &cluster) in pixels.iter().zip(assignments.iter()) {
                let sum = &mut sums[cluster as usize];
                sum[0] += pixel[0] as f64;
                sum[1] += pixel[1] as f64;
                sum[2] += pixel[2] as f64;
                counts[cluster as usize] += 1;
            }

            let mut max_shift = 0.0f32;
            for k in 0..CLUSTER_COUNT {
                // An empty cluster keeps its previous centroid
                if counts[k] == 0 {
                    continue;
                }
                let updated = [
                    (sums[k][0] / counts[k] as f64) as f32,
                    (sums[k][1] / counts[k] as f64) as f32,
                    (sums[k][2] / counts[k] as f64) as f32,
                ];
                let shift = distance(&centroids[k], &updated).sqrt();
                max_shift = max_shift.max(shift);
                centroids[k] = updated;
            }

            if max_shift < self.convergence_epsilon {
                break;
            }
        }

        // Final assignment against the converged centroids
        assign(pixels, &centroids, &mut assignments);
        let inertia = pixels
            .iter()
            .zip(assignments.iter())
            .map(|(pixel, &cluster)| distance(pixel, &centroids[cluster as usize]) as f64)
            .sum();

        (centroids, assignments, inertia)
    }
}

/// Assign every pixel to its nearest centroid by squared Euclidean distance
fn assign(pixels: &[[f32; 3]], centroids: &[[f32; 3]; CLUSTER_COUNT], assignments: &mut [u8]) {
    for (pixel, slot) in pixels.iter().zip(assignments.iter_mut()) {
        let mut nearest = 0u8;
        let mut nearest_distance = f32::MAX;
        for (k, centroid) in centroids.iter().enumerate() {
            let d = distance(pixel, centroid);
            if d < nearest_distance {
                nearest_distance = d;
                nearest = k as u8;
            }
        }
        *slot = nearest;
    }
}

/// Squared Euclidean distance in RGB space
fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Round a centroid back to an 8-bit color
fn quantize(centroid: &[f32; 3]) -> Rgb<u8> {
    Rgb([
        centroid[0].round().clamp(0.0, 255.0) as u8,
        centroid[1].round().clamp(0.0, 255.0) as u8,
        centroid[2].round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone_image() -> RgbImage {
        // Left half dark green, right half brown
        RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([20, 120, 30])
            } else {
                Rgb([140, 90, 40])
            }
        })
    }

    #[test]
    fn test_every_pixel_assigned() {
        let segmenter = KMeansSegmenter::new(42);
        let result = segmenter.segment(&two_tone_image());
        assert_eq!(result.assignments.len(), 32 * 32);
        assert!(result
            .assignments
            .iter()
            .all(|&c| (c as usize) < CLUSTER_COUNT));
    }

    #[test]
    fn test_centroids_within_channel_range() {
        let segmenter = KMeansSegmenter::new(42);
        let result = segmenter.segment(&two_tone_image());
        for centroid in &result.centroids {
            for &channel in centroid {
                assert!((0.0..=255.0).contains(&channel));
            }
        }
    }

    #[test]
    fn test_two_tone_image_separates_cleanly() {
        let segmenter = KMeansSegmenter::new(42);
        let result = segmenter.segment(&two_tone_image());

        let left = result.assignments[0];
        let right = result.assignments[31];
        assert_ne!(left, right);

        // Each half should be uniformly assigned
        for y in 0..32u32 {
            for x in 0..32u32 {
                let cluster = result.assignments[(y * 32 + x) as usize];
                if x < 16 {
                    assert_eq!(cluster, left);
                } else {
                    assert_eq!(cluster, right);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let image = two_tone_image();
        let a = KMeansSegmenter::new(7).segment(&image);
        let b = KMeansSegmenter::new(7).segment(&image);
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.image.as_raw(), b.image.as_raw());
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_uniform_image_does_not_crash() {
        let uniform = RgbImage::from_pixel(16, 16, Rgb([77, 77, 77]));
        let segmenter = KMeansSegmenter::new(42);
        let result = segmenter.segment(&uniform);

        // Both centroids collapse onto the single color; segmentation is a no-op
        assert_eq!(result.image.as_raw(), uniform.as_raw());
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_segmented_pixels_are_centroid_colors() {
        let segmenter = KMeansSegmenter::new(42);
        let result = segmenter.segment(&two_tone_image());
        let palette: Vec<Rgb<u8>> = result.centroids.iter().map(quantize).collect();
        for pixel in result.image.pixels() {
            assert!(palette.contains(pixel));
        }
    }
}
