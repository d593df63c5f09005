//! Unsupervised color segmentation module
//!
//! Partitions leaf images into two dominant color regions, used as a
//! coarse disease/background separator ahead of feature extraction.

pub mod kmeans;

pub use kmeans::{KMeansSegmenter, SegmentedImage};
