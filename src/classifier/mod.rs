//! Tree-ensemble classification module
//!
//! Hand-built random forest over feature vectors: bootstrap-resampled CART
//! trees with random feature subsets per split, combined by averaging each
//! tree's leaf class distribution.

pub mod forest;
pub mod tree;

pub use forest::RandomForest;
pub use tree::DecisionTree;
