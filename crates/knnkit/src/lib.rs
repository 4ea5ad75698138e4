//! # knnkit
//!
//! Weighted k-nearest neighbors classification over tabular data with
//! numeric and categorical columns.
//!
//! ## Modules
//!
//! - **core**: `NumericVector` arithmetic and statistics, the shared `KnnError`
//! - **data**: Attributes, instances and the column-oriented `Dataset`
//! - **preprocessing**: Min-max normalization, z-score standardization, train/test split
//! - **neighbors**: Weighted Euclidean distance and the `KNNClassifier`
//! - **metrics**: Accuracy, confusion matrix, train/test evaluation
//! - **io**: CSV datasets and predictions, JSON config and reports

/// Vectors and errors.
pub use knnkit_core as core;

/// Tabular data model.
pub use knnkit_data as data;

/// Data preprocessing.
pub use knnkit_preprocessing as preprocessing;

/// Nearest neighbors.
pub use knnkit_neighbors as neighbors;

/// Evaluation metrics.
pub use knnkit_metrics as metrics;

/// I/O utilities.
pub use knnkit_io as io;
