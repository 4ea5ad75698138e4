use thiserror::Error;

/// Error type shared by every in-memory knnkit operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KnnError {
    #[error("Index out of bounds: index {index} with size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Empty vector")]
    EmptyVector,

    #[error("Invalid value {value:?} for attribute {attribute}")]
    InvalidValue { attribute: String, value: String },

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Dataset has no attributes")]
    EmptyDataset,

    #[error("Training set has no cases")]
    EmptyTrainingSet,

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type KnnResult<T> = Result<T, KnnError>;
