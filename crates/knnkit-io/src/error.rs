use knnkit_core::KnnError;
use thiserror::Error;

/// Errors raised while reading or writing knnkit files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] KnnError),

    #[error("File is empty: {0}")]
    EmptyFile(String),

    #[error("Malformed file: {0}")]
    Malformed(String),
}

pub type IoResult<T> = Result<T, IoError>;
