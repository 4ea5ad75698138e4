pub mod error;
pub mod vector;

pub use error::{KnnError, KnnResult};
pub use vector::NumericVector;
