pub mod distance;
pub mod knn;

pub use distance::*;
pub use knn::*;
