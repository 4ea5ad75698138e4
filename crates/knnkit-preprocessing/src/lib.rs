pub mod preprocessor;
pub mod split;

pub use preprocessor::*;
pub use split::*;
