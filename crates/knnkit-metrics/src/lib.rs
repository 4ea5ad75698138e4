pub mod classification;
pub mod evaluation;

pub use classification::*;
pub use evaluation::*;
