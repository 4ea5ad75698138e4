pub mod error;
pub mod csv_io;
pub mod json_io;

pub use error::{IoError, IoResult};
pub use csv_io::*;
pub use json_io::*;
