pub mod value;
pub mod attribute;
pub mod instance;
pub mod dataset;

pub use value::Value;
pub use attribute::{Attribute, Categorical, Quantitative};
pub use instance::Instance;
pub use dataset::Dataset;
