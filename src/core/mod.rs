pub mod base_value;
pub mod error;
pub mod value;

pub use base_value::ValueBox;
pub use error::{ModelError, Result};
pub use value::Value;
