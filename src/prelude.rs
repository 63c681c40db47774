//! Everything needed to declare kinds and work with entities.

pub use crate::core::{ModelError, Result, Value, ValueBox};
pub use crate::model::{Entity, ModelKind, ValueContainer};
pub use crate::property::kinds;
pub use crate::property::{
    Layer, Property, PropertyBuilder, PropertyKind, DATASTORE_TYPE, TO_BASE_TYPE, VALIDATE,
};
pub use crate::query::{Node, Operator};
