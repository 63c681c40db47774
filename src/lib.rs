// ============================================================================
// rustmodel Library
// ============================================================================

//! Typed property descriptors for a document-store model layer.
//!
//! # Examples
//!
//! ```
//! use rustmodel::{Entity, ModelKind, Node, Operator, Value};
//! use rustmodel::property::kinds;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let person = ModelKind::builder("Person")
//!     .property("name", kinds::string().required(true).build()?)
//!     .property("age", kinds::integer().build()?)
//!     .build()?;
//!
//! let mut entity = Entity::new(person.clone());
//! entity.set("name", "Ada")?;
//! entity.set("age", 36i64)?;
//! entity.validate_required()?;
//!
//! let age = person.require_property("age")?;
//! assert_eq!(age.ge(18i64)?, Node::filter("age", Operator::Ge, 18i64));
//! assert_eq!(entity.get("name")?, Value::Text("Ada".into()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod index;
pub mod model;
pub mod prelude;
pub mod property;
pub mod query;

// Re-export main types for convenience
pub use config::ModelConfig;
pub use core::{ModelError, Result, Value, ValueBox};
pub use index::{Direction, Index, IndexProperty, IndexState, IndexStatus};
pub use model::{Entity, ModelKind, ValueContainer};
pub use property::{
    CreationCounter, Layer, MethodCache, Property, PropertyBuilder, PropertyKind, Validator,
};
pub use query::{DisjunctionNode, FilterNode, Node, Operator};
