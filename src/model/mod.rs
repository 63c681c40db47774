//! Model kinds and their entities.
//!
//! Properties are registered on a kind explicitly, through
//! [`ModelKind::builder`]. Registration fixes each property up with its
//! code name and orders the kind's properties by creation counter, which
//! is declaration order.

pub mod entity;

pub use entity::Entity;

use crate::core::{ModelError, Result, Value};
use crate::property::Property;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What the property layer needs from an entity: its value map and
/// whether it is a read-only projection.
pub trait ValueContainer {
    fn values(&self) -> &HashMap<String, Value>;

    fn values_mut(&mut self) -> &mut HashMap<String, Value>;

    fn is_projection(&self) -> bool {
        false
    }
}

pub struct ModelKind {
    name: String,
    properties: Vec<Arc<Property>>,
    by_code_name: HashMap<String, usize>,
}

impl ModelKind {
    pub fn builder(name: impl Into<String>) -> ModelKindBuilder {
        ModelKindBuilder {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Arc<Property>] {
        &self.properties
    }

    pub fn property(&self, code_name: &str) -> Option<&Arc<Property>> {
        self.by_code_name
            .get(code_name)
            .map(|&idx| &self.properties[idx])
    }

    /// Like [`property`](Self::property) but fails with `UnknownProperty`.
    pub fn require_property(&self, code_name: &str) -> Result<&Arc<Property>> {
        self.property(code_name).ok_or_else(|| {
            ModelError::UnknownProperty(code_name.to_string(), self.name.clone())
        })
    }

    pub fn code_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().filter_map(|p| p.code_name())
    }
}

impl fmt::Debug for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelKind")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish()
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|p| format!("{}={}", p.code_name().unwrap_or("?"), p))
            .collect();
        write!(f, "{}<{}>", self.name, props.join(", "))
    }
}

pub struct ModelKindBuilder {
    name: String,
    properties: Vec<(String, Property)>,
}

impl ModelKindBuilder {
    /// Register `property` under the attribute name `code_name`.
    pub fn property(mut self, code_name: impl Into<String>, property: Property) -> Self {
        self.properties.push((code_name.into(), property));
        self
    }

    pub fn build(self) -> Result<Arc<ModelKind>> {
        let mut fixed: Vec<Property> = Vec::with_capacity(self.properties.len());

        for (code_name, mut property) in self.properties {
            property.fix_up(&code_name)?;

            let duplicate = fixed.iter().any(|p| {
                p.code_name() == Some(code_name.as_str()) || p.name() == property.name()
            });
            if duplicate {
                return Err(ModelError::InvalidArgument(format!(
                    "Property '{}' is declared twice on kind '{}'",
                    code_name, self.name
                )));
            }

            trace!(kind = %self.name, property = %code_name, "registered property");
            fixed.push(property);
        }

        fixed.sort_by_key(Property::creation_counter);

        let properties: Vec<Arc<Property>> = fixed.into_iter().map(Arc::new).collect();
        let by_code_name = properties
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.code_name().map(|c| (c.to_string(), idx)))
            .collect();

        debug!(kind = %self.name, properties = properties.len(), "built model kind");

        Ok(Arc::new(ModelKind {
            name: self.name,
            properties,
            by_code_name,
        }))
    }
}
