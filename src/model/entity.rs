use crate::core::{Result, Value};
use crate::model::{ModelKind, ValueContainer};
use std::collections::HashMap;
use std::sync::Arc;

/// An instance of a model kind.
///
/// Values are keyed by stored property name. Validation happens when a
/// value is set, never when it is read back.
#[derive(Debug, Clone)]
pub struct Entity {
    kind: Arc<ModelKind>,
    values: HashMap<String, Value>,
    projection: bool,
}

impl Entity {
    pub fn new(kind: Arc<ModelKind>) -> Self {
        Self {
            kind,
            values: HashMap::new(),
            projection: false,
        }
    }

    /// A read-only view holding only the given `(code_name, value)` pairs,
    /// as returned by a projection query. Values are stored unvalidated.
    pub fn projection<I, S>(kind: Arc<ModelKind>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut entity = Self::new(Arc::clone(&kind));
        for (code_name, value) in values {
            let prop = kind.require_property(code_name.as_ref())?;
            prop.store_value(&mut entity, value)?;
        }
        entity.projection = true;
        Ok(entity)
    }

    pub fn kind(&self) -> &Arc<ModelKind> {
        &self.kind
    }

    pub fn set(&mut self, code_name: &str, value: impl Into<Value>) -> Result<()> {
        let kind = Arc::clone(&self.kind);
        let prop = kind.require_property(code_name)?;
        prop.set_value(self, value)
    }

    /// Current value, falling back to the property's default.
    pub fn get(&self, code_name: &str) -> Result<Value> {
        let prop = self.kind.require_property(code_name)?;
        Ok(prop.get_value(self))
    }

    pub fn has(&self, code_name: &str) -> Result<bool> {
        let prop = self.kind.require_property(code_name)?;
        Ok(prop.has_value(self))
    }

    /// Fail on the first required property without a value.
    pub fn validate_required(&self) -> Result<()> {
        for prop in self.kind.properties() {
            prop.check_required(self)?;
        }
        Ok(())
    }
}

impl ValueContainer for Entity {
    fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    fn values_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.values
    }

    fn is_projection(&self) -> bool {
        self.projection
    }
}
