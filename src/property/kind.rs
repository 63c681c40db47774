use crate::core::{Result, Value};
use crate::property::Property;
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

/// Hook that checks or converts a value before it reaches the datastore.
pub const VALIDATE: &str = "_validate";
/// Hook that converts a user value into its base (storable) form.
pub const TO_BASE_TYPE: &str = "_to_base_type";
/// Hook that maps a base value into the form sent to the query layer.
pub const DATASTORE_TYPE: &str = "_datastore_type";

pub const BASE_MODULE: &str = "rustmodel.property";
pub const BASE_KIND_NAME: &str = "Property";

/// A chain step: `Ok(None)` means "no change", `Ok(Some(v))` replaces the
/// carried value.
pub type Hook = Arc<dyn Fn(&Property, &Value) -> Result<Option<Value>> + Send + Sync>;

lazy_static! {
    static ref BASE_KIND: Arc<PropertyKind> = Arc::new(PropertyKind {
        module: BASE_MODULE.to_string(),
        layers: vec![Arc::new(base_layer())],
    });
}

fn base_layer() -> Layer {
    Layer::new(BASE_KIND_NAME).hook(DATASTORE_TYPE, |_, value| match value {
        Value::Base(boxed) => Ok(Some(boxed.wrapped_value().clone())),
        _ => Ok(None),
    })
}

/// The hooks a single kind defines itself, as opposed to inheriting them.
pub struct Layer {
    owner: String,
    hooks: Vec<(String, Hook)>,
}

impl Layer {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            hooks: Vec::new(),
        }
    }

    /// Define (or redefine) a hook on this layer.
    pub fn hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Property, &Value) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        let name = name.into();
        let hook: Hook = Arc::new(hook);
        match self.hooks.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = hook,
            None => self.hooks.push((name, hook)),
        }
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, hook)| hook)
    }

    pub fn defines(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("owner", &self.owner)
            .field("hooks", &self.hook_names().collect::<Vec<_>>())
            .finish()
    }
}

/// A property type: its own layer followed by every ancestor layer, most
/// derived first. The last layer is always the base `Property` layer.
#[derive(Debug)]
pub struct PropertyKind {
    module: String,
    layers: Vec<Arc<Layer>>,
}

impl PropertyKind {
    /// The root kind every other kind derives from.
    pub fn base() -> Arc<PropertyKind> {
        Arc::clone(&BASE_KIND)
    }

    /// Declare a kind that overrides `parent` with the hooks of `layer`.
    ///
    /// `module` plus the layer owner forms the qualified name that keys
    /// the method cache, so it must be unique among kinds in the process.
    pub fn derive(parent: &Arc<PropertyKind>, module: impl Into<String>, layer: Layer) -> Arc<PropertyKind> {
        let mut layers = Vec::with_capacity(parent.layers.len() + 1);
        layers.push(Arc::new(layer));
        layers.extend(parent.layers.iter().cloned());

        Arc::new(Self {
            module: module.into(),
            layers,
        })
    }

    /// Short name of the kind (the owner of its most derived layer).
    pub fn name(&self) -> &str {
        self.layers[0].owner()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name())
    }

    /// Layers, most derived first.
    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    /// Whether `ancestor` appears in this kind's chain (including itself).
    pub fn is_a(&self, ancestor: &PropertyKind) -> bool {
        self.layers.len() >= ancestor.layers.len()
            && self.layers[self.layers.len() - ancestor.layers.len()..]
                .iter()
                .zip(ancestor.layers.iter())
                .all(|(mine, theirs)| Arc::ptr_eq(mine, theirs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_kind() {
        let base = PropertyKind::base();
        assert_eq!(base.name(), "Property");
        assert_eq!(base.qualified_name(), "rustmodel.property.Property");
        assert_eq!(base.layers().len(), 1);
        assert!(base.layers()[0].defines(DATASTORE_TYPE));
        assert!(!base.layers()[0].defines(VALIDATE));
        assert!(Arc::ptr_eq(&base, &PropertyKind::base()));
    }

    #[test]
    fn test_derive_chains_layers() {
        let a = PropertyKind::derive(&PropertyKind::base(), "tests", Layer::new("A"));
        let b = PropertyKind::derive(&a, "tests", Layer::new("B"));

        let owners: Vec<&str> = b.layers().iter().map(|l| l.owner()).collect();
        assert_eq!(owners, vec!["B", "A", "Property"]);
        assert_eq!(b.qualified_name(), "tests.B");
        assert!(b.is_a(&a));
        assert!(b.is_a(&PropertyKind::base()));
        assert!(!a.is_a(&b));
    }

    #[test]
    fn test_layer_redefines_hook() {
        let layer = Layer::new("X")
            .hook(VALIDATE, |_, _| Ok(None))
            .hook(VALIDATE, |_, _| Ok(Some(Value::Integer(1))));
        assert_eq!(layer.hook_names().collect::<Vec<_>>(), vec![VALIDATE]);
    }
}
