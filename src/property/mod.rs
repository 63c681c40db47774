//! Property descriptors.
//!
//! A [`Property`] declares one named, typed attribute of a model kind: its
//! flags, its validation rules and the key it is stored under. Behaviour
//! that varies by property type lives in the hooks of its
//! [`PropertyKind`] and runs through the validation pipeline.

pub mod counter;
pub mod kind;
pub mod kinds;
pub mod pipeline;
pub mod resolver;

pub use counter::CreationCounter;
pub use kind::{Hook, Layer, PropertyKind, DATASTORE_TYPE, TO_BASE_TYPE, VALIDATE};
pub use resolver::{MethodCache, MethodList, ResolvedMethod};

use crate::config::ModelConfig;
use crate::core::{ModelError, Result, Value};
use crate::model::ValueContainer;
use crate::query::{FilterNode, Node, Operator};
use std::fmt;
use std::sync::Arc;

/// User-supplied validator, run after the kind's own validation.
/// Returning `Ok(None)` keeps the value unchanged.
pub type Validator = Arc<dyn Fn(&Property, &Value) -> Result<Option<Value>> + Send + Sync>;

pub struct Property {
    name: Option<String>,
    code_name: Option<String>,
    indexed: bool,
    repeated: bool,
    required: bool,
    default: Option<Value>,
    choices: Option<Vec<Value>>,
    validator: Option<Validator>,
    verbose_name: Option<String>,
    write_empty_list: bool,
    creation_counter: u64,
    kind: Arc<PropertyKind>,
    cache: Arc<MethodCache>,
    config: Arc<ModelConfig>,
}

impl Property {
    /// Start declaring a plain `Property`.
    pub fn builder() -> PropertyBuilder {
        PropertyBuilder::new(PropertyKind::base())
    }

    /// A plain, indexed `Property` with the given name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::builder().name(name).build()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn code_name(&self) -> Option<&str> {
        self.code_name.as_deref()
    }

    pub fn indexed(&self) -> bool {
        self.indexed
    }

    pub fn repeated(&self) -> bool {
        self.repeated
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn choices(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn verbose_name(&self) -> Option<&str> {
        self.verbose_name.as_deref()
    }

    pub fn write_empty_list(&self) -> bool {
        self.write_empty_list
    }

    pub fn creation_counter(&self) -> u64 {
        self.creation_counter
    }

    pub fn kind(&self) -> &Arc<PropertyKind> {
        &self.kind
    }

    pub fn method_cache(&self) -> &Arc<MethodCache> {
        &self.cache
    }

    /// Bind the property to the attribute it was declared as.
    ///
    /// Called once, by model registration. Unnamed properties take the
    /// code name as their stored name.
    pub fn fix_up(&mut self, code_name: &str) -> Result<()> {
        if self.name.is_none() {
            self.config.check_name(code_name)?;
            self.name = Some(code_name.to_string());
        }
        self.code_name = Some(code_name.to_string());
        Ok(())
    }

    fn storage_key(&self) -> Result<&str> {
        self.name.as_deref().ok_or_else(|| {
            ModelError::InvalidArgument(
                "Property has no name; register it on a model kind first".into(),
            )
        })
    }

    fn label(&self) -> &str {
        self.code_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
    }

    /// Build a filter node comparing this property with `value`.
    pub fn comparison(&self, op: Operator, value: impl Into<Value>) -> Result<Node> {
        if !self.indexed {
            return Err(ModelError::BadFilter(format!(
                "Cannot query for unindexed property {}",
                self.label()
            )));
        }

        let value = self.to_filter_value(value.into())?;
        Ok(Node::filter(self.storage_key()?.as_bytes(), op, value))
    }

    pub fn eq(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Eq, value)
    }

    pub fn ne(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Ne, value)
    }

    pub fn lt(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Lt, value)
    }

    pub fn le(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Le, value)
    }

    pub fn gt(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Gt, value)
    }

    pub fn ge(&self, value: impl Into<Value>) -> Result<Node> {
        self.comparison(Operator::Ge, value)
    }

    /// Membership test: one equality condition per element, OR-ed together
    /// in input order (duplicates and nulls kept).
    pub fn in_(&self, values: impl Into<Value>) -> Result<Node> {
        if !self.indexed {
            return Err(ModelError::BadFilter(format!(
                "Cannot query for unindexed property {}",
                self.label()
            )));
        }

        let values = match values.into() {
            Value::List(items) => items,
            other => {
                return Err(ModelError::BadArgument(format!(
                    "Expected list, got {}",
                    other.repr()
                )));
            }
        };

        let name = self.storage_key()?.as_bytes();
        let mut nodes = Vec::with_capacity(values.len());
        for value in values {
            let value = self.to_filter_value(value)?;
            nodes.push(FilterNode::new(name, Operator::Eq, value));
        }

        Ok(Node::disjunction(nodes))
    }

    fn to_filter_value(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        let value = self.do_validate(value)?;
        let value = self.call_to_base_type(value)?;
        self.datastore_type(value)
    }

    /// Raw write into the container; no validation.
    pub fn store_value<C: ValueContainer + ?Sized>(&self, entity: &mut C, value: Value) -> Result<()> {
        let key = self.storage_key()?.to_string();
        entity.values_mut().insert(key, value);
        Ok(())
    }

    /// Validate and store a user-supplied value.
    pub fn set_value<C: ValueContainer + ?Sized>(&self, entity: &mut C, value: impl Into<Value>) -> Result<()> {
        if entity.is_projection() {
            return Err(ModelError::ReadOnlyProperty(self.label().to_string()));
        }

        let value = value.into();
        let value = if self.repeated {
            let items = match value {
                Value::List(items) => items,
                other => {
                    return Err(ModelError::BadValue(format!(
                        "Expected list for repeated property {}, got {}",
                        self.label(),
                        other.repr()
                    )));
                }
            };
            let validated = items
                .into_iter()
                .map(|item| self.do_validate(item))
                .collect::<Result<Vec<_>>>()?;
            Value::List(validated)
        } else if value.is_null() {
            value
        } else {
            self.do_validate(value)?
        };

        self.store_value(entity, value)
    }

    pub fn has_value<C: ValueContainer + ?Sized>(&self, entity: &C) -> bool {
        self.name
            .as_deref()
            .is_some_and(|key| entity.values().contains_key(key))
    }

    /// Stored value, or `default` when nothing is stored.
    pub fn retrieve_value<C: ValueContainer + ?Sized>(&self, entity: &C, default: Option<Value>) -> Option<Value> {
        self.name
            .as_deref()
            .and_then(|key| entity.values().get(key))
            .cloned()
            .or(default)
    }

    /// Stored value, falling back to the declared default; unset repeated
    /// properties read as an empty list.
    pub fn get_value<C: ValueContainer + ?Sized>(&self, entity: &C) -> Value {
        match self.retrieve_value(entity, None) {
            Some(value) => value,
            None if self.repeated => Value::List(Vec::new()),
            None => self.default.clone().unwrap_or(Value::Null),
        }
    }

    /// Fail when a required property holds no value.
    pub fn check_required<C: ValueContainer + ?Sized>(&self, entity: &C) -> Result<()> {
        if self.required && self.get_value(entity).is_null() {
            return Err(ModelError::BadValue(format!(
                "Entity has uninitialized properties: {}",
                self.label()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args: Vec<String> = Vec::new();

        if let Some(name) = &self.name {
            args.push(format!("b'{}'", name.as_bytes().escape_ascii()));
        }
        if !self.indexed {
            args.push("indexed=False".into());
        }
        if self.repeated {
            args.push("repeated=True".into());
        }
        if self.required {
            args.push("required=True".into());
        }
        if let Some(default) = &self.default {
            args.push(format!("default={}", default.repr()));
        }
        if let Some(choices) = &self.choices {
            let parts: Vec<String> = choices.iter().map(Value::repr).collect();
            args.push(format!("choices={{{}}}", parts.join(", ")));
        }
        if self.validator.is_some() {
            args.push("validator=<validator>".into());
        }
        if let Some(verbose_name) = &self.verbose_name {
            args.push(format!("verbose_name='{}'", verbose_name));
        }
        if self.write_empty_list {
            args.push("write_empty_list=True".into());
        }

        write!(f, "{}({})", self.kind.name(), args.join(", "))
    }
}

/// Builder for [`Property`].
///
/// `build` checks the declaration and only then draws a creation counter
/// value, so rejected declarations leave the counter untouched.
pub struct PropertyBuilder {
    kind: Arc<PropertyKind>,
    name: Option<String>,
    indexed: bool,
    repeated: bool,
    required: bool,
    default: Option<Value>,
    choices: Option<Vec<Value>>,
    validator: Option<Validator>,
    verbose_name: Option<String>,
    write_empty_list: bool,
    counter: Option<Arc<CreationCounter>>,
    cache: Option<Arc<MethodCache>>,
    config: Option<Arc<ModelConfig>>,
}

impl PropertyBuilder {
    pub fn new(kind: Arc<PropertyKind>) -> Self {
        Self {
            kind,
            name: None,
            indexed: true,
            repeated: false,
            required: false,
            default: None,
            choices: None,
            validator: None,
            verbose_name: None,
            write_empty_list: false,
            counter: None,
            cache: None,
            config: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn repeated(mut self, repeated: bool) -> Self {
        self.repeated = repeated;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// A `NULL` default is the same as no default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = if value.is_null() { None } else { Some(value) };
        self
    }

    /// Allowed values. Duplicates collapse; first-seen order is kept.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut unique: Vec<Value> = Vec::new();
        for choice in choices {
            let choice = choice.into();
            if !unique.contains(&choice) {
                unique.push(choice);
            }
        }
        self.choices = Some(unique);
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Property, &Value) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    pub fn write_empty_list(mut self, write_empty_list: bool) -> Self {
        self.write_empty_list = write_empty_list;
        self
    }

    /// Draw creation order from `counter` instead of the global one.
    pub fn counter(mut self, counter: Arc<CreationCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Memoize method chains in `cache` instead of the global one.
    pub fn cache(mut self, cache: Arc<MethodCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(mut self, config: Arc<ModelConfig>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Property> {
        let config = self
            .config
            .unwrap_or_else(|| Arc::clone(ModelConfig::global()));

        if let Some(name) = &self.name {
            config.check_name(name)?;
        }

        if self.repeated && self.required {
            return Err(ModelError::InvalidArgument(
                "repeated is incompatible with required".into(),
            ));
        }

        if self.repeated && self.default.is_some() {
            return Err(ModelError::InvalidArgument(
                "repeated is incompatible with default".into(),
            ));
        }

        let counter = self
            .counter
            .unwrap_or_else(|| Arc::clone(CreationCounter::global()));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::clone(MethodCache::global()));

        Ok(Property {
            name: self.name,
            code_name: None,
            indexed: self.indexed,
            repeated: self.repeated,
            required: self.required,
            default: self.default,
            choices: self.choices,
            validator: self.validator,
            verbose_name: self.verbose_name,
            write_empty_list: self.write_empty_list,
            creation_counter: counter.next(),
            kind: self.kind,
            cache,
            config,
        })
    }
}
