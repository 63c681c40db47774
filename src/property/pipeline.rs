//! The validation pipeline.
//!
//! Chains are resolved through the property's [`MethodCache`] and applied
//! most derived layer first. Every step sees the value produced by the
//! last step that returned `Some`.
//!
//! [`MethodCache`]: crate::property::MethodCache

use crate::core::{ModelError, Result, Value};
use crate::property::kind::{DATASTORE_TYPE, TO_BASE_TYPE, VALIDATE};
use crate::property::resolver::ResolvedMethod;
use crate::property::Property;

impl Property {
    /// Compose `methods` into one callable over a value.
    pub fn apply_list<'a>(&'a self, methods: &'a [ResolvedMethod]) -> impl Fn(Value) -> Result<Value> + 'a {
        move |mut value| {
            for method in methods {
                if let Some(new_value) = (method.hook())(self, &value)? {
                    value = new_value;
                }
            }
            Ok(value)
        }
    }

    /// Run every `_validate` and `_to_base_type` hook along the chain.
    pub fn call_to_base_type(&self, value: Value) -> Result<Value> {
        if value.is_base() {
            return Ok(value);
        }
        let methods = self
            .method_cache()
            .find_methods(self.kind(), &[VALIDATE, TO_BASE_TYPE], false)?;
        self.apply_list(&methods)(value)
    }

    /// Run only the leading `_validate` hooks, stopping at the first layer
    /// that converts to the base type.
    pub fn call_shallow_validation(&self, value: Value) -> Result<Value> {
        let methods = self
            .method_cache()
            .find_methods(self.kind(), &[VALIDATE, TO_BASE_TYPE], false)?;
        let shallow: Vec<ResolvedMethod> = methods
            .iter()
            .take_while(|method| method.name() == VALIDATE)
            .cloned()
            .collect();
        self.apply_list(&shallow)(value)
    }

    /// Map a base value into the form handed to the query layer.
    pub fn datastore_type(&self, value: Value) -> Result<Value> {
        let methods = self
            .method_cache()
            .find_methods(self.kind(), &[DATASTORE_TYPE], false)?;
        self.apply_list(&methods)(value)
    }

    /// Validate a user value: shallow kind validation, then the custom
    /// validator, then the choices constraint. Base values pass through
    /// untouched.
    pub fn do_validate(&self, value: Value) -> Result<Value> {
        if value.is_base() {
            return Ok(value);
        }
        let value = self.call_shallow_validation(value)?;
        self.finish_validation(value)
    }

    /// Like [`do_validate`](Self::do_validate) but runs the full chain,
    /// including base-type conversion.
    pub fn full_validation(&self, value: Value) -> Result<Value> {
        if value.is_base() {
            return Ok(value);
        }
        let value = self.call_to_base_type(value)?;
        self.finish_validation(value)
    }

    fn finish_validation(&self, mut value: Value) -> Result<Value> {
        if let Some(validator) = self.validator() {
            if let Some(new_value) = validator(self, &value)? {
                value = new_value;
            }
        }

        if let Some(choices) = self.choices() {
            if !value.is_null() && !choices.contains(&value) {
                return Err(ModelError::BadValue(format!(
                    "Value {} for property {} is not in the allowed choices",
                    value.repr(),
                    self.name().unwrap_or("<unnamed>")
                )));
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{ModelError, Result, Value, ValueBox};
    use crate::property::{CreationCounter, Layer, MethodCache, Property, PropertyKind, VALIDATE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn isolated_builder(kind: Arc<PropertyKind>) -> crate::property::PropertyBuilder {
        crate::property::PropertyBuilder::new(kind)
            .counter(Arc::new(CreationCounter::new()))
            .cache(Arc::new(MethodCache::new()))
    }

    fn append(tag: &'static str) -> impl Fn(&Property, &Value) -> Result<Option<Value>> + Send + Sync {
        move |_: &Property, value: &Value| {
            let mut items = value.clone().into_list()?;
            items.push(Value::Text(tag.into()));
            Ok(Some(Value::List(items)))
        }
    }

    #[test]
    fn test_apply_list_keeps_value_on_none() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let kind = PropertyKind::derive(
            &PropertyKind::base(),
            "pipeline_tests",
            Layer::new("Steps")
                .hook("one", |_, _| Ok(Some(Value::Integer(1))))
                .hook("two", move |_, value| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(value, &Value::Integer(1));
                    Ok(None)
                })
                .hook("three", |_, value| Ok(Some(Value::Integer(value.as_i64().unwrap_or(0) + 2)))),
        );
        let prop = isolated_builder(kind).name("benji").build().unwrap();

        let methods = prop
            .method_cache()
            .find_methods(prop.kind(), &["one", "two", "three"], false)
            .unwrap();
        let call = prop.apply_list(&methods);
        assert_eq!(call(Value::Text("start".into())).unwrap(), Value::Integer(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_do_validate_base_value_skips_cache() {
        let cache = Arc::new(MethodCache::new());
        let prop = Property::builder()
            .name("foo")
            .cache(Arc::clone(&cache))
            .build()
            .unwrap();
        let value = Value::Base(ValueBox::new(vec![0u8, 1]).unwrap());
        assert_eq!(prop.do_validate(value.clone()).unwrap(), value);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_do_validate_validator_result() {
        let prop = isolated_builder(PropertyKind::base())
            .name("foo")
            .validator(|_, value| Ok(Some(Value::Integer(value.as_i64().unwrap_or(0) * 2))))
            .choices([1i64, 2, 36])
            .build()
            .unwrap();
        assert_eq!(prop.do_validate(Value::Integer(18)).unwrap(), Value::Integer(36));
    }

    #[test]
    fn test_do_validate_validator_none() {
        let prop = isolated_builder(PropertyKind::base())
            .name("foo")
            .validator(|_, _| Ok(None))
            .build()
            .unwrap();
        assert_eq!(prop.do_validate(Value::Integer(18)).unwrap(), Value::Integer(18));
    }

    #[test]
    fn test_do_validate_not_in_choices() {
        let prop = isolated_builder(PropertyKind::base())
            .name("foo")
            .choices([1i64, 2])
            .build()
            .unwrap();
        assert!(matches!(
            prop.do_validate(Value::Integer(18)),
            Err(ModelError::BadValue(_))
        ));
        // NULL is exempt from choices
        assert_eq!(prop.do_validate(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_choices_match_exactly() {
        let prop = isolated_builder(PropertyKind::base())
            .name("ratio")
            .choices([0.0f64])
            .build()
            .unwrap();
        assert_eq!(prop.do_validate(Value::Float(0.0)).unwrap(), Value::Float(0.0));
        assert!(matches!(
            prop.do_validate(Value::Float(1e-20)),
            Err(ModelError::BadValue(_))
        ));

        let big = 1i64 << 53;
        let prop = isolated_builder(PropertyKind::base())
            .name("count")
            .choices([Value::Float(big as f64)])
            .build()
            .unwrap();
        assert!(matches!(
            prop.do_validate(Value::Integer(big + 1)),
            Err(ModelError::BadValue(_))
        ));
    }

    #[test]
    fn test_do_validate_calls_kind_validation() {
        let kind = PropertyKind::derive(
            &PropertyKind::base(),
            "pipeline_tests",
            Layer::new("SimpleProperty").hook(VALIDATE, append("SimpleProperty._validate")),
        );
        let prop = isolated_builder(kind).name("foo").build().unwrap();
        assert_eq!(
            prop.do_validate(Value::List(vec![])).unwrap(),
            Value::List(vec!["SimpleProperty._validate".into()])
        );
    }

    #[test]
    fn test_shallow_validation_without_override() {
        let prop = isolated_builder(PropertyKind::base()).name("plain").build().unwrap();
        assert_eq!(
            prop.call_shallow_validation(Value::Integer(4)).unwrap(),
            Value::Integer(4)
        );
    }

    #[test]
    fn test_datastore_type_unwraps_base_value() {
        let prop = isolated_builder(PropertyKind::base()).name("raw").build().unwrap();
        let boxed = Value::Base(ValueBox::new("x").unwrap());
        assert_eq!(prop.datastore_type(boxed).unwrap(), Value::Text("x".into()));
        assert_eq!(prop.datastore_type(Value::Integer(1)).unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_validator_error_propagates() {
        let prop = isolated_builder(PropertyKind::base())
            .name("strict")
            .validator(|_, _| Err(ModelError::BadValue("nope".into())))
            .build()
            .unwrap();
        assert_eq!(
            prop.full_validation(Value::Integer(1)),
            Err(ModelError::BadValue("nope".into()))
        );
    }
}
