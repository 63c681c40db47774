//! Standard typed property kinds.

use crate::core::{ModelError, Result, Value};
use crate::property::kind::{BASE_MODULE, Layer, PropertyKind, VALIDATE};
use crate::property::{Property, PropertyBuilder};
use lazy_static::lazy_static;
use std::sync::Arc;

/// Longest value an indexed string may hold, in bytes.
pub const MAX_STRING_LENGTH: usize = 1500;

lazy_static! {
    static ref BOOLEAN: Arc<PropertyKind> = PropertyKind::derive(
        &PropertyKind::base(),
        BASE_MODULE,
        Layer::new("BooleanProperty").hook(VALIDATE, |prop, value| match value {
            Value::Boolean(_) => Ok(None),
            other => Err(type_error(prop, "bool", other)),
        }),
    );

    static ref INTEGER: Arc<PropertyKind> = PropertyKind::derive(
        &PropertyKind::base(),
        BASE_MODULE,
        Layer::new("IntegerProperty").hook(VALIDATE, |prop, value| match value {
            Value::Integer(_) => Ok(None),
            other => Err(type_error(prop, "integer", other)),
        }),
    );

    static ref FLOAT: Arc<PropertyKind> = PropertyKind::derive(
        &PropertyKind::base(),
        BASE_MODULE,
        Layer::new("FloatProperty").hook(VALIDATE, |prop, value| match value {
            Value::Float(_) => Ok(None),
            Value::Integer(i) => Ok(Some(Value::Float(*i as f64))),
            other => Err(type_error(prop, "float", other)),
        }),
    );

    static ref BLOB: Arc<PropertyKind> = PropertyKind::derive(
        &PropertyKind::base(),
        BASE_MODULE,
        Layer::new("BlobProperty").hook(VALIDATE, |prop, value| match value {
            Value::Bytes(_) => Ok(None),
            other => Err(type_error(prop, "bytes", other)),
        }),
    );

    static ref TEXT: Arc<PropertyKind> = PropertyKind::derive(
        &PropertyKind::base(),
        BASE_MODULE,
        Layer::new("TextProperty").hook(VALIDATE, |prop, value| match value {
            Value::Text(_) => Ok(None),
            Value::Bytes(raw) => match std::str::from_utf8(raw) {
                Ok(text) => Ok(Some(Value::Text(text.to_string()))),
                Err(_) => Err(ModelError::BadValue(format!(
                    "Expected valid UTF-8 for property {}",
                    prop.name().unwrap_or("<unnamed>")
                ))),
            },
            other => Err(type_error(prop, "string", other)),
        }),
    );

    static ref STRING: Arc<PropertyKind> = PropertyKind::derive(
        &TEXT,
        BASE_MODULE,
        Layer::new("StringProperty").hook(VALIDATE, |prop, value| {
            // runs before the text layer decodes bytes, so both forms are measured
            let len = match value {
                Value::Text(text) => text.len(),
                Value::Bytes(raw) => raw.len(),
                _ => return Ok(None),
            };
            if prop.indexed() && len > MAX_STRING_LENGTH {
                return Err(ModelError::BadValue(format!(
                    "Indexed value {} must be at most {} bytes",
                    prop.name().unwrap_or("<unnamed>"),
                    MAX_STRING_LENGTH
                )));
            }
            Ok(None)
        }),
    );
}

fn type_error(prop: &Property, expected: &str, got: &Value) -> ModelError {
    ModelError::BadValue(format!(
        "Expected {} for property {}, got {}",
        expected,
        prop.name().unwrap_or("<unnamed>"),
        got.repr()
    ))
}

pub fn boolean_kind() -> Arc<PropertyKind> {
    Arc::clone(&BOOLEAN)
}

pub fn integer_kind() -> Arc<PropertyKind> {
    Arc::clone(&INTEGER)
}

pub fn float_kind() -> Arc<PropertyKind> {
    Arc::clone(&FLOAT)
}

pub fn blob_kind() -> Arc<PropertyKind> {
    Arc::clone(&BLOB)
}

pub fn text_kind() -> Arc<PropertyKind> {
    Arc::clone(&TEXT)
}

pub fn string_kind() -> Arc<PropertyKind> {
    Arc::clone(&STRING)
}

pub fn boolean() -> PropertyBuilder {
    PropertyBuilder::new(boolean_kind())
}

pub fn integer() -> PropertyBuilder {
    PropertyBuilder::new(integer_kind())
}

/// Integers assigned to a float property are stored as floats.
pub fn float() -> PropertyBuilder {
    PropertyBuilder::new(float_kind())
}

/// Blobs are unindexed unless asked otherwise.
pub fn blob() -> PropertyBuilder {
    PropertyBuilder::new(blob_kind()).indexed(false)
}

/// Long text; unindexed unless asked otherwise. UTF-8 bytes are decoded.
pub fn text() -> PropertyBuilder {
    PropertyBuilder::new(text_kind()).indexed(false)
}

/// Short, indexed text capped at [`MAX_STRING_LENGTH`] bytes.
pub fn string() -> PropertyBuilder {
    PropertyBuilder::new(string_kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{CreationCounter, MethodCache};

    fn build(builder: PropertyBuilder, name: &str) -> Property {
        builder
            .name(name)
            .counter(Arc::new(CreationCounter::new()))
            .cache(Arc::new(MethodCache::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_boolean() {
        let prop = build(boolean(), "flag");
        assert_eq!(prop.do_validate(Value::Boolean(true)).unwrap(), Value::Boolean(true));
        assert!(matches!(prop.do_validate(Value::Integer(1)), Err(ModelError::BadValue(_))));
    }

    #[test]
    fn test_integer() {
        let prop = build(integer(), "count");
        assert_eq!(prop.do_validate(Value::Integer(7)).unwrap(), Value::Integer(7));
        assert!(prop.do_validate(Value::Float(7.5)).is_err());
        assert!(prop.do_validate(Value::Text("7".into())).is_err());
    }

    #[test]
    fn test_float_coerces_integers() {
        let prop = build(float(), "ratio");
        let coerced = prop.do_validate(Value::Integer(3)).unwrap();
        assert!(matches!(coerced, Value::Float(f) if f == 3.0));
        assert!(prop.do_validate(Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_text_decodes_bytes() {
        let prop = build(text(), "body");
        assert!(!prop.indexed());
        assert_eq!(
            prop.do_validate(Value::Bytes(b"caf\xc3\xa9".to_vec())).unwrap(),
            Value::Text("café".into())
        );
        assert!(prop.do_validate(Value::Bytes(vec![0xff, 0xfe])).is_err());
    }

    #[test]
    fn test_string_chain() {
        let prop = build(string(), "title");
        assert!(prop.indexed());
        assert!(prop.kind().is_a(&text_kind()));

        let methods = prop
            .method_cache()
            .find_methods(prop.kind(), &[VALIDATE], false)
            .unwrap();
        let owners: Vec<&str> = methods.iter().map(|m| m.owner()).collect();
        assert_eq!(owners, vec!["StringProperty", "TextProperty"]);

        assert!(prop.do_validate(Value::Integer(1)).is_err());
        let too_long = "x".repeat(MAX_STRING_LENGTH + 1);
        assert!(prop.do_validate(Value::Text(too_long.clone())).is_err());

        let unindexed = build(string().indexed(false), "long");
        assert!(unindexed.do_validate(Value::Text(too_long)).is_ok());
    }

    #[test]
    fn test_string_caps_undecoded_bytes() {
        let prop = build(string(), "title");
        let oversized = vec![b'x'; 2000];
        assert!(matches!(
            prop.do_validate(Value::Bytes(oversized.clone())),
            Err(ModelError::BadValue(_))
        ));

        let at_limit = vec![b'x'; MAX_STRING_LENGTH];
        assert_eq!(
            prop.do_validate(Value::Bytes(at_limit)).unwrap(),
            Value::Text("x".repeat(MAX_STRING_LENGTH))
        );

        let unindexed = build(string().indexed(false), "long");
        assert!(unindexed.do_validate(Value::Bytes(oversized)).is_ok());
    }

    #[test]
    fn test_blob() {
        let prop = build(blob(), "payload");
        assert!(!prop.indexed());
        assert!(prop.do_validate(Value::Bytes(vec![1, 2])).is_ok());
        assert!(prop.do_validate(Value::Text("x".into())).is_err());
    }

    #[test]
    fn test_repeated_elements_are_validated() {
        use crate::model::ValueContainer;
        use std::collections::HashMap;

        struct Bag(HashMap<String, Value>);
        impl ValueContainer for Bag {
            fn values(&self) -> &HashMap<String, Value> {
                &self.0
            }
            fn values_mut(&mut self) -> &mut HashMap<String, Value> {
                &mut self.0
            }
        }

        let prop = float()
            .name("scores")
            .repeated(true)
            .counter(Arc::new(CreationCounter::new()))
            .build()
            .unwrap();
        let mut bag = Bag(HashMap::new());
        prop.set_value(&mut bag, vec![Value::Integer(1), Value::Float(2.5)]).unwrap();
        assert_eq!(
            bag.0.get("scores"),
            Some(&Value::List(vec![Value::Float(1.0), Value::Float(2.5)]))
        );
        assert!(prop.set_value(&mut bag, vec![Value::Text("x".into())]).is_err());
    }
}
