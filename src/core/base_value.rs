use std::fmt;
use serde::{Deserialize, Serialize};
use crate::core::{ModelError, Result, Value};

/// A value that is already in its canonical base form.
///
/// Wrapped values skip the validation pipeline: `Property::do_validate`
/// hands them back untouched. Construction rejects `NULL` and lists.
///
/// `ValueBox` intentionally does not implement `Hash`, since the wrapped
/// value may be of a type that cannot be hashed meaningfully:
///
/// ```compile_fail
/// use std::collections::HashSet;
/// use rustmodel::ValueBox;
///
/// let mut seen = HashSet::new();
/// seen.insert(ValueBox::new(17i64).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawValueBox")]
pub struct ValueBox {
    b_val: Box<Value>,
}

impl ValueBox {
    pub fn new(value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        match value {
            Value::Null => Err(ModelError::InvalidArgument(
                "Cannot wrap NULL in a base value".into(),
            )),
            Value::List(_) => Err(ModelError::InvalidArgument(
                "Lists cannot be wrapped in a base value".into(),
            )),
            other => Ok(Self { b_val: Box::new(other) }),
        }
    }

    pub fn wrapped_value(&self) -> &Value {
        &self.b_val
    }

    pub fn into_inner(self) -> Value {
        *self.b_val
    }
}

#[derive(Deserialize)]
struct RawValueBox {
    b_val: Value,
}

impl TryFrom<RawValueBox> for ValueBox {
    type Error = ModelError;

    fn try_from(raw: RawValueBox) -> Result<Self> {
        Self::new(raw.b_val)
    }
}

impl fmt::Display for ValueBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueBox({})", self.b_val.repr())
    }
}
