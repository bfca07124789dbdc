//! Untyped JSON values.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::decimal::Decimal;

/// An untyped JSON value.
///
/// Decoding into `Value` dispatches on the next token alone. Integral
/// numbers narrow to [`Value::Int`] or [`Value::Long`] when they fit,
/// otherwise stay [`Value::Decimal`]; numbers with a fraction become
/// [`Value::Double`].
///
/// ```
/// use argo::Value;
///
/// let value: Value = argo::decode_str(r#"{"n": [1, 2.5, 30000000000]}"#).unwrap();
/// let n = value.get("n").and_then(Value::as_list).unwrap();
/// assert_eq!(n[0], Value::Int(1));
/// assert_eq!(n[1], Value::Double(2.5));
/// assert_eq!(n[2], Value::Long(30_000_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Decimal(Decimal),
    Double(f64),
    String(Arc<str>),
    List(Vec<Value>),
    Map(IndexMap<Arc<str>, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Decimal(d) if d.is_integral() => i64::try_from(d.trunc()).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Decimal(d) => Some(d.to_f64()),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<Arc<str>, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Member of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<Arc<str>, Value>> for Value {
    fn from(value: IndexMap<Arc<str>, Value>) -> Self {
        Value::Map(value)
    }
}
