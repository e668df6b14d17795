//! Dynamic column values.

use serde::{Deserialize, Serialize};

/// A column value as seen by scope predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    BigInt(i64),
    Double(f64),
    Text(String),
    /// Structured column (JSON document).
    Json(serde_json::Value),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view; booleans count as 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::BigInt(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(3_i64)), Value::BigInt(3));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert!(Value::from(None::<&str>).is_null());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(7).as_i64(), Some(7));
        assert_eq!(Value::from(true).as_i64(), Some(1));
        assert_eq!(Value::from("active").as_str(), Some("active"));
        assert_eq!(Value::from("active").as_i64(), None);
        assert_eq!(Value::from(serde_json::json!({"a": 1})).as_str(), None);
    }
}
