//! Scalar value representation for rows, trees, and parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scalar value as it travels between rows, trees, and bound parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Null/absent value
    Null,
    /// String value
    String(String),
    /// Whole number (integer)
    Int(i64),
    /// Floating point (decimal, money, float)
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time
    DateTime(DateTime<Utc>),
    /// Unique identifier
    Guid(Uuid),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as GUID
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    /// Try to get as date-time
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Canonical string form used by lexical parsing and key normalization.
    ///
    /// `Null` has no lexical form. Date-times render as an ISO-8601 instant
    /// with millisecond precision, matching the string encoding accepted by
    /// the date transformers.
    pub fn lexical(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            Value::Guid(g) => Some(g.to_string()),
        }
    }

    /// Equality policy for join keys.
    ///
    /// A null on either side never matches. Values of the same variant
    /// compare structurally; values of different variants compare by their
    /// canonical lexical form, so an `Int(1)` key joins a `String("1")` key.
    pub fn key_eq(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        if std::mem::discriminant(self) == std::mem::discriminant(other) {
            return self == other;
        }
        self.lexical() == other.lexical()
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
        }
    }

    /// Parse from a JSON value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => {
                // Try to parse as GUID
                if let Ok(guid) = Uuid::parse_str(s) {
                    return Value::Guid(guid);
                }
                // Try to parse as DateTime
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Value::DateTime(dt.with_timezone(&Utc));
                }
                Value::String(s.clone())
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                // Complex types are not scalar values
                Value::String(json.to_string())
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(&json!(null)), Value::Null);
        assert_eq!(Value::from_json(&json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(&json!(42)), Value::Int(42));
        assert_eq!(Value::from_json(&json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from_json(&json!("plain")), Value::String("plain".into()));
    }

    #[test]
    fn test_from_json_guid() {
        let value = Value::from_json(&json!("ed9ceb9d-6c0f-e911-a957-000d3ab5228b"));
        assert_eq!(
            value,
            Value::Guid(Uuid::parse_str("ed9ceb9d-6c0f-e911-a957-000d3ab5228b").unwrap())
        );
    }

    #[test]
    fn test_key_eq_same_variant() {
        assert!(Value::Int(7).key_eq(&Value::Int(7)));
        assert!(!Value::Int(7).key_eq(&Value::Int(8)));
        assert!(Value::String("ab".into()).key_eq(&Value::String("ab".into())));
    }

    #[test]
    fn test_key_eq_mixed_variants_use_lexical_form() {
        assert!(Value::Int(1).key_eq(&Value::String("1".into())));
        assert!(Value::String("true".into()).key_eq(&Value::Bool(true)));
        assert!(!Value::Int(1).key_eq(&Value::String("01".into())));
    }

    #[test]
    fn test_key_eq_null_never_matches() {
        assert!(!Value::Null.key_eq(&Value::Null));
        assert!(!Value::Null.key_eq(&Value::Int(0)));
        assert!(!Value::Int(0).key_eq(&Value::Null));
    }

    #[test]
    fn test_lexical_forms() {
        assert_eq!(Value::Null.lexical(), None);
        assert_eq!(Value::Int(20070531).lexical().unwrap(), "20070531");
        assert_eq!(Value::Bool(false).lexical().unwrap(), "false");
    }
}
