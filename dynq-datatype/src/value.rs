use crate::error::{Error, Result};
use crate::ty::ScalarType;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use time::Date;
use time::macros::format_description;

/// Runtime value of a single column.
///
/// Int and Float compare numerically with each other, so `Int(1) == Float(1.0)`.
/// Null equals Null here; SQL null semantics are applied by predicate evaluation.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(Date),
}

impl Value {
    /// Returns runtime scalar type, None for null.
    #[inline]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Int(_) => Some(ScalarType::Int),
            Value::Float(_) => Some(ScalarType::Float),
            Value::Str(_) => Some(ScalarType::Str),
            Value::Date(_) => Some(ScalarType::Date),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, zero, empty string and false are falsy.
    #[inline]
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Date(_) => false,
        }
    }

    /// Convert a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(json: &JsonValue) -> Result<Value> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if n.is_u64() {
                    Err(Error::IntegerOutOfRange(n.to_string()))
                } else {
                    n.as_f64()
                        .map(Value::Float)
                        .ok_or_else(|| Error::UnsupportedValue(n.to_string()))
                }
            }
            JsonValue::String(s) => Ok(Value::Str(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err(Error::UnsupportedValue(json.to_string()))
            }
        }
    }

    #[inline]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => JsonValue::from(*f),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Date(d) => JsonValue::String(format_date(*d)),
        }
    }

    /// Strict conversion to given type.
    ///
    /// Succeeds only if runtime type equals the target type. The single
    /// exception is date: JSON carries dates as strings, so an ISO date
    /// string is accepted for a date column.
    #[inline]
    pub fn cast(self, ty: ScalarType) -> Option<Value> {
        match (self, ty) {
            (Value::Str(s), ScalarType::Date) => parse_date(&s).ok().map(Value::Date),
            (v, ty) if ty.matches(&v) => Some(v),
            _ => None,
        }
    }

    /// Lax conversion used when validating write records.
    ///
    /// Compared to [`Value::cast`], integers widen to float and strings
    /// are trimmed. Null is never converted.
    #[inline]
    pub fn coerce(self, ty: ScalarType) -> Option<Value> {
        match (self, ty) {
            (Value::Int(i), ScalarType::Float) => Some(Value::Float(i as f64)),
            (Value::Str(s), ScalarType::Str) => Some(Value::Str(s.trim().to_string())),
            (Value::Str(s), ScalarType::Date) => parse_date(s.trim()).ok().map(Value::Date),
            (v, ty) => v.cast(ty),
        }
    }

    /// Plain text of the value, used by pattern matching.
    #[inline]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Str(s) => Cow::Borrowed(s),
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::Date(d) => Cow::Owned(format_date(*d)),
        }
    }

    /// Total order used for sorting: null first, incomparable values equal.
    #[inline]
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (l, r) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        }
    }
}

#[inline]
pub(crate) fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(s.to_string()))
}

#[inline]
fn format_date(d: Date) -> String {
    // formatting a valid date with numeric components cannot fail.
    d.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Value {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
            (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
            (Value::Int(l), Value::Float(r)) => (*l as f64).partial_cmp(r),
            (Value::Float(l), Value::Int(r)) => l.partial_cmp(&(*r as f64)),
            (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
            (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
            (Value::Date(l), Value::Date(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Date(d) => write!(f, "'{}'", format_date(*d)),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(src: bool) -> Self {
        Value::Bool(src)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(src: i64) -> Self {
        Value::Int(src)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(src: i32) -> Self {
        Value::Int(src as i64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(src: f64) -> Self {
        Value::Float(src)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(src: &str) -> Self {
        Value::Str(src.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(src: String) -> Self {
        Value::Str(src)
    }
}

impl From<Date> for Value {
    #[inline]
    fn from(src: Date) -> Self {
        Value::Date(src)
    }
}

impl Serialize for Value {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&format_date(*d)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar value")
    }

    #[inline]
    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    #[inline]
    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    #[inline]
    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(v))
    }

    #[inline]
    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom(Error::IntegerOutOfRange(v.to_string())))
    }

    #[inline]
    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::Str(v.to_string()))
    }

    #[inline]
    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::Str(v))
    }
}
