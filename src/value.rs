//! Raw and resolved configuration values.
//!
//! Sources produce [`Value`]s, field casts consume and produce them, and the
//! per-config cache stores them. [`FromValue`] is the extraction seam that
//! turns a resolved value into a concrete Rust type at the `get_as` call
//! site.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ConfigError;
use crate::key::Key;

/// A raw or resolved configuration value.
///
/// `Null` comes from JSON/YAML `null`, a serialized `Option::None`, or an
/// explicit null default; TOML has no null. Lists hold scalars only — sources
/// never nest tables inside arrays here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable name of the variant, used in cast error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// `None` becomes `Null`.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Map a case-insensitive level name to a `tracing` severity.
///
/// Accepts the `tracing` names plus the aliases the original logging
/// vocabulary used: `warning` for WARN and `critical` for ERROR.
pub(crate) fn parse_log_level(name: &str) -> Option<tracing::Level> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" | "critical" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

/// Extraction of a concrete Rust type from a resolved [`Value`].
///
/// `key` is the fully-qualified key of the value being extracted and only
/// feeds error messages.
pub trait FromValue: Sized {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError>;
}

fn mismatch(key: &Key, expected: &str, got: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.clone(),
        reason: format!("expected {expected}, got {}", got.type_name()),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _key: &Key) -> Result<Self, ConfigError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(key, "bool", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch(key, "integer", other)),
        }
    }
}

macro_rules! int_from_value {
    ($($ty:ty),+) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
                let wide = i64::from_value(value, key)?;
                <$ty>::try_from(wide).map_err(|_| ConfigError::InvalidValue {
                    key: key.clone(),
                    reason: format!(
                        "{wide} is out of range for {}",
                        std::any::type_name::<$ty>()
                    ),
                })
            }
        }
    )+};
}

int_from_value!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch(key, "float", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        f64::from_value(value, key).map(|x| x as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(mismatch(key, "string", other)),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        String::from_value(value, key).map(PathBuf::from)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        String::from_value(value, key).map(String::into_bytes)
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Str(s) => Decimal::from_str(s.trim()).map_err(|e| ConfigError::InvalidValue {
                key: key.clone(),
                reason: format!("'{s}' is not a decimal: {e}"),
            }),
            Value::Int(i) => Ok(Decimal::from(*i)),
            other => Err(mismatch(key, "decimal", other)),
        }
    }
}

impl FromValue for tracing::Level {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        let name = String::from_value(value, key)?;
        parse_log_level(&name).ok_or_else(|| ConfigError::InvalidValue {
            key: key.clone(),
            reason: format!("'{name}' is not a log level"),
        })
    }
}

/// `Null` extracts to `None`; anything else goes through `T`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, key: &Key) -> Result<Self, ConfigError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, key).map(Some),
        }
    }
}
