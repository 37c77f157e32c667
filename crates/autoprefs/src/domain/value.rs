//! The value model shared by every backend.
//!
//! A stored entry is one [`Value`].  Writers convert into it with `From`;
//! readers convert out of it with [`FromValue`], which applies a small set of
//! lossless-or-obvious coercions so that a value written by one backend can be
//! read back after migration through another.
//!
//! # Coercions
//!
//! | target    | accepted stored values                                     |
//! |-----------|------------------------------------------------------------|
//! | `bool`    | `Bool`, `String` equal to `true`/`false` (any case)        |
//! | `i32`     | `Int`, `Long` within range, parseable `String`             |
//! | `i64`     | `Int`, `Long`, parseable `String`                          |
//! | `f32`     | `Float`, `Double`, `Int`, `Long`, parseable `String`       |
//! | `f64`     | `Double`, `Float`, `Int`, `Long`, parseable `String`       |
//! | `String`  | `String`, and any scalar through its `Display` form        |
//! | `Vec<u8>` | `Bytes`, `Opaque`                                          |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stored preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Caller-encoded structured value; see [`crate::ObjectCodec`].
    Opaque(Vec<u8>),
}

/// The type tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    Opaque,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Opaque(_) => ValueType::Opaque,
        }
    }

    /// Payload size in bytes for strings and byte sequences, `0` for scalars.
    pub fn payload_len(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            Value::Bytes(b) | Value::Opaque(b) => b.len(),
            _ => 0,
        }
    }

    /// Parses `text` as a value of type `ty`.
    ///
    /// Byte sequences and opaque values are given as hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`ParseValueError`] if `text` is not a valid literal for `ty`.
    pub fn parse_as(ty: ValueType, text: &str) -> Result<Value, ParseValueError> {
        let invalid = || ParseValueError::InvalidLiteral {
            ty,
            text: text.to_string(),
        };
        let value = match ty {
            ValueType::Bool => Value::Bool(parse_bool(text).ok_or_else(invalid)?),
            ValueType::Int => Value::Int(text.trim().parse().map_err(|_| invalid())?),
            ValueType::Long => Value::Long(text.trim().parse().map_err(|_| invalid())?),
            ValueType::Float => Value::Float(text.trim().parse().map_err(|_| invalid())?),
            ValueType::Double => Value::Double(text.trim().parse().map_err(|_| invalid())?),
            ValueType::String => Value::String(text.to_string()),
            ValueType::Bytes => Value::Bytes(hex::decode(text.trim()).map_err(|_| invalid())?),
            ValueType::Opaque => Value::Opaque(hex::decode(text.trim()).map_err(|_| invalid())?),
        };
        Ok(value)
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) | Value::Opaque(v) => f.write_str(&hex::encode(v)),
        }
    }
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
            ValueType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from [`Value::parse_as`] and `ValueType::from_str`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("unknown value type '{0}'")]
    UnknownType(String),

    #[error("'{text}' is not a valid {ty} value")]
    InvalidLiteral { ty: ValueType, text: String },
}

impl FromStr for ValueType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ValueType::Bool,
            "int" | "i32" => ValueType::Int,
            "long" | "i64" => ValueType::Long,
            "float" | "f32" => ValueType::Float,
            "double" | "f64" => ValueType::Double,
            "string" | "str" => ValueType::String,
            "bytes" => ValueType::Bytes,
            "opaque" | "object" => ValueType::Opaque,
            _ => return Err(ParseValueError::UnknownType(s.to_string())),
        };
        Ok(ty)
    }
}

// ── Conversions into Value ────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

// ── Conversions out of Value ──────────────────────────────────────────────────

/// Reads a typed value out of a stored [`Value`], returning `None` when the
/// stored value cannot be coerced to `Self`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            Value::String(s) => parse_bool(s),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            Value::Long(v) => i32::try_from(*v).ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Double(v) => Some(*v as f32),
            Value::Int(v) => Some(*v as f32),
            Value::Long(v) => Some(*v as f32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Bytes(_) | Value::Opaque(_) => None,
            scalar => Some(scalar.to_string()),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) | Value::Opaque(b) => Some(b.clone()),
            _ => None,
        }
    }
}
