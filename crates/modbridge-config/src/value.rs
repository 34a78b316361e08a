//! Dynamic property values, declared types and value kinds
//!
//! [`ValueKind`] is the closed set of property types a settings control can
//! be bound to. [`DeclaredType`] is what a property actually declares; it is
//! wider (lists, custom types) and only some declared types map to a kind.
//! [`ConfigValue`] connects a Rust field type to both and performs coercion.

use crate::error::ConversionError;
use crate::keybind::{Button, KeybindList};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property types that can be bound to a settings control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    String,
    SingleKeybind,
    KeybindList,
}

impl ValueKind {
    /// Every kind, in dispatch-table order
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Boolean,
        ValueKind::Integer,
        ValueKind::Float,
        ValueKind::String,
        ValueKind::SingleKeybind,
        ValueKind::KeybindList,
    ];

    /// Stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::SingleKeybind => "SingleKeybind",
            Self::KeybindList => "KeybindList",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type a property declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    Text,
    Button,
    KeybindList,
    /// A homogeneous list of the inner type
    List(Box<DeclaredType>),
    /// Any type without a built-in mapping, by name
    Custom(&'static str),
}

impl DeclaredType {
    /// The value kind for this declared type, if it has one
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Bool => Some(ValueKind::Boolean),
            Self::Int | Self::Long => Some(ValueKind::Integer),
            Self::Float | Self::Double => Some(ValueKind::Float),
            Self::Text => Some(ValueKind::String),
            Self::Button => Some(ValueKind::SingleKeybind),
            Self::KeybindList => Some(ValueKind::KeybindList),
            Self::List(_) | Self::Custom(_) => None,
        }
    }

    /// An empty value of this type, for collection types
    pub fn empty_collection(&self) -> Option<Value> {
        match self {
            Self::KeybindList => Some(Value::KeybindList(KeybindList::default())),
            Self::List(_) => Some(Value::List(Vec::new())),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("Bool"),
            Self::Int => f.write_str("Int"),
            Self::Long => f.write_str("Long"),
            Self::Float => f.write_str("Float"),
            Self::Double => f.write_str("Double"),
            Self::Text => f.write_str("Text"),
            Self::Button => f.write_str("Button"),
            Self::KeybindList => f.write_str("KeybindList"),
            Self::List(inner) => write!(f, "List<{}>", inner),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// A property value with its type erased
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Button(Button),
    KeybindList(KeybindList),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Button(_) => "button",
            Self::KeybindList(_) => "keybind list",
            Self::List(_) => "list",
        }
    }

    /// Whether this is [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Button(v) => write!(f, "{}", v),
            Self::KeybindList(v) => write!(f, "{}", v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Button> for Value {
    fn from(v: Button) -> Self {
        Self::Button(v)
    }
}

impl From<KeybindList> for Value {
    fn from(v: KeybindList) -> Self {
        Self::KeybindList(v)
    }
}

/// A Rust type that can back a configuration property
///
/// `from_value` coerces: numbers widen and narrow (floats round half away
/// from zero, out-of-range values fail), text parses into numbers and bools,
/// and anything scalar renders into text. Text never parses into a button or
/// keybind list.
pub trait ConfigValue: Sized + Send + Sync + 'static {
    /// The declared type of a property of this Rust type
    fn declared_type() -> DeclaredType;

    /// Erase the type
    fn to_value(&self) -> Value;

    /// Coerce a value into this type
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch<T: ConfigValue>(value: &Value) -> ConversionError {
    ConversionError::new(value.type_name(), T::declared_type().to_string())
}

impl ConfigValue for bool {
    fn declared_type() -> DeclaredType {
        DeclaredType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::Float(v) => Ok(*v != 0.0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(mismatch::<Self>(&value).because(format!("`{}` is not a boolean", s))),
            },
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

/// `min` is inclusive, `end` exclusive; both must be exact in `f64`
fn float_to_int(value: f64, min: f64, end: f64) -> Option<f64> {
    let rounded = value.round();
    (value.is_finite() && rounded >= min && rounded < end).then_some(rounded)
}

// 2^63 and 2^31; `i64::MAX as f64` rounds up to 2^63.
const I64_END: f64 = 9_223_372_036_854_775_808.0;
const I32_END: f64 = 2_147_483_648.0;

impl ConfigValue for i64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Long
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::Int(v) => Ok(*v),
            Value::Bool(v) => Ok(i64::from(*v)),
            Value::Float(v) => float_to_int(*v, i64::MIN as f64, I64_END)
                .map(|r| r as i64)
                .ok_or_else(|| mismatch::<Self>(&value).because("out of range")),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| mismatch::<Self>(&value).because(e)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl ConfigValue for i32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Int
    }

    fn to_value(&self) -> Value {
        Value::Int((*self).into())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = match &value {
            Value::Float(v) => float_to_int(*v, i32::MIN as f64, I32_END)
                .map(|r| r as i64)
                .ok_or_else(|| mismatch::<Self>(&value).because("out of range"))?,
            _ => i64::from_value(value.clone()).map_err(|e| ConversionError {
                to: Self::declared_type().to_string(),
                ..e
            })?,
        };
        i32::try_from(wide).map_err(|_| mismatch::<Self>(&value).because("out of range"))
    }
}

impl ConfigValue for f64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Double
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| mismatch::<Self>(&value).because(e)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl ConfigValue for f32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float((*self).into())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = f64::from_value(value.clone()).map_err(|e| ConversionError {
            to: Self::declared_type().to_string(),
            ..e
        })?;
        if wide.is_finite() && wide.abs() > f32::MAX as f64 {
            return Err(mismatch::<Self>(&value).because("out of range"));
        }
        Ok(wide as f32)
    }
}

impl ConfigValue for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null | Value::List(_) => Err(mismatch::<Self>(&value)),
            other => Ok(other.to_string()),
        }
    }
}

impl ConfigValue for Button {
    fn declared_type() -> DeclaredType {
        DeclaredType::Button
    }

    fn to_value(&self) -> Value {
        Value::Button(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Button(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl ConfigValue for KeybindList {
    fn declared_type() -> DeclaredType {
        DeclaredType::KeybindList
    }

    fn to_value(&self) -> Value {
        Value::KeybindList(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::KeybindList(list) => Ok(list),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::List(Box::new(T::declared_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ConfigValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: ConfigValue> ConfigValue for Option<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(ConfigValue::to_value).unwrap_or(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
