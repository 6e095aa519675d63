//! Driver-native values and caller-supplied parameters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value in the representation every driver accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float64(_) => ValueKind::Float64,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
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

/// Kind of a driver value.
///
/// Also serves as the native scan type reported by drivers that can describe
/// the Rust-side representation of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Int64,
    Float64,
    Text,
    Bytes,
    Timestamp,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A raw argument as handed over by the caller, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
    /// An application type the default converter knows nothing about.
    /// Only a statement or connection validator can bind it.
    Custom {
        type_name: String,
        payload: serde_json::Value,
    },
}

impl Param {
    /// Short human-readable name of the parameter's type.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Time(_) => "time",
            Self::Custom { type_name, .. } => type_name,
        }
    }
}

macro_rules! param_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

param_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<u8> => Bytes,
    DateTime<Utc> => Time,
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// A caller argument with its position and optional name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// 1-based position in the argument list.
    pub ordinal: usize,
    pub name: Option<String>,
    pub value: Param,
}

impl NamedParam {
    pub fn positional(ordinal: usize, value: impl Into<Param>) -> Self {
        Self {
            ordinal,
            name: None,
            value: value.into(),
        }
    }

    pub fn named(ordinal: usize, name: impl Into<String>, value: impl Into<Param>) -> Self {
        Self {
            ordinal,
            name: Some(name.into()),
            value: value.into(),
        }
    }

    /// Number a list of positional arguments starting at 1.
    pub fn from_values<I, P>(values: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Self::positional(i + 1, v))
            .collect()
    }
}

/// A converted argument ready to be handed to the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub ordinal: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

impl NamedValue {
    pub fn new(ordinal: usize, name: Option<String>, value: Value) -> Self {
        Self {
            ordinal,
            name,
            value,
        }
    }
}
