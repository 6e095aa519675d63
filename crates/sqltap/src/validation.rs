//! Parameter validation chain.
//!
//! Each parameter is offered, in order, to the statement's validator, the
//! connection's validator and finally the default converter. A validator
//! either accepts (its conversion is final), rejects with an error (also
//! final), or declines, in which case the next link is consulted.

use std::fmt;

use sqltap_core::{Check, Error, NamedParam, NamedValue, NamedValueChecker, Param, Result, Value};
use tracing::trace;

/// Which link of the chain produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Statement,
    Connection,
    Default,
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement => write!(f, "statement"),
            Self::Connection => write!(f, "connection"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A parameter after the chain handled it.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub value: Value,
    pub by: Converter,
}

/// Run one parameter through the chain.
pub fn check_and_convert(
    stmt: Option<&dyn NamedValueChecker>,
    conn: Option<&dyn NamedValueChecker>,
    param: &NamedParam,
) -> Result<Converted> {
    let links = [(Converter::Statement, stmt), (Converter::Connection, conn)];
    for (by, checker) in links {
        let Some(checker) = checker else {
            continue;
        };
        match checker.check_named_value(param)? {
            Check::Accept(value) => {
                trace!(ordinal = param.ordinal, converter = %by, "parameter accepted");
                return Ok(Converted { value, by });
            }
            Check::Decline => {
                trace!(ordinal = param.ordinal, converter = %by, "parameter declined");
            }
        }
    }

    let value = default_convert(param)?;
    trace!(ordinal = param.ordinal, converter = %Converter::Default, "parameter converted");
    Ok(Converted {
        value,
        by: Converter::Default,
    })
}

/// Convert every parameter, preserving ordinal and name.
pub fn convert_all(
    stmt: Option<&dyn NamedValueChecker>,
    conn: Option<&dyn NamedValueChecker>,
    params: &[NamedParam],
) -> Result<Vec<NamedValue>> {
    params
        .iter()
        .map(|param| {
            let converted = check_and_convert(stmt, conn, param)?;
            Ok(NamedValue::new(param.ordinal, param.name.clone(), converted.value))
        })
        .collect()
}

/// The converter of last resort.
///
/// Widens integers to `Int64` and floats to `Float64`, maps text, bytes and
/// time directly. Unsigned values that do not fit in `i64` and custom types
/// are rejected.
pub fn default_convert(param: &NamedParam) -> Result<Value> {
    let value = match &param.value {
        Param::Null => Value::Null,
        Param::Bool(v) => Value::Bool(*v),
        Param::I8(v) => Value::Int64(i64::from(*v)),
        Param::I16(v) => Value::Int64(i64::from(*v)),
        Param::I32(v) => Value::Int64(i64::from(*v)),
        Param::I64(v) => Value::Int64(*v),
        Param::U8(v) => Value::Int64(i64::from(*v)),
        Param::U16(v) => Value::Int64(i64::from(*v)),
        Param::U32(v) => Value::Int64(i64::from(*v)),
        Param::U64(v) => match i64::try_from(*v) {
            Ok(v) => Value::Int64(v),
            Err(_) => {
                return Err(Error::unsupported(
                    param.ordinal,
                    param.value.type_name(),
                    "uint64 values with high bit set are not supported",
                ));
            }
        },
        Param::F32(v) => Value::Float64(f64::from(*v)),
        Param::F64(v) => Value::Float64(*v),
        Param::Str(v) => Value::Text(v.clone()),
        Param::Bytes(v) => Value::Bytes(v.clone()),
        Param::Time(v) => Value::Timestamp(*v),
        Param::Custom { type_name, .. } => {
            return Err(Error::unsupported(
                param.ordinal,
                type_name.clone(),
                "no validator accepted the value and it has no default conversion",
            ));
        }
    };
    Ok(value)
}
