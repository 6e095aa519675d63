//! Driver-side contract.
//!
//! These traits describe what a database driver exposes and what the
//! middleware layer in turn exposes to its callers. Optional features are
//! modelled as accessor methods returning `Option`; a driver object "has" a
//! capability exactly when the accessor returns `Some`.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::{NamedParam, NamedValue, Value, ValueKind};

/// Entry point of a driver.
pub trait Driver: Send + Sync {
    /// Open a new connection using a driver-specific name (usually a DSN).
    fn open(&self, name: &str) -> Result<Box<dyn Conn>>;

    /// Parse `name` once and return a reusable connector.
    ///
    /// `None` means the driver has no connector support; callers fall back to
    /// [`Driver::open`].
    fn open_connector(&self, _name: &str) -> Option<Result<Box<dyn Connector>>> {
        None
    }
}

/// A fixed configuration able to produce connections.
pub trait Connector: Send + Sync {
    fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>>;
}

/// Options for beginning a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// A connection to the database.
pub trait Conn: Send {
    fn prepare(&mut self, ctx: &Context, query: &str) -> Result<Box<dyn Stmt>>;

    /// Run a query without an explicit prepare. `Error::Skip` asks the caller
    /// to prepare instead.
    fn query(&mut self, _ctx: &Context, _query: &str, _args: &[NamedValue]) -> Result<Box<dyn Rows>> {
        Err(Error::Skip)
    }

    /// Execute a statement without an explicit prepare. `Error::Skip` asks the
    /// caller to prepare instead.
    fn exec(&mut self, _ctx: &Context, _query: &str, _args: &[NamedValue]) -> Result<Box<dyn ExecResult>> {
        Err(Error::Skip)
    }

    fn begin(&mut self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>>;

    fn ping(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn reset_session(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()>;

    /// Connection-wide parameter validator, shared with every statement
    /// prepared on this connection.
    fn value_checker(&self) -> Option<Arc<dyn NamedValueChecker + Send + Sync>> {
        None
    }
}

/// A prepared statement.
pub trait Stmt: Send {
    /// Number of placeholders, or `None` when the driver cannot tell.
    fn num_input(&self) -> Option<usize>;

    fn exec(&mut self, ctx: &Context, args: &[NamedValue]) -> Result<Box<dyn ExecResult>>;

    fn query(&mut self, ctx: &Context, args: &[NamedValue]) -> Result<Box<dyn Rows>>;

    fn close(&mut self) -> Result<()>;

    /// Statement-specific parameter validator.
    fn as_value_checker(&self) -> Option<&dyn NamedValueChecker> {
        None
    }
}

/// An open transaction.
pub trait Tx: Send {
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// Summary of an executed statement.
pub trait ExecResult: Send {
    fn last_insert_id(&self) -> Result<i64>;
    fn rows_affected(&self) -> Result<i64>;
}

/// Outcome of advancing a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A row was written into the destination slice.
    Row,
    /// No more rows in the current result set.
    Exhausted,
}

/// A result cursor.
///
/// `columns`, `next` and `close` are mandatory. Every `as_*` accessor is an
/// optional capability and defaults to `None`. `rows_unwrap` marks a
/// transparent wrapper and must agree with `rows_unwrap_mut`; the same holds
/// for the two next-result-set accessors.
pub trait Rows: Send {
    fn columns(&self) -> Vec<String>;

    /// Fill `dest` (one slot per column) with the next row.
    fn next(&mut self, dest: &mut [Value]) -> Result<Advance>;

    fn close(&mut self) -> Result<()>;

    fn as_next_result_set(&self) -> Option<&dyn RowsNextResultSet> {
        None
    }

    fn as_next_result_set_mut(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        None
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        None
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        None
    }

    fn as_column_type_nullable(&self) -> Option<&dyn RowsColumnTypeNullable> {
        None
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        None
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        None
    }

    /// The rows this value wraps, if it is a transparent wrapper.
    fn rows_unwrap(&self) -> Option<&dyn Rows> {
        None
    }

    fn rows_unwrap_mut(&mut self) -> Option<&mut dyn Rows> {
        None
    }
}

/// Cursors that can carry more than one result set.
pub trait RowsNextResultSet {
    fn has_next_result_set(&self) -> bool;

    /// Move to the next result set. Errors when there is none.
    fn next_result_set(&mut self) -> Result<()>;
}

pub trait RowsColumnTypeDatabaseTypeName {
    /// Database type name of the column, e.g. `VARCHAR` or `INT4`.
    fn column_type_database_type_name(&self, index: usize) -> String;
}

pub trait RowsColumnTypeLength {
    /// Declared length of variable-length columns, `None` if not applicable.
    fn column_type_length(&self, index: usize) -> Option<i64>;
}

pub trait RowsColumnTypeNullable {
    /// Whether the column may be NULL, `None` if unknown.
    fn column_type_nullable(&self, index: usize) -> Option<bool>;
}

pub trait RowsColumnTypePrecisionScale {
    /// `(precision, scale)` of decimal columns, `None` if not applicable.
    fn column_type_precision_scale(&self, index: usize) -> Option<(i64, i64)>;
}

pub trait RowsColumnTypeScanType {
    /// The value kind the column scans into.
    fn column_type_scan_type(&self, index: usize) -> ValueKind;
}

/// Outcome of a validator for a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// The validator converted the parameter; its result is final.
    Accept(Value),
    /// Not this validator's concern; try the next one in the chain.
    Decline,
}

/// Inspects and converts one parameter before it reaches the driver.
///
/// Returning `Err` rejects the parameter and ends the chain.
pub trait NamedValueChecker {
    fn check_named_value(&self, param: &NamedParam) -> Result<Check>;
}
