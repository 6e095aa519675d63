//! # sqltap-core
//!
//! Shared building blocks for the sqltap middleware:
//!
//! - [`driver`]: the traits a database driver implements (connections,
//!   statements, transactions, cursors and their optional capabilities)
//! - [`value`]: driver-native values and caller-side parameters
//! - [`context`]: the immutable request context threaded through every hook
//! - [`error`]: the error taxonomy shared by drivers and middleware
//! - [`config`]: YAML configuration and its defaults
//! - [`logging`]: `tracing` subscriber setup

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod logging;
pub mod value;

pub use config::{
    AuditConfig, ConfigError, LoggingConfig, SqltapConfig, StorageBackend, StorageConfig,
    UnwrapConfig, DEFAULT_MAX_UNWRAP_DEPTH,
};
pub use context::Context;
pub use driver::{
    Advance, Check, Conn, Connector, Driver, ExecResult, IsolationLevel, NamedValueChecker, Rows,
    RowsColumnTypeDatabaseTypeName, RowsColumnTypeLength, RowsColumnTypeNullable,
    RowsColumnTypePrecisionScale, RowsColumnTypeScanType, RowsNextResultSet, Stmt, Tx, TxOptions,
};
pub use error::{CursorState, Error, Result};
pub use value::{NamedParam, NamedValue, Param, Value, ValueKind};

// Re-exported so drivers and integrators share one token type.
pub use tokio_util::sync::CancellationToken;
