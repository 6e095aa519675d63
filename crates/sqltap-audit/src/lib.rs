//! # sqltap-audit
//!
//! Audit logging for sqltap-wrapped drivers.
//!
//! [`AuditInterceptor`] is an [`Interceptor`](sqltap::Interceptor) that
//! records one [`AuditEvent`] per driver call, with its duration and, when
//! the call failed, the driver's error. What the driver returned is never
//! altered, even when storing the event fails.
//!
//! Events of one query (the query itself, its fetches and the cursor close),
//! one prepared statement or one transaction share a correlation id. The id
//! is taken from the caller's context under [`CORRELATION_ID`] when present,
//! otherwise a fresh UUID is assigned.
//!
//! ## Event Types
//!
//! | Event Type | Description |
//! |------------|-------------|
//! | `Connect` | A connector produced a connection |
//! | `Ping` | Connection liveness check |
//! | `ResetSession` | Session reset before reuse |
//! | `Prepare` | Statement prepared |
//! | `Exec` | Statement ran without producing rows |
//! | `Query` | Query opened a cursor |
//! | `Fetch` | Row fetched (only with `log_rows`, or on error) |
//! | `RowsClosed` | Cursor closed, with the number of rows fetched |
//! | `StmtClosed` | Prepared statement closed |
//! | `Begin` / `Commit` / `Rollback` | Transaction lifecycle |
//!
//! ## Storage
//!
//! - **File**: JSON Lines (one JSON object per line), reloaded on open
//! - **Console**: JSON Lines on stdout
//! - **Memory**: in-process, queryable with [`AuditFilter`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sqltap::Middleware;
//! use sqltap_audit::AuditInterceptor;
//! use sqltap_core::{AuditConfig, Driver};
//!
//! fn audited(driver: Arc<dyn Driver>) -> Result<impl Driver, Box<dyn std::error::Error>> {
//!     let audit = AuditInterceptor::new(AuditConfig::default())?;
//!     Ok(Middleware::new(audit).wrap_driver(driver))
//! }
//! ```

pub mod error;
pub mod event;
pub mod interceptor;
pub mod storage;

pub use error::AuditError;
pub use event::{AuditEvent, AuditEventBuilder, AuditEventType};
pub use interceptor::{correlation_id, AuditInterceptor, RowCounter, CORRELATION_ID, ROW_COUNTER};
pub use storage::{
    create_storage, AuditFilter, AuditStorage, ConsoleStorage, FileStorage, MemoryStorage,
    NullStorage,
};
