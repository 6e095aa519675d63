//! # sqltap
//!
//! Interception middleware for database drivers.
//!
//! `sqltap` wraps a [`Driver`](sqltap_core::Driver) so that every operation
//! (connect, prepare, query, exec, row iteration, commit, rollback) passes
//! through a user-supplied [`Interceptor`] carrying a request [`Context`],
//! without changing what the driver does.
//!
//! Cursors are the interesting part. A driver cursor exposes some subset of
//! six optional capabilities (multiple result sets, column type name, length,
//! nullability, precision/scale, scan type). The proxy that replaces it
//! exposes exactly the same subset, so capability probing downstream gives
//! the same answer with or without the middleware.
//!
//! ## Architecture
//!
//! ```text
//!   driver rows ──► unwrap::resolve ──► terminal cursor
//!                                            │
//!                                  CapabilityMask::of
//!                                            │
//!                                            ▼
//!                              picker::proxy_constructor(mask)
//!                                            │
//!                                            ▼
//!   ┌────────────────────────────────────────────────────┐
//!   │ WrappedRows<MASK>                                  │
//!   │   next / close   → Interceptor::rows_next / close  │
//!   │   columns        → forwarded                       │
//!   │   as_* (in MASK) → terminal cursor, not intercepted│
//!   └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqltap::{Interceptor, Middleware};
//! use sqltap_core::{Context, Driver, Rows, Result, Advance, Value};
//!
//! struct CountRows;
//!
//! impl Interceptor for CountRows {
//!     fn rows_next(&self, _ctx: &Context, rows: &mut dyn Rows, dest: &mut [Value]) -> Result<Advance> {
//!         let advance = rows.next(dest)?;
//!         tracing::debug!(?advance, "row");
//!         Ok(advance)
//!     }
//! }
//!
//! fn setup(driver: Arc<dyn Driver>) -> impl Driver {
//!     Middleware::new(CountRows).wrap_driver(driver)
//! }
//! ```

pub mod capability;
pub mod conn;
pub mod connector;
pub mod driver;
pub mod interceptor;
pub mod middleware;
pub mod picker;
pub mod result;
pub mod rows;
pub mod stmt;
pub mod tx;
pub mod unwrap;
pub mod validation;

pub use capability::{Capability, CapabilityMask, COMBINATIONS};
pub use conn::WrappedConn;
pub use connector::{DsnConnector, WrappedConnector};
pub use driver::WrappedDriver;
pub use interceptor::{Interceptor, NullInterceptor};
pub use middleware::Middleware;
pub use picker::{proxy_constructor, wrap_rows, RowsConstructor, WrappedRows};
pub use result::WrappedResult;
pub use rows::InterceptedRows;
pub use stmt::WrappedStmt;
pub use tx::WrappedTx;
pub use validation::{check_and_convert, convert_all, default_convert, Converted, Converter};

pub use sqltap_core::Context;
