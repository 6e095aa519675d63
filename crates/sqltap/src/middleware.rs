//! The configured interception layer.

use std::fmt;
use std::sync::Arc;

use sqltap_core::{Conn, Connector, Context, Driver, Result, Rows, SqltapConfig, DEFAULT_MAX_UNWRAP_DEPTH};
use tracing::debug;

use crate::conn::WrappedConn;
use crate::connector::WrappedConnector;
use crate::driver::WrappedDriver;
use crate::interceptor::Interceptor;
use crate::picker;

/// An interceptor together with its settings.
///
/// Built once at setup time and shared (cheaply cloned) by every wrapper it
/// produces. The interceptor cannot be swapped afterwards.
#[derive(Clone)]
pub struct Middleware {
    interceptor: Arc<dyn Interceptor>,
    max_unwrap_depth: usize,
}

impl Middleware {
    pub fn new(interceptor: impl Interceptor + 'static) -> Self {
        Self::from_arc(Arc::new(interceptor))
    }

    pub fn from_arc(interceptor: Arc<dyn Interceptor>) -> Self {
        Self {
            interceptor,
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
        }
    }

    /// Apply the settings from a loaded configuration.
    pub fn with_config(self, config: &SqltapConfig) -> Self {
        self.with_max_unwrap_depth(config.unwrap.max_depth)
    }

    /// Bound the number of rows wrappers followed; values below 1 are raised to 1.
    pub fn with_max_unwrap_depth(mut self, depth: usize) -> Self {
        self.max_unwrap_depth = depth.max(1);
        self
    }

    pub fn interceptor(&self) -> &dyn Interceptor {
        self.interceptor.as_ref()
    }

    pub fn max_unwrap_depth(&self) -> usize {
        self.max_unwrap_depth
    }

    /// Wrap a driver so that every connection it opens is intercepted.
    pub fn wrap_driver(&self, driver: Arc<dyn Driver>) -> WrappedDriver {
        debug!(max_unwrap_depth = self.max_unwrap_depth, "wrapping driver");
        WrappedDriver::new(self.clone(), driver)
    }

    pub fn wrap_connector(&self, connector: Box<dyn Connector>) -> WrappedConnector {
        WrappedConnector::new(self.clone(), connector)
    }

    pub fn wrap_conn(&self, conn: Box<dyn Conn>) -> WrappedConn {
        WrappedConn::new(self.clone(), conn)
    }

    /// Wrap a cursor, preserving the capabilities of the driver's own cursor.
    pub fn wrap_rows(&self, ctx: Context, rows: Box<dyn Rows>) -> Result<Box<dyn Rows>> {
        picker::wrap_rows(self, ctx, rows)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("max_unwrap_depth", &self.max_unwrap_depth)
            .finish_non_exhaustive()
    }
}
