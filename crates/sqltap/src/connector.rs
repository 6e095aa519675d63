//! Connector shims.

use std::fmt;
use std::sync::Arc;

use sqltap_core::{Conn, Connector, Context, Driver, Result};

use crate::conn::WrappedConn;
use crate::middleware::Middleware;

/// Intercepts `connect` and wraps the resulting connection.
pub struct WrappedConnector {
    mw: Middleware,
    parent: Box<dyn Connector>,
}

impl WrappedConnector {
    pub fn new(mw: Middleware, parent: Box<dyn Connector>) -> Self {
        Self { mw, parent }
    }

    pub fn parent(&self) -> &dyn Connector {
        self.parent.as_ref()
    }
}

impl Connector for WrappedConnector {
    fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>> {
        let conn = self.mw.interceptor().connector_connect(ctx, self.parent.as_ref())?;
        Ok(Box::new(WrappedConn::new(self.mw.clone(), conn)))
    }
}

/// Connector for drivers without connector support: every `connect` calls
/// [`Driver::open`] with the stored name.
pub struct DsnConnector {
    dsn: String,
    driver: Arc<dyn Driver>,
}

impl DsnConnector {
    pub fn new(dsn: impl Into<String>, driver: Arc<dyn Driver>) -> Self {
        Self {
            dsn: dsn.into(),
            driver,
        }
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }
}

impl Connector for DsnConnector {
    fn connect(&self, _ctx: &Context) -> Result<Box<dyn Conn>> {
        self.driver.open(&self.dsn)
    }
}

impl fmt::Debug for DsnConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DsnConnector").field("dsn", &self.dsn).finish_non_exhaustive()
    }
}
