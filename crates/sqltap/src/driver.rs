//! Driver shim.

use std::sync::Arc;

use sqltap_core::{Conn, Connector, Driver, Result};
use tracing::debug;

use crate::conn::WrappedConn;
use crate::connector::{DsnConnector, WrappedConnector};
use crate::middleware::Middleware;

/// A driver whose connections and connectors are intercepted.
pub struct WrappedDriver {
    mw: Middleware,
    parent: Arc<dyn Driver>,
}

impl WrappedDriver {
    pub fn new(mw: Middleware, parent: Arc<dyn Driver>) -> Self {
        Self { mw, parent }
    }

    pub fn middleware(&self) -> &Middleware {
        &self.mw
    }

    pub fn parent(&self) -> &Arc<dyn Driver> {
        &self.parent
    }

    /// Wrapped connector for `name`.
    ///
    /// Uses the driver's own connector when it has one (its errors are
    /// returned as is), otherwise a [`DsnConnector`] that calls
    /// [`Driver::open`] on every connect.
    pub fn connector(&self, name: &str) -> Result<WrappedConnector> {
        let connector: Box<dyn Connector> = match self.parent.open_connector(name) {
            Some(connector) => connector?,
            None => {
                debug!("driver has no connector support, falling back to open");
                Box::new(DsnConnector::new(name, self.parent.clone()))
            }
        };
        Ok(WrappedConnector::new(self.mw.clone(), connector))
    }
}

impl Driver for WrappedDriver {
    fn open(&self, name: &str) -> Result<Box<dyn Conn>> {
        let conn = self.parent.open(name)?;
        Ok(Box::new(WrappedConn::new(self.mw.clone(), conn)))
    }

    fn open_connector(&self, name: &str) -> Option<Result<Box<dyn Connector>>> {
        Some(
            self.connector(name)
                .map(|connector| Box::new(connector) as Box<dyn Connector>),
        )
    }
}
