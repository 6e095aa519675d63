//! Exec result shim.

use sqltap_core::{ExecResult, Result};

use crate::middleware::Middleware;

/// Routes the result summary accessors through their hooks.
pub struct WrappedResult {
    mw: Middleware,
    parent: Box<dyn ExecResult>,
}

impl WrappedResult {
    pub fn new(mw: Middleware, parent: Box<dyn ExecResult>) -> Self {
        Self { mw, parent }
    }
}

impl ExecResult for WrappedResult {
    fn last_insert_id(&self) -> Result<i64> {
        self.mw.interceptor().result_last_insert_id(self.parent.as_ref())
    }

    fn rows_affected(&self) -> Result<i64> {
        self.mw.interceptor().result_rows_affected(self.parent.as_ref())
    }
}
