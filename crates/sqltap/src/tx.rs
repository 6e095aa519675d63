//! Transaction shim.

use sqltap_core::{Context, Result, Tx};

use crate::middleware::Middleware;

/// A transaction carrying the context returned by `conn_begin_tx`.
pub struct WrappedTx {
    mw: Middleware,
    ctx: Context,
    parent: Box<dyn Tx>,
}

impl WrappedTx {
    pub fn new(mw: Middleware, ctx: Context, parent: Box<dyn Tx>) -> Self {
        Self { mw, ctx, parent }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

impl Tx for WrappedTx {
    fn commit(&mut self) -> Result<()> {
        self.mw.interceptor().tx_commit(&self.ctx, self.parent.as_mut())
    }

    fn rollback(&mut self) -> Result<()> {
        self.mw.interceptor().tx_rollback(&self.ctx, self.parent.as_mut())
    }
}
