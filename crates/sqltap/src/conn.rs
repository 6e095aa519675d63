//! Connection shim.

use std::sync::Arc;

use sqltap_core::{
    Conn, Context, ExecResult, NamedParam, NamedValue, NamedValueChecker, Result, Rows, Stmt, Tx,
    TxOptions,
};

use crate::middleware::Middleware;
use crate::picker;
use crate::result::WrappedResult;
use crate::stmt::WrappedStmt;
use crate::tx::WrappedTx;
use crate::validation;

/// A connection whose operations go through the interceptor.
///
/// Statements, transactions, cursors and results created from it are wrapped
/// in turn and carry the context returned by the hook that created them.
pub struct WrappedConn {
    mw: Middleware,
    parent: Box<dyn Conn>,
}

impl WrappedConn {
    pub fn new(mw: Middleware, parent: Box<dyn Conn>) -> Self {
        Self { mw, parent }
    }

    pub fn parent(&self) -> &dyn Conn {
        self.parent.as_ref()
    }

    pub fn parent_mut(&mut self) -> &mut dyn Conn {
        self.parent.as_mut()
    }

    /// Convert arguments for a direct `query`/`exec` using the connection's
    /// validator and the default converter.
    pub fn bind(&self, params: &[NamedParam]) -> Result<Vec<NamedValue>> {
        let checker = self.parent.value_checker();
        let conn = checker.as_deref().map(|c| c as &dyn NamedValueChecker);
        validation::convert_all(None, conn, params)
    }
}

impl Conn for WrappedConn {
    fn prepare(&mut self, ctx: &Context, query: &str) -> Result<Box<dyn Stmt>> {
        let (stmt_ctx, stmt) = self
            .mw
            .interceptor()
            .conn_prepare(ctx, self.parent.as_mut(), query)?;
        Ok(Box::new(WrappedStmt::new(
            self.mw.clone(),
            stmt_ctx,
            query,
            stmt,
            self.parent.value_checker(),
        )))
    }

    fn query(&mut self, ctx: &Context, query: &str, args: &[NamedValue]) -> Result<Box<dyn Rows>> {
        let (rows_ctx, rows) = self
            .mw
            .interceptor()
            .conn_query(ctx, self.parent.as_mut(), query, args)?;
        picker::wrap_rows(&self.mw, rows_ctx, rows)
    }

    fn exec(&mut self, ctx: &Context, query: &str, args: &[NamedValue]) -> Result<Box<dyn ExecResult>> {
        let res = self
            .mw
            .interceptor()
            .conn_exec(ctx, self.parent.as_mut(), query, args)?;
        Ok(Box::new(WrappedResult::new(self.mw.clone(), res)))
    }

    fn begin(&mut self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>> {
        let (tx_ctx, tx) = self
            .mw
            .interceptor()
            .conn_begin_tx(ctx, self.parent.as_mut(), opts)?;
        Ok(Box::new(WrappedTx::new(self.mw.clone(), tx_ctx, tx)))
    }

    fn ping(&mut self, ctx: &Context) -> Result<()> {
        self.mw.interceptor().conn_ping(ctx, self.parent.as_mut())
    }

    fn reset_session(&mut self, ctx: &Context) -> Result<()> {
        self.mw.interceptor().conn_reset_session(ctx, self.parent.as_mut())
    }

    fn close(&mut self) -> Result<()> {
        self.parent.close()
    }

    fn value_checker(&self) -> Option<Arc<dyn NamedValueChecker + Send + Sync>> {
        self.parent.value_checker()
    }
}
