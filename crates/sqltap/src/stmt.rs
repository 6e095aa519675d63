//! Prepared statement shim.

use std::sync::Arc;

use sqltap_core::{
    Check, Context, ExecResult, NamedParam, NamedValue, NamedValueChecker, Result, Rows, Stmt,
};

use crate::middleware::Middleware;
use crate::picker;
use crate::result::WrappedResult;
use crate::validation::{self, Converted};

type SharedChecker = Arc<dyn NamedValueChecker + Send + Sync>;

/// A prepared statement carrying the context returned by `conn_prepare`.
///
/// The statement is itself a [`NamedValueChecker`] that runs the whole
/// validation chain, so code above the middleware sees a single validator.
pub struct WrappedStmt {
    mw: Middleware,
    ctx: Context,
    query: String,
    parent: Box<dyn Stmt>,
    conn_checker: Option<SharedChecker>,
}

impl WrappedStmt {
    pub fn new(
        mw: Middleware,
        ctx: Context,
        query: impl Into<String>,
        parent: Box<dyn Stmt>,
        conn_checker: Option<SharedChecker>,
    ) -> Self {
        Self {
            mw,
            ctx,
            query: query.into(),
            parent,
            conn_checker,
        }
    }

    /// Context returned by the `conn_prepare` hook.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn query_text(&self) -> &str {
        &self.query
    }

    pub fn parent(&self) -> &dyn Stmt {
        self.parent.as_ref()
    }

    pub fn parent_mut(&mut self) -> &mut dyn Stmt {
        self.parent.as_mut()
    }

    /// Run one parameter through statement, connection and default converters.
    pub fn check_and_convert(&self, param: &NamedParam) -> Result<Converted> {
        validation::check_and_convert(self.parent.as_value_checker(), self.conn_checker(), param)
    }

    /// Convert a full argument list.
    pub fn bind(&self, params: &[NamedParam]) -> Result<Vec<NamedValue>> {
        validation::convert_all(self.parent.as_value_checker(), self.conn_checker(), params)
    }

    fn conn_checker(&self) -> Option<&dyn NamedValueChecker> {
        self.conn_checker.as_deref().map(|c| c as &dyn NamedValueChecker)
    }
}

impl Stmt for WrappedStmt {
    fn num_input(&self) -> Option<usize> {
        self.parent.num_input()
    }

    fn exec(&mut self, ctx: &Context, args: &[NamedValue]) -> Result<Box<dyn ExecResult>> {
        let res = self
            .mw
            .interceptor()
            .stmt_exec(ctx, self.parent.as_mut(), &self.query, args)?;
        Ok(Box::new(WrappedResult::new(self.mw.clone(), res)))
    }

    fn query(&mut self, ctx: &Context, args: &[NamedValue]) -> Result<Box<dyn Rows>> {
        let (rows_ctx, rows) = self
            .mw
            .interceptor()
            .stmt_query(ctx, self.parent.as_mut(), &self.query, args)?;
        picker::wrap_rows(&self.mw, rows_ctx, rows)
    }

    fn close(&mut self) -> Result<()> {
        self.mw.interceptor().stmt_close(&self.ctx, self.parent.as_mut())
    }

    fn as_value_checker(&self) -> Option<&dyn NamedValueChecker> {
        Some(self)
    }
}

impl NamedValueChecker for WrappedStmt {
    fn check_named_value(&self, param: &NamedParam) -> Result<Check> {
        self.check_and_convert(param).map(|converted| Check::Accept(converted.value))
    }
}
