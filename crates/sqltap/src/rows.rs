//! Interception of the mandatory cursor contract.

use sqltap_core::{Advance, Context, CursorState, Error, Result, Rows, Value};

use crate::middleware::Middleware;
use crate::unwrap;

/// Routes `next` and `close` of a cursor through the interceptor.
///
/// Holds the rows returned by the creating hook (which may be a
/// caller-defined wrapper) and the context that hook returned. Column names
/// and optional capabilities are not intercepted.
pub struct InterceptedRows {
    mw: Middleware,
    ctx: Context,
    parent: Box<dyn Rows>,
    state: CursorState,
}

impl InterceptedRows {
    pub fn new(mw: Middleware, ctx: Context, parent: Box<dyn Rows>) -> Self {
        Self {
            mw,
            ctx,
            parent,
            state: CursorState::Open,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// The rows handed to the hooks.
    pub fn parent(&self) -> &dyn Rows {
        self.parent.as_ref()
    }

    /// The driver's own cursor beneath any transparent wrappers.
    ///
    /// Optional capabilities are forwarded here.
    pub fn terminal(&self) -> Result<&dyn Rows> {
        unwrap::resolve(self.parent.as_ref(), self.mw.max_unwrap_depth())
    }

    pub fn terminal_mut(&mut self) -> Result<&mut dyn Rows> {
        unwrap::resolve_mut(self.parent.as_mut(), self.mw.max_unwrap_depth())
    }

    pub fn columns(&self) -> Vec<String> {
        self.parent.columns()
    }

    /// Advance through the `rows_next` hook.
    ///
    /// Fails with [`Error::Misuse`] once the cursor has been closed; driver
    /// errors leave the state unchanged.
    pub fn next(&mut self, dest: &mut [Value]) -> Result<Advance> {
        if self.state == CursorState::Closed {
            return Err(Error::Misuse {
                operation: "next",
                state: self.state,
            });
        }
        let advance = self
            .mw
            .interceptor()
            .rows_next(&self.ctx, self.parent.as_mut(), dest)?;
        self.state = match advance {
            Advance::Row => CursorState::RowAvailable,
            Advance::Exhausted => CursorState::Exhausted,
        };
        Ok(advance)
    }

    /// Close through the `rows_close` hook.
    ///
    /// A second close is passed to the hook as well; its outcome is whatever
    /// the driver reports for a double close.
    pub fn close(&mut self) -> Result<()> {
        let result = self.mw.interceptor().rows_close(&self.ctx, self.parent.as_mut());
        self.state = CursorState::Closed;
        result
    }
}
