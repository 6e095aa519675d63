//! The hook contract exposed to integrators.
//!
//! An [`Interceptor`] has one method per intercepted operation. Every method
//! receives the current [`Context`], the object the operation targets and the
//! operation's arguments. The default bodies call straight through, so an
//! implementation overrides only the operations it cares about.
//!
//! Hooks that create a derived object (`conn_prepare`, `conn_query`,
//! `conn_begin_tx`, `stmt_query`) also return a context. That context is
//! attached to the derived object and handed to every later hook that targets
//! it, up to and including its close, commit or rollback.
//!
//! A hook may return its own object in place of the one produced by the
//! driver. Later hooks then receive that object. A substituted `Rows` should
//! implement [`Rows::rows_unwrap`]; otherwise its own capability shape is
//! used instead of the driver cursor's.

use sqltap_core::{
    Advance, Conn, Connector, Context, ExecResult, NamedValue, Result, Rows, Stmt, Tx, TxOptions,
    Value,
};

pub trait Interceptor: Send + Sync {
    // Connector

    fn connector_connect(&self, ctx: &Context, connector: &dyn Connector) -> Result<Box<dyn Conn>> {
        connector.connect(ctx)
    }

    // Conn

    fn conn_begin_tx(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        opts: TxOptions,
    ) -> Result<(Context, Box<dyn Tx>)> {
        let tx = conn.begin(ctx, opts)?;
        Ok((ctx.clone(), tx))
    }

    fn conn_prepare(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
    ) -> Result<(Context, Box<dyn Stmt>)> {
        let stmt = conn.prepare(ctx, query)?;
        Ok((ctx.clone(), stmt))
    }

    fn conn_ping(&self, ctx: &Context, conn: &mut dyn Conn) -> Result<()> {
        conn.ping(ctx)
    }

    fn conn_exec(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>> {
        conn.exec(ctx, query, args)
    }

    fn conn_query(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
        args: &[NamedValue],
    ) -> Result<(Context, Box<dyn Rows>)> {
        let rows = conn.query(ctx, query, args)?;
        Ok((ctx.clone(), rows))
    }

    fn conn_reset_session(&self, ctx: &Context, conn: &mut dyn Conn) -> Result<()> {
        conn.reset_session(ctx)
    }

    // ExecResult

    fn result_last_insert_id(&self, res: &dyn ExecResult) -> Result<i64> {
        res.last_insert_id()
    }

    fn result_rows_affected(&self, res: &dyn ExecResult) -> Result<i64> {
        res.rows_affected()
    }

    // Rows

    /// Advance the cursor. Called once per `next`, including the call that
    /// reports exhaustion.
    fn rows_next(&self, _ctx: &Context, rows: &mut dyn Rows, dest: &mut [Value]) -> Result<Advance> {
        rows.next(dest)
    }

    fn rows_close(&self, _ctx: &Context, rows: &mut dyn Rows) -> Result<()> {
        rows.close()
    }

    // Stmt

    fn stmt_exec(
        &self,
        ctx: &Context,
        stmt: &mut dyn Stmt,
        _query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>> {
        stmt.exec(ctx, args)
    }

    fn stmt_query(
        &self,
        ctx: &Context,
        stmt: &mut dyn Stmt,
        _query: &str,
        args: &[NamedValue],
    ) -> Result<(Context, Box<dyn Rows>)> {
        let rows = stmt.query(ctx, args)?;
        Ok((ctx.clone(), rows))
    }

    /// `ctx` is the context returned by the `conn_prepare` that created `stmt`.
    fn stmt_close(&self, _ctx: &Context, stmt: &mut dyn Stmt) -> Result<()> {
        stmt.close()
    }

    // Tx

    fn tx_commit(&self, _ctx: &Context, tx: &mut dyn Tx) -> Result<()> {
        tx.commit()
    }

    fn tx_rollback(&self, _ctx: &Context, tx: &mut dyn Tx) -> Result<()> {
        tx.rollback()
    }
}

/// Interceptor that overrides nothing; every call goes straight to the driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInterceptor;

impl Interceptor for NullInterceptor {}
