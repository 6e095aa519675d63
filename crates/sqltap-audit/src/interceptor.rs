//! Interceptor that records every driver call as an audit event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use sqltap::Interceptor;
use sqltap_core::{
    Advance, AuditConfig, Conn, Connector, Context, Error, ExecResult, NamedValue, Result, Rows,
    Stmt, Tx, TxOptions, Value,
};
use uuid::Uuid;

use crate::error::AuditError;
use crate::event::{AuditEvent, AuditEventBuilder, AuditEventType};
use crate::storage::{create_storage, AuditFilter, AuditStorage, NullStorage};

/// Context key of the correlation id shared by related events.
pub const CORRELATION_ID: &str = "sqltap.audit.correlation_id";

/// Context key of the per-cursor [`RowCounter`].
pub const ROW_COUNTER: &str = "sqltap.audit.row_counter";

/// Rows fetched through one cursor.
#[derive(Debug, Default)]
pub struct RowCounter(AtomicU64);

impl RowCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Correlation id carried by `ctx`, if any.
pub fn correlation_id(ctx: &Context) -> Option<&str> {
    ctx.value::<String>(CORRELATION_ID).map(String::as_str)
}

/// Records audit events around each intercepted call.
///
/// Storage failures are logged and never change what the driver returned.
pub struct AuditInterceptor {
    config: AuditConfig,
    storage: Arc<dyn AuditStorage>,
}

impl AuditInterceptor {
    /// Create an interceptor with the storage selected by `config`.
    pub fn new(config: AuditConfig) -> std::result::Result<Self, AuditError> {
        let storage: Arc<dyn AuditStorage> = Arc::from(create_storage(&config)?);
        Ok(Self { config, storage })
    }

    /// Create an interceptor with a custom storage backend.
    pub fn with_storage(config: AuditConfig, storage: Arc<dyn AuditStorage>) -> Self {
        Self { config, storage }
    }

    /// Create a disabled interceptor; calls pass through unrecorded.
    pub fn disabled() -> Self {
        Self {
            config: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            storage: Arc::new(NullStorage),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn storage(&self) -> &Arc<dyn AuditStorage> {
        &self.storage
    }

    /// Query recorded events.
    pub fn query(&self, filter: &AuditFilter) -> std::result::Result<Vec<AuditEvent>, AuditError> {
        self.storage.query(filter)
    }

    /// Events of one query, statement or transaction.
    pub fn correlated(&self, correlation_id: &str) -> std::result::Result<Vec<AuditEvent>, AuditError> {
        self.query(&AuditFilter {
            correlation_id: Some(correlation_id.to_string()),
            ..Default::default()
        })
    }

    /// Record an event.
    pub fn record(&self, event: AuditEvent) {
        if !self.config.enabled {
            return;
        }

        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            correlation_id = event.correlation_id.as_deref().unwrap_or("-"),
            failed = event.is_failure(),
            "Audit event"
        );

        if let Err(e) = self.storage.store(event) {
            tracing::warn!(error = %e, "failed to store audit event");
        }
    }

    fn event(&self, event_type: AuditEventType, ctx: &Context) -> AuditEventBuilder {
        let builder = AuditEvent::builder(event_type);
        match correlation_id(ctx) {
            Some(id) => builder.correlation_id(id),
            None => builder,
        }
    }

    fn with_sql(&self, builder: AuditEventBuilder, query: &str) -> AuditEventBuilder {
        if self.config.log_queries {
            builder.sql(query)
        } else {
            builder
        }
    }

    fn with_args(&self, builder: AuditEventBuilder, args: &[NamedValue]) -> AuditEventBuilder {
        if self.config.log_args {
            builder.arg_count(args.len())
        } else {
            builder
        }
    }

    /// Stamp duration and outcome, then record.
    fn finish<T>(&self, builder: AuditEventBuilder, started: Instant, result: &Result<T>) {
        let duration = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let builder = builder.duration_ms(duration);
        let builder = match result {
            Ok(_) => builder,
            Err(e) => builder.error(e.to_string()),
        };
        self.record(builder.build());
    }
}

/// The driver declined the direct path; the caller prepares instead.
fn is_skip<T>(result: &Result<T>) -> bool {
    matches!(result, Err(Error::Skip))
}

/// Give `ctx` a correlation id unless the caller already set one.
fn correlate(ctx: &Context) -> Context {
    if correlation_id(ctx).is_some() {
        return ctx.clone();
    }
    ctx.with_value(CORRELATION_ID, Uuid::new_v4().to_string())
}

impl Interceptor for AuditInterceptor {
    fn connector_connect(&self, ctx: &Context, connector: &dyn Connector) -> Result<Box<dyn Conn>> {
        let started = Instant::now();
        let result = connector.connect(ctx);
        self.finish(self.event(AuditEventType::Connect, ctx), started, &result);
        result
    }

    fn conn_begin_tx(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        opts: TxOptions,
    ) -> Result<(Context, Box<dyn Tx>)> {
        let ctx = correlate(ctx);
        let started = Instant::now();
        let result = conn.begin(&ctx, opts);
        self.finish(self.event(AuditEventType::Begin, &ctx), started, &result);
        Ok((ctx, result?))
    }

    fn conn_prepare(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
    ) -> Result<(Context, Box<dyn Stmt>)> {
        let ctx = correlate(ctx);
        let started = Instant::now();
        let result = conn.prepare(&ctx, query);
        let builder = self.with_sql(self.event(AuditEventType::Prepare, &ctx), query);
        self.finish(builder, started, &result);
        Ok((ctx, result?))
    }

    fn conn_ping(&self, ctx: &Context, conn: &mut dyn Conn) -> Result<()> {
        let started = Instant::now();
        let result = conn.ping(ctx);
        self.finish(self.event(AuditEventType::Ping, ctx), started, &result);
        result
    }

    fn conn_exec(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>> {
        let started = Instant::now();
        let result = conn.exec(ctx, query, args);
        if is_skip(&result) {
            return result;
        }
        let builder = self.with_sql(self.event(AuditEventType::Exec, ctx), query);
        self.finish(self.with_args(builder, args), started, &result);
        result
    }

    fn conn_query(
        &self,
        ctx: &Context,
        conn: &mut dyn Conn,
        query: &str,
        args: &[NamedValue],
    ) -> Result<(Context, Box<dyn Rows>)> {
        let ctx = correlate(ctx).with_value(ROW_COUNTER, RowCounter::default());
        let started = Instant::now();
        let result = conn.query(&ctx, query, args);
        if is_skip(&result) {
            return Err(Error::Skip);
        }
        let builder = self.with_sql(self.event(AuditEventType::Query, &ctx), query);
        self.finish(self.with_args(builder, args), started, &result);
        Ok((ctx, result?))
    }

    fn conn_reset_session(&self, ctx: &Context, conn: &mut dyn Conn) -> Result<()> {
        let started = Instant::now();
        let result = conn.reset_session(ctx);
        self.finish(self.event(AuditEventType::ResetSession, ctx), started, &result);
        result
    }

    fn rows_next(&self, ctx: &Context, rows: &mut dyn Rows, dest: &mut [Value]) -> Result<Advance> {
        let started = Instant::now();
        let result = rows.next(dest);
        if let Ok(Advance::Row) = result {
            if let Some(counter) = ctx.value::<RowCounter>(ROW_COUNTER) {
                counter.increment();
            }
        }
        if self.config.log_rows || result.is_err() {
            self.finish(self.event(AuditEventType::Fetch, ctx), started, &result);
        }
        result
    }

    fn rows_close(&self, ctx: &Context, rows: &mut dyn Rows) -> Result<()> {
        let started = Instant::now();
        let result = rows.close();
        let mut builder = self.event(AuditEventType::RowsClosed, ctx);
        if let Some(counter) = ctx.value::<RowCounter>(ROW_COUNTER) {
            builder = builder.row_count(counter.get());
        }
        self.finish(builder, started, &result);
        result
    }

    fn stmt_exec(
        &self,
        ctx: &Context,
        stmt: &mut dyn Stmt,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>> {
        let started = Instant::now();
        let result = stmt.exec(ctx, args);
        let builder = self.with_sql(self.event(AuditEventType::Exec, ctx), query);
        self.finish(self.with_args(builder, args), started, &result);
        result
    }

    fn stmt_query(
        &self,
        ctx: &Context,
        stmt: &mut dyn Stmt,
        query: &str,
        args: &[NamedValue],
    ) -> Result<(Context, Box<dyn Rows>)> {
        let ctx = correlate(ctx).with_value(ROW_COUNTER, RowCounter::default());
        let started = Instant::now();
        let result = stmt.query(&ctx, args);
        let builder = self.with_sql(self.event(AuditEventType::Query, &ctx), query);
        self.finish(self.with_args(builder, args), started, &result);
        Ok((ctx, result?))
    }

    fn stmt_close(&self, ctx: &Context, stmt: &mut dyn Stmt) -> Result<()> {
        let started = Instant::now();
        let result = stmt.close();
        self.finish(self.event(AuditEventType::StmtClosed, ctx), started, &result);
        result
    }

    fn tx_commit(&self, ctx: &Context, tx: &mut dyn Tx) -> Result<()> {
        let started = Instant::now();
        let result = tx.commit();
        self.finish(self.event(AuditEventType::Commit, ctx), started, &result);
        result
    }

    fn tx_rollback(&self, ctx: &Context, tx: &mut dyn Tx) -> Result<()> {
        let started = Instant::now();
        let result = tx.rollback();
        self.finish(self.event(AuditEventType::Rollback, ctx), started, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlate_keeps_existing_id() {
        let ctx = Context::new().with_value(CORRELATION_ID, "caller-1".to_string());
        assert_eq!(correlation_id(&correlate(&ctx)), Some("caller-1"));
    }

    #[test]
    fn test_correlate_assigns_uuid() {
        let ctx = correlate(&Context::new());
        let id = correlation_id(&ctx).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_disabled_records_nothing() {
        let interceptor = AuditInterceptor::disabled();
        assert!(!interceptor.is_enabled());
        interceptor.record(AuditEvent::new(AuditEventType::Ping));
        assert!(interceptor.query(&AuditFilter::default()).unwrap().is_empty());
    }
}
