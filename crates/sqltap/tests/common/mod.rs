//! In-memory driver shared by the integration tests.
//!
//! Every object records the calls it receives in a [`CallLog`], and the
//! cursor's capability set is chosen at runtime through a [`CapabilityMask`].

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sqltap::{Capability, CapabilityMask};
use sqltap_core::{
    Advance, CancellationToken, Check, Conn, Connector, Context, Driver, Error, ExecResult,
    LoggingConfig, NamedParam, NamedValue, NamedValueChecker, Result, Rows,
    RowsColumnTypeDatabaseTypeName, RowsColumnTypeLength, RowsColumnTypeNullable,
    RowsColumnTypePrecisionScale, RowsColumnTypeScanType, RowsNextResultSet, Stmt, Tx, TxOptions,
    Value, ValueKind,
};

pub fn init_logging() {
    let _ = sqltap_core::logging::init(&LoggingConfig {
        filter: "debug".to_string(),
        with_target: true,
    });
}

/// Ordered record of calls, shared between a fixture and the test.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

// -----------------------------------------------------------------------------
// Rows
// -----------------------------------------------------------------------------

/// What a second `close` does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoubleClose {
    #[default]
    Ok,
    Error,
}

pub struct FakeRows {
    mask: CapabilityMask,
    columns: Vec<String>,
    type_names: Vec<String>,
    data: VecDeque<Vec<Value>>,
    extra_sets: VecDeque<Vec<Vec<Value>>>,
    cancel: Option<CancellationToken>,
    closes: Arc<AtomicUsize>,
    double_close: DoubleClose,
    log: CallLog,
}

impl FakeRows {
    pub fn new(mask: CapabilityMask) -> Self {
        Self {
            mask,
            columns: vec!["id".to_string(), "name".to_string()],
            type_names: vec!["INT8".to_string(), "VARCHAR".to_string()],
            data: VecDeque::new(),
            extra_sets: VecDeque::new(),
            cancel: None,
            closes: Arc::new(AtomicUsize::new(0)),
            double_close: DoubleClose::Ok,
            log: CallLog::default(),
        }
    }

    pub fn with_capabilities(capabilities: &[Capability]) -> Self {
        Self::new(capabilities.iter().copied().collect())
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.data = rows.into();
        self
    }

    pub fn with_result_set(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.extra_sets.push_back(rows);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_close_counter(mut self, closes: Arc<AtomicUsize>) -> Self {
        self.closes = closes;
        self
    }

    pub fn with_double_close(mut self, double_close: DoubleClose) -> Self {
        self.double_close = double_close;
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    fn has(&self, capability: Capability) -> bool {
        self.mask.contains(capability)
    }
}

impl Rows for FakeRows {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn next(&mut self, dest: &mut [Value]) -> Result<Advance> {
        self.log.record("rows.next");
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Error::Cancelled);
        }
        match self.data.pop_front() {
            Some(row) => {
                for (slot, value) in dest.iter_mut().zip(row) {
                    *slot = value;
                }
                Ok(Advance::Row)
            }
            None => Ok(Advance::Exhausted),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.log.record("rows.close");
        let previous = self.closes.fetch_add(1, Ordering::SeqCst);
        if previous > 0 && self.double_close == DoubleClose::Error {
            return Err(Error::driver("sql: rows are closed"));
        }
        Ok(())
    }

    fn as_next_result_set(&self) -> Option<&dyn RowsNextResultSet> {
        if !self.has(Capability::NextResultSet) {
            return None;
        }
        Some(self)
    }

    fn as_next_result_set_mut(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        if !self.has(Capability::NextResultSet) {
            return None;
        }
        Some(self)
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        if !self.has(Capability::ColumnTypeDatabaseTypeName) {
            return None;
        }
        Some(self)
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        if !self.has(Capability::ColumnTypeLength) {
            return None;
        }
        Some(self)
    }

    fn as_column_type_nullable(&self) -> Option<&dyn RowsColumnTypeNullable> {
        if !self.has(Capability::ColumnTypeNullable) {
            return None;
        }
        Some(self)
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        if !self.has(Capability::ColumnTypePrecisionScale) {
            return None;
        }
        Some(self)
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        if !self.has(Capability::ColumnTypeScanType) {
            return None;
        }
        Some(self)
    }
}

impl RowsNextResultSet for FakeRows {
    fn has_next_result_set(&self) -> bool {
        !self.extra_sets.is_empty()
    }

    fn next_result_set(&mut self) -> Result<()> {
        match self.extra_sets.pop_front() {
            Some(rows) => {
                self.data = rows.into();
                Ok(())
            }
            None => Err(Error::driver("no more result sets")),
        }
    }
}

impl RowsColumnTypeDatabaseTypeName for FakeRows {
    fn column_type_database_type_name(&self, index: usize) -> String {
        self.type_names.get(index).cloned().unwrap_or_default()
    }
}

impl RowsColumnTypeLength for FakeRows {
    fn column_type_length(&self, index: usize) -> Option<i64> {
        (index == 1).then_some(255)
    }
}

impl RowsColumnTypeNullable for FakeRows {
    fn column_type_nullable(&self, index: usize) -> Option<bool> {
        Some(index != 0)
    }
}

impl RowsColumnTypePrecisionScale for FakeRows {
    fn column_type_precision_scale(&self, _index: usize) -> Option<(i64, i64)> {
        None
    }
}

impl RowsColumnTypeScanType for FakeRows {
    fn column_type_scan_type(&self, index: usize) -> ValueKind {
        if index == 0 {
            ValueKind::Int64
        } else {
            ValueKind::Text
        }
    }
}

/// Presence of each catalog capability on `rows`, in catalog order, followed
/// by the presence of the mutable result-set accessor.
pub fn probe(rows: &mut dyn Rows) -> [bool; 7] {
    let view: &dyn Rows = &*rows;
    let shared = Capability::ALL.map(|c| c.is_implemented_by(view));
    let mutable = rows.as_next_result_set_mut().is_some();
    [
        shared[0], shared[1], shared[2], shared[3], shared[4], shared[5], mutable,
    ]
}

/// Transparent wrapper a hook may put around driver rows.
pub struct Passthrough {
    pub inner: Box<dyn Rows>,
    pub unwrap: bool,
}

impl Rows for Passthrough {
    fn columns(&self) -> Vec<String> {
        self.inner.columns()
    }

    fn next(&mut self, dest: &mut [Value]) -> Result<Advance> {
        self.inner.next(dest)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn rows_unwrap(&self) -> Option<&dyn Rows> {
        if !self.unwrap {
            return None;
        }
        Some(self.inner.as_ref())
    }

    fn rows_unwrap_mut(&mut self) -> Option<&mut dyn Rows> {
        if !self.unwrap {
            return None;
        }
        Some(self.inner.as_mut())
    }
}

// -----------------------------------------------------------------------------
// Validators
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Outcome {
    Accept(Value),
    Decline,
    Reject(&'static str),
}

/// Validator returning a fixed outcome and counting its calls.
pub struct ScriptedChecker {
    name: &'static str,
    outcome: Outcome,
    log: CallLog,
}

impl ScriptedChecker {
    pub fn shared(
        name: &'static str,
        outcome: Outcome,
        log: &CallLog,
    ) -> Arc<dyn NamedValueChecker + Send + Sync> {
        Arc::new(Self {
            name,
            outcome,
            log: log.clone(),
        })
    }
}

impl NamedValueChecker for ScriptedChecker {
    fn check_named_value(&self, param: &NamedParam) -> Result<Check> {
        self.log.record(format!("{}.check {}", self.name, param.ordinal));
        match &self.outcome {
            Outcome::Accept(value) => Ok(Check::Accept(value.clone())),
            Outcome::Decline => Ok(Check::Decline),
            Outcome::Reject(message) => Err(Error::driver(*message)),
        }
    }
}

// -----------------------------------------------------------------------------
// Driver, connector, connection, statement, transaction, result
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectorMode {
    /// `open_connector` returns `None`.
    #[default]
    Absent,
    Native,
    Broken,
}

/// Shared settings for every object the fake driver creates.
#[derive(Clone, Default)]
pub struct Fixture {
    pub mask: CapabilityMask,
    pub rows: Vec<Vec<Value>>,
    pub conn_checker: Option<Arc<dyn NamedValueChecker + Send + Sync>>,
    pub stmt_checker: Option<Arc<dyn NamedValueChecker + Send + Sync>>,
    pub connector: ConnectorMode,
    pub double_close: DoubleClose,
    pub log: CallLog,
}

impl Fixture {
    pub fn new(mask: CapabilityMask) -> Self {
        Self {
            mask,
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn driver(&self) -> Arc<dyn Driver> {
        Arc::new(FakeDriver {
            fixture: self.clone(),
        })
    }

    pub fn conn(&self) -> Box<dyn Conn> {
        Box::new(FakeConn {
            fixture: self.clone(),
        })
    }

    fn rows(&self, ctx: &Context) -> FakeRows {
        FakeRows::new(self.mask)
            .with_rows(self.rows.clone())
            .with_cancel(ctx.cancellation().clone())
            .with_double_close(self.double_close)
            .with_log(self.log.clone())
    }
}

pub struct FakeDriver {
    fixture: Fixture,
}

impl Driver for FakeDriver {
    fn open(&self, name: &str) -> Result<Box<dyn Conn>> {
        self.fixture.log.record(format!("driver.open {name}"));
        Ok(self.fixture.conn())
    }

    fn open_connector(&self, name: &str) -> Option<Result<Box<dyn Connector>>> {
        match self.fixture.connector {
            ConnectorMode::Absent => None,
            ConnectorMode::Native => Some(Ok(Box::new(FakeConnector {
                name: name.to_string(),
                fixture: self.fixture.clone(),
            }))),
            ConnectorMode::Broken => Some(Err(Error::driver(format!("invalid dsn: {name}")))),
        }
    }
}

pub struct FakeConnector {
    name: String,
    fixture: Fixture,
}

impl Connector for FakeConnector {
    fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>> {
        ctx.check_cancelled()?;
        self.fixture.log.record(format!("connector.connect {}", self.name));
        Ok(self.fixture.conn())
    }
}

pub struct FakeConn {
    fixture: Fixture,
}

impl Conn for FakeConn {
    fn prepare(&mut self, _ctx: &Context, query: &str) -> Result<Box<dyn Stmt>> {
        self.fixture.log.record(format!("conn.prepare {query}"));
        Ok(Box::new(FakeStmt {
            fixture: self.fixture.clone(),
            closed: false,
        }))
    }

    fn query(&mut self, ctx: &Context, query: &str, _args: &[NamedValue]) -> Result<Box<dyn Rows>> {
        ctx.check_cancelled()?;
        self.fixture.log.record(format!("conn.query {query}"));
        Ok(Box::new(self.fixture.rows(ctx)))
    }

    fn exec(&mut self, ctx: &Context, query: &str, args: &[NamedValue]) -> Result<Box<dyn ExecResult>> {
        ctx.check_cancelled()?;
        self.fixture.log.record(format!("conn.exec {query}"));
        Ok(Box::new(FakeResult {
            last_insert_id: 7,
            rows_affected: args.len() as i64,
        }))
    }

    fn begin(&mut self, _ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>> {
        self.fixture.log.record(format!("conn.begin read_only={}", opts.read_only));
        Ok(Box::new(FakeTx {
            log: self.fixture.log.clone(),
        }))
    }

    fn ping(&mut self, ctx: &Context) -> Result<()> {
        ctx.check_cancelled()?;
        self.fixture.log.record("conn.ping");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.fixture.log.record("conn.close");
        Ok(())
    }

    fn value_checker(&self) -> Option<Arc<dyn NamedValueChecker + Send + Sync>> {
        self.fixture.conn_checker.clone()
    }
}

pub struct FakeStmt {
    fixture: Fixture,
    closed: bool,
}

impl Stmt for FakeStmt {
    fn num_input(&self) -> Option<usize> {
        Some(1)
    }

    fn exec(&mut self, _ctx: &Context, args: &[NamedValue]) -> Result<Box<dyn ExecResult>> {
        self.fixture.log.record("stmt.exec");
        Ok(Box::new(FakeResult {
            last_insert_id: 1,
            rows_affected: args.len() as i64,
        }))
    }

    fn query(&mut self, ctx: &Context, _args: &[NamedValue]) -> Result<Box<dyn Rows>> {
        ctx.check_cancelled()?;
        self.fixture.log.record("stmt.query");
        Ok(Box::new(self.fixture.rows(ctx)))
    }

    fn close(&mut self) -> Result<()> {
        self.fixture.log.record("stmt.close");
        if self.closed {
            return Err(Error::driver("statement already closed"));
        }
        self.closed = true;
        Ok(())
    }

    fn as_value_checker(&self) -> Option<&dyn NamedValueChecker> {
        self.fixture
            .stmt_checker
            .as_deref()
            .map(|c| c as &dyn NamedValueChecker)
    }
}

pub struct FakeTx {
    log: CallLog,
}

impl Tx for FakeTx {
    fn commit(&mut self) -> Result<()> {
        self.log.record("tx.commit");
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.log.record("tx.rollback");
        Ok(())
    }
}

pub struct FakeResult {
    last_insert_id: i64,
    rows_affected: i64,
}

impl ExecResult for FakeResult {
    fn last_insert_id(&self) -> Result<i64> {
        Ok(self.last_insert_id)
    }

    fn rows_affected(&self) -> Result<i64> {
        Ok(self.rows_affected)
    }
}
