//! Audit event types.
//!
//! One event is recorded per intercepted driver call. Events that belong to
//! the same query, statement or transaction share a correlation id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // ===== Connection lifecycle =====
    /// A connector produced a new connection.
    Connect,
    /// Connection liveness check.
    Ping,
    /// Session state reset before reuse.
    ResetSession,

    // ===== Statements =====
    /// A statement was prepared.
    Prepare,
    /// A statement ran without producing rows.
    Exec,
    /// A query opened a cursor.
    Query,
    /// A single row was fetched (only with `log_rows`).
    Fetch,
    /// A cursor was closed.
    RowsClosed,
    /// A prepared statement was closed.
    StmtClosed,

    // ===== Transactions =====
    Begin,
    Commit,
    Rollback,
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "CONNECT"),
            Self::Ping => write!(f, "PING"),
            Self::ResetSession => write!(f, "RESET_SESSION"),
            Self::Prepare => write!(f, "PREPARE"),
            Self::Exec => write!(f, "EXEC"),
            Self::Query => write!(f, "QUERY"),
            Self::Fetch => write!(f, "FETCH"),
            Self::RowsClosed => write!(f, "ROWS_CLOSED"),
            Self::StmtClosed => write!(f, "STMT_CLOSED"),
            Self::Begin => write!(f, "BEGIN"),
            Self::Commit => write!(f, "COMMIT"),
            Self::Rollback => write!(f, "ROLLBACK"),
        }
    }
}

/// An audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: Uuid,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,

    /// Event type.
    pub event_type: AuditEventType,

    /// SQL text (if applicable and enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    /// Number of bound arguments (if enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_count: Option<usize>,

    /// Rows fetched through a cursor, reported when it is closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,

    /// Time spent in the driver call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Error returned by the driver call, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Shared by all events of one query, statement or transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Additional metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub meta: serde_json::Value,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type,
            sql: None,
            arg_count: None,
            row_count: None,
            duration_ms: None,
            error: None,
            correlation_id: None,
            meta: serde_json::Value::Null,
        }
    }

    pub fn builder(event_type: AuditEventType) -> AuditEventBuilder {
        AuditEventBuilder::new(event_type)
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Format the event as a human-readable log line.
    ///
    /// Format: `[timestamp] EVENT_TYPE [correlation=...] [sql=...] ...`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {}",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.event_type,
        );

        if let Some(ref id) = self.correlation_id {
            line.push_str(&format!(" correlation={}", id));
        }

        if let Some(ref sql) = self.sql {
            // Truncate long SQL for console output
            let sql_preview: String = if sql.chars().count() > 100 {
                format!("{}...", sql.chars().take(100).collect::<String>())
            } else {
                sql.clone()
            };
            line.push_str(&format!(" sql=\"{}\"", sql_preview.replace('\n', " ")));
        }

        if let Some(args) = self.arg_count {
            line.push_str(&format!(" args={}", args));
        }

        if let Some(rows) = self.row_count {
            line.push_str(&format!(" rows={}", rows));
        }

        if let Some(duration) = self.duration_ms {
            line.push_str(&format!(" duration_ms={}", duration));
        }

        if let Some(ref error) = self.error {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        line
    }
}

/// Builder for creating audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event: AuditEvent::new(event_type),
        }
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.event.sql = Some(sql.into());
        self
    }

    pub fn arg_count(mut self, count: usize) -> Self {
        self.event.arg_count = Some(count);
        self
    }

    pub fn row_count(mut self, count: u64) -> Self {
        self.event.row_count = Some(count);
        self
    }

    pub fn duration_ms(mut self, duration: u64) -> Self {
        self.event.duration_ms = Some(duration);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.event.error = Some(error.into());
        self
    }

    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.event.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn meta(mut self, meta: serde_json::Value) -> Self {
        self.event.meta = meta;
        self
    }

    pub fn build(self) -> AuditEvent {
        self.event
    }
}
