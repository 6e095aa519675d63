//! Audit storage backends.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use sqltap_core::{AuditConfig, StorageBackend};
use uuid::Uuid;

use crate::error::AuditError;
use crate::event::{AuditEvent, AuditEventType};

/// Filter for querying audit events.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by event type.
    pub event_type: Option<AuditEventType>,
    /// Filter by correlation ID.
    pub correlation_id: Option<String>,
    /// Only events whose driver call failed.
    pub failures_only: bool,
    /// Filter by start time.
    pub start_time: Option<DateTime<Utc>>,
    /// Filter by end time.
    pub end_time: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl AuditFilter {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(event_type) = self.event_type {
            if event.event_type != event_type {
                return false;
            }
        }
        if let Some(ref id) = self.correlation_id {
            if event.correlation_id.as_ref() != Some(id) {
                return false;
            }
        }
        if self.failures_only && !event.is_failure() {
            return false;
        }
        if let Some(start) = self.start_time {
            if event.occurred_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if event.occurred_at > end {
                return false;
            }
        }
        true
    }

    /// Apply the filter, then offset and limit, to a list of events.
    pub fn apply<'a>(&self, events: impl IntoIterator<Item = &'a AuditEvent>) -> Vec<AuditEvent> {
        events
            .into_iter()
            .filter(|e| self.matches(e))
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Trait for audit storage backends.
pub trait AuditStorage: Send + Sync {
    /// Store an audit event.
    fn store(&self, event: AuditEvent) -> Result<(), AuditError>;

    /// Query audit events with filters.
    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError>;

    /// Get an audit event by ID.
    fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError>;
}

/// Create a storage backend based on configuration.
pub fn create_storage(config: &AuditConfig) -> Result<Box<dyn AuditStorage>, AuditError> {
    if !config.enabled {
        return Ok(Box::new(NullStorage));
    }
    match config.storage.backend {
        StorageBackend::Null => Ok(Box::new(NullStorage)),
        StorageBackend::Console => Ok(Box::new(ConsoleStorage)),
        StorageBackend::Memory => Ok(Box::new(MemoryStorage::new())),
        StorageBackend::File => {
            let path = config.storage.file_path.as_deref().ok_or_else(|| {
                AuditError::InitializationFailed("file backend requires storage.file_path".to_string())
            })?;
            Ok(Box::new(FileStorage::open(path)?))
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullStorage;

impl AuditStorage for NullStorage {
    fn store(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn query(&self, _filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(vec![])
    }

    fn get(&self, _event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(None)
    }
}

/// Console storage (logs JSON lines to stdout).
#[derive(Debug, Default)]
pub struct ConsoleStorage;

impl AuditStorage for ConsoleStorage {
    fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(&event)?;
        println!("{}", json);
        Ok(())
    }

    fn query(&self, _filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        // Console storage doesn't support querying
        Ok(vec![])
    }

    fn get(&self, _event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(None)
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored events in insertion order.
    pub fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let events = self.events.read().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(events.clone())
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut events = self.events.write().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        events.push(event);
        Ok(())
    }
}

impl AuditStorage for MemoryStorage {
    fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.push(event)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        let events = self.events.read().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(filter.apply(events.iter()))
    }

    fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        let events = self.events.read().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(events.iter().find(|e| e.event_id == event_id).cloned())
    }
}

/// File storage (appends JSON lines to a log file).
///
/// Events already present in the file are loaded on open so that queries
/// cover earlier runs as well. Lines that do not parse (such as a write cut
/// short by a crash) are skipped with a warning.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    writer: Mutex<()>,
    memory: MemoryStorage,
}

impl FileStorage {
    /// Open (or create) the log file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let memory = MemoryStorage::new();
        if path.exists() {
            let bytes = fs::read(&path)?;
            let content = String::from_utf8_lossy(&bytes);
            for (index, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str(line) {
                    Ok(event) => memory.push(event)?,
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            line = index + 1,
                            error = %e,
                            "skipping unreadable audit log line"
                        );
                    }
                }
            }

            // Terminate a partial last line so new events start on their own.
            if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                let mut file = OpenOptions::new().append(true).open(&path)?;
                writeln!(file)?;
            }
        }

        Ok(Self {
            path,
            writer: Mutex::new(()),
            memory,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStorage for FileStorage {
    fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(&event)?;

        {
            let _guard = self.writer.lock().map_err(|e| {
                AuditError::StorageError(format!("Failed to acquire file lock: {}", e))
            })?;
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            writeln!(file, "{}", json)?;
        }

        // Also store in memory for querying
        self.memory.push(event)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        self.memory.query(filter)
    }

    fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        self.memory.get(event_id)
    }
}
