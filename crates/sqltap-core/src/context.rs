//! Request-scoped context threaded through every intercepted call.
//!
//! A [`Context`] is an immutable chain of key/value entries plus a
//! cancellation signal. Extending it with [`Context::with_value`] returns a new
//! context that shares the existing entries, so a value published by an
//! earlier hook stays visible, untouched, to every later hook that receives a
//! descendant context.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

struct Entry {
    key: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Immutable, cheaply clonable request context.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
    cancel: CancellationToken,
}

impl Context {
    /// An empty context with a fresh, never-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a child context carrying `value` under `key`.
    ///
    /// A later entry with the same key shadows earlier ones.
    pub fn with_value<T>(&self, key: &'static str, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
            cancel: self.cancel.clone(),
        }
    }

    /// Return a child context that observes `token` for cancellation.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            head: self.head.clone(),
            cancel: token,
        }
    }

    /// Look up the newest value stored under `key`.
    ///
    /// Returns `None` when the key is absent or holds a value of another type.
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().any(|entry| entry.key == key)
    }

    /// Keys from newest to oldest, including shadowed ones.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries().map(|entry| entry.key)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Error::Cancelled)` once the context's token has fired.
    ///
    /// Intended for drivers; the middleware itself never calls it.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
