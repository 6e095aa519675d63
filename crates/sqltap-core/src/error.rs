//! Error types shared by drivers and the middleware layer.

use std::fmt;

use thiserror::Error;

/// Convenience alias used across the driver contract.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by drivers or by the interception layer.
///
/// `Driver`, `Cancelled` and `Skip` originate in the wrapped driver and are
/// surfaced verbatim. The remaining variants are integration faults raised by
/// the middleware itself and are never retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the wrapped driver.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),

    /// The driver observed cancellation of the request context.
    #[error("operation cancelled")]
    Cancelled,

    /// The driver does not provide this optional fast path.
    #[error("driver skipped optional operation")]
    Skip,

    /// Unwrapping a rows wrapper chain did not terminate.
    #[error("rows unwrap chain exceeded {limit} levels (cycle or runaway wrapper)")]
    Cycle { limit: usize },

    /// A wrapper exposed its inner rows for inspection but not for mutation.
    #[error("rows wrapper at depth {depth} does not expose its inner rows mutably")]
    BrokenUnwrap { depth: usize },

    /// No validator handled the parameter and the default converter cannot represent it.
    #[error("unsupported value for parameter {ordinal} ({kind}): {reason}")]
    UnsupportedValue {
        ordinal: usize,
        kind: String,
        reason: String,
    },

    /// Operation attempted on a cursor in a state that forbids it.
    #[error("{operation} called on {state} rows")]
    Misuse {
        operation: &'static str,
        state: CursorState,
    },
}

impl Error {
    /// Wrap an arbitrary driver failure.
    pub fn driver(message: impl fmt::Display) -> Self {
        Self::Driver(anyhow::anyhow!("{message}"))
    }

    /// Build an unsupported-value error for the given parameter.
    pub fn unsupported(ordinal: usize, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            ordinal,
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the wrapped driver rather than the middleware.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::Driver(_) | Self::Cancelled | Self::Skip)
    }
}

/// Lifecycle state of an intercepted cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Opened, no row requested yet.
    Open,
    /// The last advance materialized a row.
    RowAvailable,
    /// The last advance reported end of data.
    Exhausted,
    /// Close was called.
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::RowAvailable => write!(f, "positioned"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_classification() {
        assert!(Error::Cancelled.is_pass_through());
        assert!(Error::Skip.is_pass_through());
        assert!(Error::driver("boom").is_pass_through());
        assert!(!Error::Cycle { limit: 4 }.is_pass_through());
        assert!(
            !Error::Misuse {
                operation: "next",
                state: CursorState::Closed
            }
            .is_pass_through()
        );
    }

    #[test]
    fn test_driver_error_message_is_verbatim() {
        let err = Error::driver("connection reset by peer");
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[test]
    fn test_misuse_message() {
        let err = Error::Misuse {
            operation: "next",
            state: CursorState::Closed,
        };
        assert_eq!(err.to_string(), "next called on closed rows");
    }
}
