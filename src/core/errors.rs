/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the synchronization primitives
///
/// Every failure is local to the call that produced it. Lookups that find
/// nothing return `None` rather than an error.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Lock order violated: requested rank {requested} while holding rank {held}")]
    #[diagnostic(
        code(sync::order_violation),
        help("Acquire hierarchical mutexes in strictly decreasing rank order.")
    )]
    OrderViolation { requested: u64, held: u64 },

    #[error("Container is empty")]
    #[diagnostic(
        code(sync::empty),
        help("Use try_pop() for an optional result or wait_and_pop() to block.")
    )]
    Empty,

    #[error("Timed out after {millis}ms waiting for a value")]
    #[diagnostic(
        code(sync::timeout),
        help("No producer pushed a value before the deadline. Retry or check the producer side.")
    )]
    Timeout { millis: u64 },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(sync::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Configuration(String),
}

impl SyncError {
    /// Whether retrying the same call later may succeed
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Empty | SyncError::Timeout { .. })
    }
}

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
