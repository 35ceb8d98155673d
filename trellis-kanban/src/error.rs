//! Error types for the kanban engine

use crate::sync::MoveState;
use crate::types::TaskStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors produced at the store boundary.
///
/// Everything the remote store can reject with maps onto one of these:
/// `Unauthorized` (missing membership or role), `NotFound` (the record was
/// deleted concurrently), and the transient family (`Unavailable`,
/// `Timeout`, `LockBusy`) where a retry is a reasonable caller decision.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller lacks membership or the required role
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A record does not exist (possibly deleted by another actor)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Store not initialized at the given path
    #[error("store not initialized at {path}")]
    NotInitialized { path: PathBuf },

    /// Store already exists
    #[error("store already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// The store cannot be reached
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The store did not answer within the configured bound
    #[error("store timeout after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// Lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an unauthorized error
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::LockBusy
        )
    }
}

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// A move named a task that is not in the claimed source column
    #[error("task {id} not found in column {status}")]
    TaskNotInColumn { id: String, status: TaskStatus },

    /// A move named an insertion index past the end of the destination
    #[error("index {index} out of range for column {status} (len {len})")]
    IndexOutOfRange {
        index: usize,
        status: TaskStatus,
        len: usize,
    },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A persisted move was rejected by the store. `state` reports how the
    /// optimistic board state was resolved: `Reverted` after a successful
    /// rollback fetch, `Failed` when the board was left optimistic.
    #[error("move of task {id} failed ({state}): {source}")]
    MoveFailed {
        id: String,
        state: MoveState,
        source: StoreError,
    },

    /// Store error outside of a move
    #[error(transparent)]
    Store(#[from] StoreError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
