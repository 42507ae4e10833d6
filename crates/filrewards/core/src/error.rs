use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Reward service errors.
#[derive(Debug, Error)]
pub enum RewardsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("claim amount {requested} is greater than available reward balance {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RewardsError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Caller-side failures that must not be retried as-is.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::InsufficientBalance { .. }
        )
    }
}

/// Usage-tracking sink errors. Logged, never surfaced to callers.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking transport error: {0}")]
    Transport(String),

    #[error("tracking endpoint rejected event with status {0}")]
    Rejected(u16),
}
