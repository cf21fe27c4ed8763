/// Errors reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// An item is larger than the backend's per-item ceiling.
    #[error("item {key} is {size} bytes, exceeding the per-item quota of {quota} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },

    /// The backend could not serve the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
