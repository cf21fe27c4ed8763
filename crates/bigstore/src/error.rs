use bigstore_backend::BackendError;
use thiserror::Error;

/// Errors from store configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_item_bytes must be greater than zero")]
    ZeroItemBytes,

    /// The ceiling leaves no room for a chunk payload next to its key.
    #[error("max_item_bytes {max_item_bytes} is below the minimum of {minimum} for this namespace")]
    ItemBytesTooSmall { max_item_bytes: usize, minimum: usize },

    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Errors from bigstore operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A backend read failed.
    #[error("backend read failed: {0}")]
    BackendRead(#[source] BackendError),

    /// A backend write or delete failed.
    #[error("backend write failed: {0}")]
    BackendWrite(#[source] BackendError),

    /// A value could not be encoded, or stored bytes could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A manifest references a chunk that is missing or damaged.
    #[error("corrupt manifest {key}: {reason}")]
    ManifestCorruption { key: String, reason: String },

    /// An entry has the manifest shape but is not a manifest of this store.
    #[error("ambiguous entry {key}: {reason}")]
    AmbiguousEntry { key: String, reason: String },

    /// The key is reserved for chunk entries.
    #[error("key {0} is reserved for chunk entries")]
    ReservedKey(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for bigstore operations.
pub type StorageResult<T> = Result<T, StorageError>;
