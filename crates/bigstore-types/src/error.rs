use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid namespace {0:?}: must be non-empty and contain no ':'")]
    InvalidNamespace(String),

    #[error("not a chunk key of this namespace: {0}")]
    ForeignKey(String),

    #[error("invalid base64 digest in {key}: {reason}")]
    InvalidDigest { key: String, reason: String },

    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
