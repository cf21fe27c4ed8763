//! Backend interface for bigstore.
//!
//! A backend is an async key-value store of JSON values that enforces a hard
//! per-item size limit, such as an extension storage area. bigstore only
//! depends on the [`StorageArea`] trait; this crate also provides
//! [`InMemoryStorageArea`] for tests and embedding.
//!
//! # Contract
//!
//! 1. Every call is batched: one call reads, writes or deletes many keys.
//! 2. Absent keys are omitted from read results, never reported as errors.
//! 3. Deleting an absent key is not an error.
//! 4. A write whose item exceeds the backend's ceiling fails.
//! 5. No atomicity is promised for a failed batch beyond what the concrete
//!    backend documents.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BackendError, BackendResult};
pub use memory::{CallCounts, InMemoryStorageArea};
pub use traits::StorageArea;
