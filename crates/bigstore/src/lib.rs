//! Overlay storage for values larger than a backend's per-item limit.
//!
//! Backends such as extension storage areas reject any item above a fixed
//! size. [`BigStorage`] hides that limit: values that fit are stored as-is,
//! and larger ones are split into content-addressed chunks referenced by a
//! manifest stored under the caller's key.
//!
//! # Stored entries
//!
//! - *Simple* — the value itself, when its JSON encoding fits `max_item_bytes`
//! - *Manifest* — `{"bigValueManifest": true, "chunks": [...]}` listing chunk
//!   keys in reassembly order
//! - *Chunk* — base64 of one slice of an encoded value, stored under
//!   `chunk-<namespace>:<base64(hash)>`
//!
//! Identical slices hash to the same chunk key, so values sharing content
//! share chunks. Deleting a key removes the chunks no surviving manifest
//! references; there is no background collection.
//!
//! # Limitations
//!
//! 1. A user value shaped exactly like a manifest is read back as one.
//! 2. Delete rescans every manifest in the backend to compute live chunks.
//! 3. Manifests themselves are not bounded by `max_item_bytes`.
//! 4. Calls are not isolated from each other; conflicting calls must be
//!    serialized by the caller.
//! 5. Stores sharing a backend share its logical key space. Namespaces only
//!    keep their chunks apart.

pub mod chunker;
pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod gc;
pub mod manifest;
pub mod store;

pub use chunker::{Chunk, Chunker};
pub use config::StoreConfig;
pub use entry::StoredEntry;
pub use error::{ConfigError, StorageError, StorageResult};
pub use gc::{DeletePlan, ReferenceResolver};
pub use manifest::Manifest;
pub use store::BigStorage;

// Re-export key types
pub use bigstore_backend::{BackendError, InMemoryStorageArea, StorageArea};
pub use bigstore_types::{ChunkKey, Namespace};
