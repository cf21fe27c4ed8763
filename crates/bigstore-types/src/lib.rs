//! Foundation types for bigstore.
//!
//! This crate provides the identifiers shared by every other bigstore crate:
//!
//! - [`Namespace`] — per-store identifier embedded in every chunk key
//! - [`ChunkKey`] — content-addressed backend key of a single chunk

pub mod chunk;
pub mod error;
pub mod namespace;

pub use chunk::{ChunkKey, CHUNK_KEY_PREFIX, DIGEST_LEN};
pub use error::TypeError;
pub use namespace::Namespace;
