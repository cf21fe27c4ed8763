//! Content hashing for bigstore.
//!
//! Wraps BLAKE3 behind a domain-separated hasher that turns chunk bytes into
//! [`ChunkKey`](bigstore_types::ChunkKey)s. No custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
