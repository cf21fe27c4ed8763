//! Canonical encoding of logical values and chunk payloads.
//!
//! Logical values encode to compact JSON. `serde_json::Map` keeps keys sorted,
//! so equal values always encode to equal bytes. Chunk payloads are raw byte
//! slices of such an encoding, stored as base64 JSON strings so that a piece
//! may end in the middle of a UTF-8 sequence.
//!
//! Sorted keys depend on `serde_json` being built without its
//! `preserve_order` feature. Features are unified across the dependency
//! graph, so any crate enabling it makes the encoding follow insertion order:
//! equal objects built in a different order then get different chunk keys and
//! stop sharing chunks. Reads stay correct; only deduplication is lost.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{StorageError, StorageResult};

/// Canonical byte form of a logical value.
pub fn encode(value: &Value) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StorageError::Encoding(e.to_string()))
}

/// Decode a canonical byte form back into a logical value.
pub fn decode(bytes: &[u8]) -> StorageResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Encoding(e.to_string()))
}

/// Stored representation of a chunk payload.
pub fn chunk_to_value(data: &[u8]) -> Value {
    Value::String(STANDARD.encode(data))
}

/// Raw bytes of a stored chunk payload, or `None` if the value is not one.
pub fn chunk_from_value(value: &Value) -> Option<Vec<u8>> {
    value.as_str().and_then(|s| STANDARD.decode(s).ok())
}

/// Encoded size of a chunk payload of `len` raw bytes, quotes included.
pub fn chunk_value_len(len: usize) -> usize {
    len.div_ceil(3) * 4 + 2
}
