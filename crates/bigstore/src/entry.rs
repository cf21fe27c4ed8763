use bigstore_types::Namespace;
use serde_json::Value;

use crate::codec;
use crate::error::{StorageError, StorageResult};
use crate::manifest::Manifest;

/// What a backend entry holds, as seen by this store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredEntry {
    /// A logical value stored as-is.
    Simple(Value),
    /// The chunk list of an oversized logical value.
    Manifest(Manifest),
    /// Raw bytes of one chunk.
    Chunk(Vec<u8>),
}

impl StoredEntry {
    /// Classify the backend entry `key => value`.
    ///
    /// Chunks are recognised by key shape alone. Any other entry is a
    /// manifest if [`Manifest::parse`] accepts it, and simple otherwise.
    pub fn classify(key: &str, value: Value, namespace: &Namespace) -> StorageResult<Self> {
        if namespace.owns(key) {
            return codec::chunk_from_value(&value)
                .map(Self::Chunk)
                .ok_or_else(|| StorageError::ManifestCorruption {
                    key: key.to_string(),
                    reason: "chunk payload is not a base64 string".into(),
                });
        }
        match Manifest::parse(key, &value, namespace)? {
            Some(manifest) => Ok(Self::Manifest(manifest)),
            None => Ok(Self::Simple(value)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Manifest(_) => "manifest",
            Self::Chunk(_) => "chunk",
        }
    }
}

#[cfg(test)]
mod tests {
    use bigstore_crypto::ContentHasher;
    use serde_json::json;

    use super::*;

    fn ns() -> Namespace {
        Namespace::default()
    }

    #[test]
    fn simple_values() {
        for value in [json!(2), json!("foo"), json!({"intField": 2, "stringField": ""})] {
            let entry = StoredEntry::classify("k", value.clone(), &ns()).unwrap();
            assert_eq!(entry, StoredEntry::Simple(value));
        }
    }

    #[test]
    fn manifests() {
        let manifest = Manifest::new(vec![ContentHasher::CHUNK.chunk_key(&ns(), b"x")]);
        let entry = StoredEntry::classify("k", manifest.to_value(), &ns()).unwrap();
        assert_eq!(entry.kind(), "manifest");
        assert_eq!(entry, StoredEntry::Manifest(manifest));
    }

    #[test]
    fn chunks_are_classified_by_key() {
        let key = ContentHasher::CHUNK.chunk_key(&ns(), b"payload").to_string();
        let entry = StoredEntry::classify(&key, codec::chunk_to_value(b"payload"), &ns()).unwrap();
        assert_eq!(entry, StoredEntry::Chunk(b"payload".to_vec()));

        // The same value under a logical key is just a string.
        let entry = StoredEntry::classify("k", codec::chunk_to_value(b"payload"), &ns()).unwrap();
        assert_eq!(entry.kind(), "simple");
    }

    #[test]
    fn damaged_chunk_payload() {
        let key = format!("{}anything", ns().chunk_prefix());
        assert!(matches!(
            StoredEntry::classify(&key, json!(12), &ns()),
            Err(StorageError::ManifestCorruption { .. })
        ));
    }

    #[test]
    fn other_namespace_chunks_are_not_ours() {
        let other = Namespace::new("other").unwrap();
        let key = ContentHasher::CHUNK.chunk_key(&other, b"p").to_string();
        let entry = StoredEntry::classify(&key, codec::chunk_to_value(b"p"), &ns()).unwrap();
        assert_eq!(entry.kind(), "simple");
    }
}
