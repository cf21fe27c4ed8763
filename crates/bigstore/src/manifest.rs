use bigstore_types::{ChunkKey, Namespace};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{StorageError, StorageResult};

/// Wire shape of a manifest record.
///
/// Unknown fields are tolerated and a missing marker reads as `false`, so
/// that ordinary user objects with a `chunks` field are not mistaken for
/// manifests.
#[derive(Deserialize)]
struct ManifestRecord {
    #[serde(rename = "bigValueManifest", default)]
    valid: bool,
    chunks: Vec<String>,
}

/// Indirection record listing the ordered chunks of an oversized value.
///
/// A value is recognised as a manifest by shape (`chunks` is a list of
/// strings) plus the `bigValueManifest: true` marker. A user value that
/// mimics this shape exactly will be read back as a manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    chunks: Vec<ChunkKey>,
}

impl Manifest {
    pub fn new(chunks: Vec<ChunkKey>) -> Self {
        Self { chunks }
    }

    /// Chunk keys in reassembly order. May contain repeats.
    pub fn chunks(&self) -> &[ChunkKey] {
        &self.chunks
    }

    pub fn to_value(&self) -> Value {
        let chunks: Vec<String> = self.chunks.iter().map(ToString::to_string).collect();
        serde_json::json!({
            "bigValueManifest": true,
            "chunks": chunks,
        })
    }

    /// Interpret the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the value is not manifest-shaped or its marker
    /// is unset, and `AmbiguousEntry` when it carries the marker but does not
    /// describe chunks of `namespace`.
    pub fn parse(key: &str, value: &Value, namespace: &Namespace) -> StorageResult<Option<Self>> {
        let Ok(record) = ManifestRecord::deserialize(value) else {
            return Ok(None);
        };
        if !record.valid {
            return Ok(None);
        }
        if record.chunks.is_empty() {
            return Err(StorageError::AmbiguousEntry {
                key: key.to_string(),
                reason: "manifest lists no chunks".into(),
            });
        }
        let chunks = record
            .chunks
            .iter()
            .map(|chunk| ChunkKey::parse(chunk, namespace))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::AmbiguousEntry {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(Self { chunks }))
    }

    /// Returns `true` if `value` is a manifest written by a store of another
    /// namespace: it carries the marker and every chunk key belongs to one
    /// namespace other than `namespace`.
    pub fn is_foreign(value: &Value, namespace: &Namespace) -> bool {
        let Ok(record) = ManifestRecord::deserialize(value) else {
            return false;
        };
        let mut owners = record.chunks.iter().map(|chunk| ChunkKey::namespace_of(chunk));
        match owners.next() {
            Some(Some(owner)) if record.valid && owner != namespace.as_str() => {
                owners.all(|other| other == Some(owner))
            }
            _ => false,
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

    fn sample() -> Manifest {
        Manifest::new(vec![
            ContentHasher::CHUNK.chunk_key(&ns(), b"one"),
            ContentHasher::CHUNK.chunk_key(&ns(), b"two"),
        ])
    }

    #[test]
    fn value_shape() {
        let value = sample().to_value();
        assert_eq!(value["bigValueManifest"], json!(true));
        let chunks = value["chunks"].as_array().unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| ns().owns(c.as_str().unwrap())));
    }

    #[test]
    fn parse_own_output() {
        let manifest = sample();
        let parsed = Manifest::parse("k", &manifest.to_value(), &ns()).unwrap();
        assert_eq!(parsed, Some(manifest));
    }

    #[test]
    fn plain_values_are_not_manifests() {
        for value in [
            json!(2),
            json!("foo"),
            json!(null),
            json!({"intField": 2, "stringField": ""}),
            json!({"chunks": ["a", "b"]}),
            json!({"bigValueManifest": false, "chunks": []}),
            json!({"bigValueManifest": "yes", "chunks": []}),
            json!({"bigValueManifest": true, "chunks": [1, 2]}),
        ] {
            assert_eq!(Manifest::parse("k", &value, &ns()).unwrap(), None, "{value}");
        }
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let mut value = sample().to_value();
        value["note"] = json!("extra");
        assert_eq!(Manifest::parse("k", &value, &ns()).unwrap(), Some(sample()));
    }

    #[test]
    fn marked_record_with_foreign_chunks_is_ambiguous() {
        let value = json!({"bigValueManifest": true, "chunks": ["not-a-chunk"]});
        let err = Manifest::parse("k", &value, &ns()).unwrap_err();
        assert!(matches!(err, StorageError::AmbiguousEntry { ref key, .. } if key == "k"));

        let other = Namespace::new("other").unwrap();
        let value = sample().to_value();
        assert!(matches!(
            Manifest::parse("k", &value, &other),
            Err(StorageError::AmbiguousEntry { .. })
        ));
    }

    #[test]
    fn foreign_manifests() {
        let other = Namespace::new("other").unwrap();
        let theirs = Manifest::new(vec![ContentHasher::CHUNK.chunk_key(&other, b"x")]).to_value();
        assert!(Manifest::is_foreign(&theirs, &ns()));
        assert!(!Manifest::is_foreign(&theirs, &other));
        assert!(!Manifest::is_foreign(&sample().to_value(), &ns()));

        for value in [
            json!({"bigValueManifest": true, "chunks": ["not-a-chunk"]}),
            json!({"bigValueManifest": true, "chunks": []}),
            json!({"bigValueManifest": false, "chunks": ["chunk-other:AAAA"]}),
            json!({"bigValueManifest": true, "chunks": ["chunk-other:AAAA", "chunk-else:AAAA"]}),
            json!(2),
        ] {
            assert!(!Manifest::is_foreign(&value, &ns()), "{value}");
        }
    }

    #[test]
    fn marked_record_without_chunks_is_ambiguous() {
        let value = json!({"bigValueManifest": true, "chunks": []});
        assert!(matches!(
            Manifest::parse("k", &value, &ns()),
            Err(StorageError::AmbiguousEntry { .. })
        ));
    }
}
