use bigstore_crypto::ContentHasher;
use bigstore_types::{ChunkKey, Namespace};
use serde_json::Value;

use crate::codec;
use crate::config::StoreConfig;
use crate::error::StorageResult;

/// One content-addressed piece of an encoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub key: ChunkKey,
    pub data: Vec<u8>,
}

impl Chunk {
    /// Stored representation of the chunk's bytes.
    pub fn to_value(&self) -> Value {
        codec::chunk_to_value(&self.data)
    }
}

/// Splits encoded values into pieces that fit the backend ceiling.
///
/// Every piece has the same length except the last. The length is the
/// largest multiple of three whose base64 payload, quoted and stored next
/// to its key, stays within `max_item_bytes`.
#[derive(Clone, Debug)]
pub struct Chunker {
    namespace: Namespace,
    piece_len: usize,
}

impl Chunker {
    pub fn new(config: &StoreConfig) -> StorageResult<Self> {
        config.validate()?;
        // Base64 characters left once the key and the quotes are accounted for.
        let budget = config.max_item_bytes
            - ChunkKey::rendered_len(&config.namespace)
            - codec::chunk_value_len(0);
        Ok(Self {
            namespace: config.namespace.clone(),
            piece_len: budget / 4 * 3,
        })
    }

    /// Raw bytes carried by each full piece.
    pub fn piece_len(&self) -> usize {
        self.piece_len
    }

    /// Split `encoded` into ordered, content-addressed chunks.
    ///
    /// Deterministic: equal input always yields the same chunk sequence.
    pub fn split(&self, encoded: &[u8]) -> Vec<Chunk> {
        encoded
            .chunks(self.piece_len)
            .map(|piece| Chunk {
                key: ContentHasher::CHUNK.chunk_key(&self.namespace, piece),
                data: piece.to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chunker(max_item_bytes: usize) -> Chunker {
        Chunker::new(&StoreConfig::with_max_item_bytes(max_item_bytes)).unwrap()
    }

    #[test]
    fn piece_len_for_small_ceiling() {
        // 200 - 87 (key) - 2 (quotes) = 111 chars -> 27 quartets -> 81 bytes.
        assert_eq!(chunker(200).piece_len(), 81);
        assert_eq!(chunker(93).piece_len(), 3);
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Chunker::new(&StoreConfig::with_max_item_bytes(10)).is_err());
    }

    #[test]
    fn split_concatenates_to_input() {
        let encoded = codec::encode(&json!("a".repeat(200))).unwrap();
        let chunks = chunker(200).split(&encoded);
        assert_eq!(
            chunks.iter().map(|c| c.data.len()).collect::<Vec<_>>(),
            vec![81, 81, 40]
        );
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data.clone()).collect();
        assert_eq!(joined, encoded);
    }

    #[test]
    fn split_is_deterministic() {
        let data = vec![7u8; 1000];
        assert_eq!(chunker(200).split(&data), chunker(200).split(&data));
    }

    #[test]
    fn identical_pieces_share_keys() {
        let data = vec![b'a'; 81 * 3];
        let chunks = chunker(200).split(&data);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].key, chunks[1].key);
        assert_eq!(chunks[1].key, chunks[2].key);
    }

    #[test]
    fn every_chunk_entry_fits_ceiling() {
        for max in [93, 100, 200, 1024] {
            let chunker = chunker(max);
            let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
            for chunk in chunker.split(&data) {
                let stored = serde_json::to_vec(&chunk.to_value()).unwrap();
                let size = chunk.key.to_string().len() + stored.len();
                assert!(size <= max, "chunk entry of {size} bytes exceeds {max}");
            }
        }
    }

    #[test]
    fn keys_verify_against_content() {
        for chunk in chunker(200).split(b"some bytes that get hashed") {
            assert!(ContentHasher::CHUNK.verify(&chunk.data, &chunk.key));
        }
    }
}
