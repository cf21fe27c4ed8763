use bigstore_types::{ChunkKey, Namespace, DIGEST_LEN};

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation, so digests from
/// different hashers never agree on the same bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for value chunks.
    pub const CHUNK: Self = Self {
        domain: "bigstore-chunk-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Content-addressed key of `data` within `namespace`.
    pub fn chunk_key(&self, namespace: &Namespace, data: &[u8]) -> ChunkKey {
        ChunkKey::new(namespace.clone(), self.hash(data))
    }

    /// Verify that `data` is the content addressed by `key`.
    pub fn verify(&self, data: &[u8], key: &ChunkKey) -> bool {
        self.hash(data) == *key.digest()
    }
}
