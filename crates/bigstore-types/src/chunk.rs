use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::TypeError;
use crate::namespace::Namespace;

/// Leading tag of every chunk key.
pub const CHUNK_KEY_PREFIX: &str = "chunk-";

/// Length in bytes of a chunk content digest.
pub const DIGEST_LEN: usize = 32;

/// Length of a base64-encoded digest (with padding).
const ENCODED_DIGEST_LEN: usize = DIGEST_LEN.div_ceil(3) * 4;

/// Content-addressed backend key of a chunk.
///
/// Rendered as `chunk-<namespace>:<base64(digest)>`. Two chunks with identical
/// bytes in the same namespace always map to the same key, which is what lets
/// unrelated values share chunks.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    namespace: Namespace,
    digest: [u8; DIGEST_LEN],
}

impl ChunkKey {
    pub fn new(namespace: Namespace, digest: [u8; DIGEST_LEN]) -> Self {
        Self { namespace, digest }
    }

    /// Parse a rendered key, requiring it to belong to `namespace`.
    pub fn parse(key: &str, namespace: &Namespace) -> Result<Self, TypeError> {
        let prefix = namespace.chunk_prefix();
        let encoded = key
            .strip_prefix(prefix.as_str())
            .ok_or_else(|| TypeError::ForeignKey(key.to_string()))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| TypeError::InvalidDigest {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        let digest: [u8; DIGEST_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: DIGEST_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self::new(namespace.clone(), digest))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Namespace part of `key` if it has the shape of a chunk key of any
    /// namespace, e.g. `Some("ns")` for `chunk-ns:AAAA`.
    pub fn namespace_of(key: &str) -> Option<&str> {
        let (namespace, _) = key.strip_prefix(CHUNK_KEY_PREFIX)?.split_once(':')?;
        (!namespace.is_empty()).then_some(namespace)
    }

    /// Returns `true` if `key` has the shape of a chunk key, whichever store
    /// wrote it.
    pub fn is_chunk_key(key: &str) -> bool {
        Self::namespace_of(key).is_some()
    }

    /// Length in bytes of any rendered chunk key in `namespace`.
    pub fn rendered_len(namespace: &Namespace) -> usize {
        namespace.chunk_prefix().len() + ENCODED_DIGEST_LEN
    }
}

impl fmt::Debug for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkKey({self})")
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.namespace.chunk_prefix(),
            STANDARD.encode(self.digest)
        )
    }
}
