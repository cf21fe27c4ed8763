use std::collections::{BTreeMap, BTreeSet};

use bigstore_backend::StorageArea;
use bigstore_crypto::ContentHasher;
use bigstore_types::{ChunkKey, Namespace};
use serde_json::Value;
use tracing::{debug, warn};

use crate::chunker::Chunker;
use crate::codec;
use crate::config::StoreConfig;
use crate::entry::StoredEntry;
use crate::error::{StorageError, StorageResult};
use crate::gc::{DeletePlan, ReferenceResolver};
use crate::manifest::Manifest;

/// Stores values of any size on a backend with a per-item ceiling.
///
/// Values whose encoding fits `max_item_bytes` are written as-is. Larger ones
/// are split into content-addressed chunks plus a manifest under the logical
/// key. Chunks are shared between every value containing the same piece and
/// are reclaimed by [`delete`](Self::delete) once nothing references them.
///
/// The store keeps no state besides its configuration and takes no locks.
/// Concurrent calls that touch the same keys or chunks race; callers must
/// serialize them.
pub struct BigStorage<B> {
    backend: B,
    config: StoreConfig,
    chunker: Chunker,
    resolver: ReferenceResolver,
}

impl<B: StorageArea> BigStorage<B> {
    /// Create a store over `backend`. Fails if `config` is invalid.
    pub fn new(backend: B, config: StoreConfig) -> StorageResult<Self> {
        let chunker = Chunker::new(&config)?;
        let resolver = ReferenceResolver::new(config.namespace.clone());
        Ok(Self {
            backend,
            config,
            chunker,
            resolver,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn namespace(&self) -> &Namespace {
        &self.config.namespace
    }

    /// Keys shaped like chunk keys are reserved for every namespace, since
    /// stores sharing a backend skip each other's chunks.
    fn ensure_logical(&self, key: &str) -> StorageResult<()> {
        if ChunkKey::is_chunk_key(key) {
            return Err(StorageError::ReservedKey(key.to_string()));
        }
        Ok(())
    }

    /// Returns `true` if a value stored as-is would be read back as a
    /// manifest, or rejected as an ambiguous one.
    fn mimics_manifest(&self, key: &str, value: &Value) -> bool {
        !matches!(Manifest::parse(key, value, self.namespace()), Ok(None))
    }

    /// Write all `items` in one backend call.
    ///
    /// Nothing is written if any key is reserved or any value fails to
    /// encode. A backend failure fails the whole call, and the backend may
    /// have applied part of the batch.
    pub async fn set(&self, items: BTreeMap<String, Value>) -> StorageResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut staged = BTreeMap::new();
        let mut simple = 0usize;
        let mut chunked = 0usize;
        for (key, value) in items {
            self.ensure_logical(&key)?;
            let encoded = codec::encode(&value)?;
            if encoded.len() <= self.config.max_item_bytes {
                if self.mimics_manifest(&key, &value) {
                    warn!(key = %key, "storing a value shaped like a manifest");
                }
                staged.insert(key, value);
                simple += 1;
                continue;
            }

            let chunks = self.chunker.split(&encoded);
            let manifest = Manifest::new(chunks.iter().map(|c| c.key.clone()).collect());
            // Identical pieces map to the same key, so repeats collapse here.
            for chunk in chunks {
                staged.insert(chunk.key.to_string(), chunk.to_value());
            }
            staged.insert(key, manifest.to_value());
            chunked += 1;
        }

        let writes = staged.len();
        self.backend
            .set(staged)
            .await
            .map_err(StorageError::BackendWrite)?;
        debug!(simple, chunked, writes, "set complete");
        Ok(())
    }

    /// Read the given logical keys.
    ///
    /// Absent keys are left out of the result; chunk keys are never returned.
    /// Chunks of every manifest found are fetched in one further call.
    pub async fn get(&self, keys: &[String]) -> StorageResult<BTreeMap<String, Value>> {
        let keys: Vec<String> = keys
            .iter()
            .filter(|key| !ChunkKey::is_chunk_key(key))
            .cloned()
            .collect();
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries = self
            .backend
            .get(&keys)
            .await
            .map_err(StorageError::BackendRead)?;
        let (mut values, manifests) = self.classify_all(entries)?;
        if manifests.is_empty() {
            return Ok(values);
        }

        let wanted: BTreeSet<String> = manifests
            .iter()
            .flat_map(|(_, manifest)| manifest.chunks().iter().map(ToString::to_string))
            .collect();
        let wanted: Vec<String> = wanted.into_iter().collect();
        let chunks = self
            .backend
            .get(&wanted)
            .await
            .map_err(StorageError::BackendRead)?;

        for (key, manifest) in manifests {
            let value = self.reassemble(&key, &manifest, &chunks)?;
            values.insert(key, value);
        }
        debug!(
            requested = keys.len(),
            found = values.len(),
            chunks = wanted.len(),
            "get complete"
        );
        Ok(values)
    }

    /// Read every logical entry in the backend with a single call.
    ///
    /// Chunks and manifests written by stores of other namespaces are
    /// skipped.
    pub async fn get_all(&self) -> StorageResult<BTreeMap<String, Value>> {
        let all = self
            .backend
            .get_all()
            .await
            .map_err(StorageError::BackendRead)?;
        let mut chunks = BTreeMap::new();
        let mut logical = BTreeMap::new();
        let mut foreign = 0usize;
        for (key, value) in all {
            if self.namespace().owns(&key) {
                chunks.insert(key, value);
            } else if ChunkKey::is_chunk_key(&key)
                || Manifest::is_foreign(&value, self.namespace())
            {
                foreign += 1;
            } else {
                logical.insert(key, value);
            }
        }

        let (mut values, manifests) = self.classify_all(logical)?;
        for (key, manifest) in manifests {
            let value = self.reassemble(&key, &manifest, &chunks)?;
            values.insert(key, value);
        }
        debug!(
            entries = values.len(),
            chunks = chunks.len(),
            foreign,
            "get_all complete"
        );
        Ok(values)
    }

    /// Delete the given logical keys and every chunk left unreferenced.
    ///
    /// Chunks still referenced by a surviving manifest are kept. Finding them
    /// reads the whole backend whenever a deleted key held a manifest.
    pub async fn delete(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        for key in keys {
            self.ensure_logical(key)?;
        }
        let deleting: BTreeSet<String> = keys.iter().cloned().collect();
        let requested: Vec<String> = deleting.iter().cloned().collect();

        let current = self
            .backend
            .get(&requested)
            .await
            .map_err(StorageError::BackendRead)?;
        let candidates = self.resolver.referenced(&current);

        let plan = if candidates.is_empty() {
            DeletePlan {
                keys: deleting,
                ..Default::default()
            }
        } else {
            let all = self
                .backend
                .get_all()
                .await
                .map_err(StorageError::BackendRead)?;
            let live = self.resolver.live_set(&all, &deleting);
            self.resolver.plan(deleting, candidates, &live)
        };

        self.backend
            .delete(&plan.backend_keys())
            .await
            .map_err(StorageError::BackendWrite)?;
        debug!(
            keys = plan.keys.len(),
            orphans = plan.orphans.len(),
            retained = plan.retained.len(),
            "delete complete"
        );
        Ok(())
    }

    /// Split logical entries into decoded simple values and manifests.
    fn classify_all(
        &self,
        entries: BTreeMap<String, Value>,
    ) -> StorageResult<(BTreeMap<String, Value>, Vec<(String, Manifest)>)> {
        let mut values = BTreeMap::new();
        let mut manifests = Vec::new();
        for (key, value) in entries {
            match StoredEntry::classify(&key, value, self.namespace()) {
                Ok(StoredEntry::Simple(value)) => {
                    values.insert(key, value);
                }
                Ok(StoredEntry::Manifest(manifest)) => manifests.push((key, manifest)),
                Ok(StoredEntry::Chunk(_)) => {}
                Err(e) => {
                    warn!(key = %key, error = %e, "unreadable entry");
                    return Err(e);
                }
            }
        }
        Ok((values, manifests))
    }

    /// Concatenate the manifest's chunks and decode the original value.
    fn reassemble(
        &self,
        key: &str,
        manifest: &Manifest,
        chunks: &BTreeMap<String, Value>,
    ) -> StorageResult<Value> {
        let mut encoded = Vec::new();
        for chunk_key in manifest.chunks() {
            let name = chunk_key.to_string();
            let corrupt = |reason: String| {
                warn!(key, chunk = %name, reason = %reason, "corrupt manifest");
                StorageError::ManifestCorruption {
                    key: key.to_string(),
                    reason,
                }
            };
            let stored = chunks
                .get(&name)
                .ok_or_else(|| corrupt(format!("missing chunk {name}")))?;
            let data = codec::chunk_from_value(stored)
                .ok_or_else(|| corrupt(format!("chunk {name} is not a base64 string")))?;
            if !ContentHasher::CHUNK.verify(&data, chunk_key) {
                return Err(corrupt(format!("chunk {name} does not match its hash")));
            }
            encoded.extend_from_slice(&data);
        }
        codec::decode(&encoded)
    }
}

impl<B> std::fmt::Debug for BigStorage<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigStorage")
            .field("max_item_bytes", &self.config.max_item_bytes)
            .field("namespace", &self.config.namespace)
            .finish()
    }
}
