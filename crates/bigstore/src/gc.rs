//! Reference resolution for garbage-collecting chunks on delete.
//!
//! No reference counts are persisted. Each delete recomputes the live set by
//! scanning every surviving manifest in the backend, so its cost grows with
//! the size of the whole store rather than with the keys being deleted.

use std::collections::{BTreeMap, BTreeSet};

use bigstore_types::{ChunkKey, Namespace};
use serde_json::Value;
use tracing::debug;

use crate::manifest::Manifest;

/// The backend deletions one delete call must issue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletePlan {
    /// Logical keys requested for deletion.
    pub keys: BTreeSet<String>,
    /// Chunks referenced by the deleted manifests and by nothing else.
    pub orphans: BTreeSet<ChunkKey>,
    /// Chunks referenced by the deleted manifests that a surviving manifest
    /// still references.
    pub retained: BTreeSet<ChunkKey>,
}

impl DeletePlan {
    /// Every backend key to remove: the logical keys followed by the orphans.
    pub fn backend_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .cloned()
            .chain(self.orphans.iter().map(ToString::to_string))
            .collect()
    }
}

/// Finds which chunks a set of entries keeps alive.
#[derive(Clone, Debug)]
pub struct ReferenceResolver {
    namespace: Namespace,
}

impl ReferenceResolver {
    pub fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    /// Chunk keys referenced by the manifests among `entries`.
    ///
    /// Chunk entries carry no references and are skipped. Manifest-shaped
    /// entries that are not manifests of this namespace reference nothing
    /// this store could reclaim, so they are skipped too.
    pub fn referenced<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
    ) -> BTreeSet<ChunkKey> {
        let mut referenced = BTreeSet::new();
        for (key, value) in entries {
            if self.namespace.owns(key) {
                continue;
            }
            match Manifest::parse(key, value, &self.namespace) {
                Ok(Some(manifest)) => referenced.extend(manifest.chunks().iter().cloned()),
                Ok(None) => {}
                Err(e) => debug!(key = %key, error = %e, "ignoring manifest-shaped entry"),
            }
        }
        referenced
    }

    /// Chunks referenced by every entry of `all` except those in `deleting`.
    pub fn live_set(
        &self,
        all: &BTreeMap<String, Value>,
        deleting: &BTreeSet<String>,
    ) -> BTreeSet<ChunkKey> {
        self.referenced(all.iter().filter(|(key, _)| !deleting.contains(*key)))
    }

    /// Split `candidates` into orphans and chunks kept alive by `live`.
    pub fn plan(
        &self,
        keys: BTreeSet<String>,
        candidates: BTreeSet<ChunkKey>,
        live: &BTreeSet<ChunkKey>,
    ) -> DeletePlan {
        let (retained, orphans): (BTreeSet<_>, BTreeSet<_>) = candidates
            .into_iter()
            .partition(|chunk| live.contains(chunk));
        DeletePlan {
            keys,
            orphans,
            retained,
        }
    }
}
