use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::traits::StorageArea;

/// Number of calls served per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub get_all: usize,
    pub set: usize,
    pub delete: usize,
}

/// In-memory, `BTreeMap`-based storage area.
///
/// Intended for tests and embedding. An optional per-item quota mimics the
/// ceiling of real storage areas: it is measured on the JSON encoding of each
/// value, and a batch containing one oversized item is rejected before
/// anything is written. Each operation can be made to fail once, for
/// exercising error paths.
pub struct InMemoryStorageArea {
    items: RwLock<BTreeMap<String, Value>>,
    quota: Option<usize>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
    gets: AtomicUsize,
    get_alls: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryStorageArea {
    /// Create a new empty storage area without a quota.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            quota: None,
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
            get_alls: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Create a storage area rejecting items whose encoded value exceeds
    /// `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.items.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the storage area is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all stored keys.
    pub fn keys(&self) -> Vec<String> {
        self.items
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// The raw stored value under `key`.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.items.read().expect("lock poisoned").get(key).cloned()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.items.read().expect("lock poisoned").clone()
    }

    /// Write an entry directly, bypassing quota and failure injection.
    pub fn insert_raw(&self, key: impl Into<String>, value: Value) {
        self.items
            .write()
            .expect("lock poisoned")
            .insert(key.into(), value);
    }

    /// Remove an entry directly, bypassing failure injection.
    pub fn remove_raw(&self, key: &str) -> Option<Value> {
        self.items.write().expect("lock poisoned").remove(key)
    }

    /// Make the next `get` or `get_all` call fail.
    pub fn fail_next_get(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    /// Make the next `set` call fail.
    pub fn fail_next_set(&self) {
        self.fail_set.store(true, Ordering::SeqCst);
    }

    /// Make the next `delete` call fail.
    pub fn fail_next_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Calls served so far, including failed ones.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get: self.gets.load(Ordering::SeqCst),
            get_all: self.get_alls.load(Ordering::SeqCst),
            set: self.sets.load(Ordering::SeqCst),
            delete: self.deletes.load(Ordering::SeqCst),
        }
    }

    fn check_injected(flag: &AtomicBool, op: &str) -> BackendResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }

    fn check_quota(&self, key: &str, value: &Value) -> BackendResult<()> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let size = serde_json::to_vec(value)
            .map_err(|e| BackendError::Serialization(e.to_string()))?
            .len();
        if size > quota {
            debug!(key, size, quota, "item rejected by quota");
            return Err(BackendError::QuotaExceeded {
                key: key.to_string(),
                size,
                quota,
            });
        }
        Ok(())
    }
}

impl Default for InMemoryStorageArea {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageArea for InMemoryStorageArea {
    async fn get(&self, keys: &[String]) -> BackendResult<BTreeMap<String, Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Self::check_injected(&self.fail_get, "get")?;
        let map = self.items.read().expect("lock poisoned");
        Ok(keys
            .iter()
            .filter_map(|key| map.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn get_all(&self) -> BackendResult<BTreeMap<String, Value>> {
        self.get_alls.fetch_add(1, Ordering::SeqCst);
        Self::check_injected(&self.fail_get, "get")?;
        Ok(self.snapshot())
    }

    async fn set(&self, items: BTreeMap<String, Value>) -> BackendResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Self::check_injected(&self.fail_set, "set")?;
        for (key, value) in &items {
            self.check_quota(key, value)?;
        }
        let mut map = self.items.write().expect("lock poisoned");
        map.extend(items);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> BackendResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Self::check_injected(&self.fail_delete, "delete")?;
        let mut map = self.items.write().expect("lock poisoned");
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorageArea")
            .field("item_count", &self.len())
            .field("quota", &self.quota)
            .finish()
    }
}
