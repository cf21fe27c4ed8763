use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendResult;

/// Size-constrained, batched key-value backend.
///
/// Values are opaque JSON. Implementations must satisfy these invariants:
/// - Reads omit absent keys instead of failing.
/// - Writes and deletes apply to the whole batch or report an error; callers
///   must not assume a failed batch left the store untouched.
/// - An item whose size exceeds the backend ceiling makes `set` fail.
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Read the given keys. Absent keys are missing from the result.
    async fn get(&self, keys: &[String]) -> BackendResult<BTreeMap<String, Value>>;

    /// Read every entry in the backend.
    async fn get_all(&self) -> BackendResult<BTreeMap<String, Value>>;

    /// Write all items in one batch, overwriting existing keys.
    async fn set(&self, items: BTreeMap<String, Value>) -> BackendResult<()>;

    /// Remove all given keys in one batch. Absent keys are ignored.
    async fn delete(&self, keys: &[String]) -> BackendResult<()>;
}

#[async_trait]
impl<T: StorageArea + ?Sized> StorageArea for Arc<T> {
    async fn get(&self, keys: &[String]) -> BackendResult<BTreeMap<String, Value>> {
        (**self).get(keys).await
    }

    async fn get_all(&self) -> BackendResult<BTreeMap<String, Value>> {
        (**self).get_all().await
    }

    async fn set(&self, items: BTreeMap<String, Value>) -> BackendResult<()> {
        (**self).set(items).await
    }

    async fn delete(&self, keys: &[String]) -> BackendResult<()> {
        (**self).delete(keys).await
    }
}
