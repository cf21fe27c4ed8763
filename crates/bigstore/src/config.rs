use bigstore_types::{ChunkKey, Namespace};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ConfigError;

/// Configuration of a [`BigStorage`](crate::BigStorage) instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Per-item byte ceiling of the backend. Values whose encoding fits are
    /// stored directly; larger values are chunked so that every chunk entry
    /// (key plus encoded payload) fits.
    pub max_item_bytes: usize,
    /// Namespace embedded in every chunk key written by this store.
    pub namespace: Namespace,
}

impl StoreConfig {
    /// Per-item quota of extension sync storage.
    pub const DEFAULT_MAX_ITEM_BYTES: usize = 8192;

    pub fn new(max_item_bytes: usize, namespace: Namespace) -> Self {
        Self {
            max_item_bytes,
            namespace,
        }
    }

    /// Default configuration with a different ceiling.
    pub fn with_max_item_bytes(max_item_bytes: usize) -> Self {
        Self {
            max_item_bytes,
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    ///
    /// ```toml
    /// max_item_bytes = 8192
    /// namespace = "3cc36853-b864-4122-beaa-516aa24448f6"
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Smallest ceiling that fits one chunk entry carrying at least one byte.
    ///
    /// A chunk entry is its key, the two quotes of the JSON string, and one
    /// base64 quartet.
    pub fn minimum_item_bytes(namespace: &Namespace) -> usize {
        ChunkKey::rendered_len(namespace) + codec::chunk_value_len(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_item_bytes == 0 {
            return Err(ConfigError::ZeroItemBytes);
        }
        let minimum = Self::minimum_item_bytes(&self.namespace);
        if self.max_item_bytes < minimum {
            return Err(ConfigError::ItemBytesTooSmall {
                max_item_bytes: self.max_item_bytes,
                minimum,
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_item_bytes: Self::DEFAULT_MAX_ITEM_BYTES,
            namespace: Namespace::default(),
        }
    }
}
