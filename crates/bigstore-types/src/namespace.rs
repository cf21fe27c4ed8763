use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chunk::CHUNK_KEY_PREFIX;
use crate::error::TypeError;

/// Identifier of one store instance inside a shared backend.
///
/// Every chunk key written by a store carries its namespace, so independent
/// stores can share one backend without their chunks colliding.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Namespace used when none is configured.
    pub const DEFAULT: &'static str = "3cc36853-b864-4122-beaa-516aa24448f6";

    /// Create a namespace from an identifier.
    ///
    /// Rejects empty identifiers and identifiers containing `:`, which ends
    /// the namespace part of a chunk key.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() || id.contains(':') {
            return Err(TypeError::InvalidNamespace(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix shared by every chunk key of this namespace,
    /// e.g. `chunk-<namespace>:`.
    pub fn chunk_prefix(&self) -> String {
        format!("{CHUNK_KEY_PREFIX}{}:", self.0)
    }

    /// Returns `true` if `key` has the shape of a chunk key of this namespace.
    ///
    /// Only the key is inspected, never the stored value.
    pub fn owns(&self, key: &str) -> bool {
        key.strip_prefix(CHUNK_KEY_PREFIX)
            .and_then(|rest| rest.strip_prefix(self.0.as_str()))
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = TypeError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_uuid() {
        assert_eq!(Namespace::default().as_str(), Namespace::DEFAULT);
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(
            Namespace::new(""),
            Err(TypeError::InvalidNamespace(String::new()))
        );
    }

    #[test]
    fn chunk_prefix_format() {
        let ns = Namespace::new("abc").unwrap();
        assert_eq!(ns.chunk_prefix(), "chunk-abc:");
    }

    #[test]
    fn owns_matches_key_shape_only() {
        let ns = Namespace::new("abc").unwrap();
        assert!(ns.owns("chunk-abc:whatever"));
        assert!(ns.owns("chunk-abc:"));
        assert!(!ns.owns("chunk-abcd:whatever"));
        assert!(!ns.owns("chunk-ab:c"));
        assert!(!ns.owns("abc:whatever"));
        assert!(!ns.owns("myString"));
    }

    #[test]
    fn colon_is_rejected() {
        assert_eq!(
            Namespace::new("a:b"),
            Err(TypeError::InvalidNamespace("a:b".into()))
        );
        assert!(Namespace::new(":").is_err());
        assert!(serde_json::from_str::<Namespace>("\"a:b\"").is_err());
    }

    #[test]
    fn prefix_namespaces_do_not_overlap() {
        let a = Namespace::new("a").unwrap();
        let ab = Namespace::new("ab").unwrap();
        assert!(!a.owns(&format!("{}x", ab.chunk_prefix())));
        assert!(!ab.owns(&format!("{}x", a.chunk_prefix())));
    }

    #[test]
    fn serde_validates() {
        let ns: Namespace = serde_json::from_str("\"store-1\"").unwrap();
        assert_eq!(ns.as_str(), "store-1");
        assert_eq!(serde_json::to_string(&ns).unwrap(), "\"store-1\"");
        assert!(serde_json::from_str::<Namespace>("\"\"").is_err());
    }
}
