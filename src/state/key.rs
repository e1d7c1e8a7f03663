//! Namespaces and storage keys.

use std::fmt;
use std::sync::Arc;

/// Tag that segregates one logical store's keys from others sharing a backend.
///
/// Two stores with the same namespace pointed at the same service see the
/// same records; that is how processes coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(Arc<str>);

impl Namespace {
    /// Create a namespace from any string tag.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// Get the namespace tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the storage key for `id` in this namespace.
    pub fn key_for<'a>(&'a self, id: &'a str) -> StoreKey<'a> {
        StoreKey { namespace: self, id }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Namespace {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Namespace {
    fn from(tag: String) -> Self {
        Self(Arc::from(tag))
    }
}

/// A storage key, displayed as `<namespace>:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreKey<'a> {
    namespace: &'a Namespace,
    id: &'a str,
}

impl fmt::Display for StoreKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let ns = Namespace::new("chan");
        assert_eq!(ns.key_for("9").to_string(), "chan:9");
        assert_eq!(ns.key_for("").to_string(), "chan:");
    }

    #[test]
    fn test_id_with_separator_is_kept_verbatim() {
        let ns = Namespace::new("session");
        assert_eq!(ns.key_for("a:b").to_string(), "session:a:b");
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let chan = Namespace::new("chan");
        let session = Namespace::new("session");
        assert_ne!(chan.key_for("1").to_string(), session.key_for("1").to_string());
    }

    #[test]
    fn test_conversions() {
        let a: Namespace = "chan".into();
        let b: Namespace = String::from("chan").into();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "chan");
    }
}
