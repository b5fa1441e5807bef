use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Session-wide interner for node identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter behind generated ids. Never rewinds, so a generated
/// id is never handed out twice within one process.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stable identifier of a design node.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Look up an id without interning. `None` means no node was ever
    /// given this name.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(NodeId)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh id with a type prefix (e.g. `rectangle_4`).
    ///
    /// Callers that must also avoid ids imported from a scene description
    /// go through `Scene::generate_id`, which skips already-known names.
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = NodeId::intern("hero_frame");
        let b = NodeId::intern("hero_frame");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_frame");
        assert_eq!(NodeId::lookup("hero_frame"), Some(a));
    }

    #[test]
    fn generated_ids_never_repeat() {
        let a = NodeId::with_prefix("rectangle");
        let b = NodeId::with_prefix("rectangle");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rectangle_"));
    }

    #[test]
    fn lookup_does_not_intern() {
        assert_eq!(NodeId::lookup("never_seen_anywhere_4242"), None);
    }
}
