//! Entry and Router - the two value types stored in tree nodes.

use super::arena::NodeId;

/// A key paired with the location value it indexes.
///
/// Entries live in leaf nodes and are what scans return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Split into `(key, value)`.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Entry::new(key, value)
    }
}

/// A separator key paired with the child subtree it routes to.
///
/// `key` is the least key stored anywhere under `child`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Router<K> {
    pub(crate) key: K,
    pub(crate) child: NodeId,
}

impl<K> Router<K> {
    pub(crate) fn new(key: K, child: NodeId) -> Self {
        Self { key, child }
    }
}
