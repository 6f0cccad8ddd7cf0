//! Leaf and internal nodes.
//!
//! # Layout
//! ```text
//!                 InternalNode
//!   first_child | (k1, c1) | (k2, c2) | ...
//!       │            │          │
//!    keys < k1   [k1, k2)    [k2, ..)
//!
//!   LeafNode ◀──prev/next──▶ LeafNode ◀──prev/next──▶ LeafNode
//! ```
//!
//! Nodes never own each other. Every link is a [`NodeId`] into the tree's
//! [`NodeArena`](super::arena::NodeArena).

use std::mem;

use super::arena::NodeId;
use super::entry::{Entry, Router};

/// Ordered entries plus links to the neighboring leaves.
#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    pub(crate) entries: Vec<Entry<K, V>>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Create an empty, unlinked leaf with room for `order` entries
    /// (one more than it holds at rest, for the overflow before a split).
    pub(crate) fn new(order: usize) -> Self {
        Self {
            entries: Vec::with_capacity(order),
            prev: None,
            next: None,
            parent: None,
        }
    }

    #[inline]
    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.key.cmp(key))
    }

    /// Upsert: insert in key order, or replace the entry with the same key.
    ///
    /// Returns the replaced value, if any.
    pub(crate) fn add_entry(&mut self, entry: Entry<K, V>) -> Option<V> {
        match self.search(&entry.key) {
            Ok(idx) => Some(mem::replace(&mut self.entries[idx], entry).value),
            Err(idx) => {
                self.entries.insert(idx, entry);
                None
            }
        }
    }

    pub(crate) fn remove_entry(&mut self, key: &K) -> Option<Entry<K, V>> {
        self.search(key).ok().map(|idx| self.entries.remove(idx))
    }

    pub(crate) fn find_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.search(key).ok().map(|idx| &self.entries[idx])
    }

    /// Keep the left half, return the right half starting at `size / 2`.
    pub(crate) fn split(&mut self) -> Vec<Entry<K, V>> {
        let split_at = self.entries.len() / 2;
        self.entries.split_off(split_at)
    }
}

/// Ordered routers plus the child for keys below the first separator.
#[derive(Debug)]
pub(crate) struct InternalNode<K> {
    pub(crate) routers: Vec<Router<K>>,
    pub(crate) first_child: NodeId,
    pub(crate) parent: Option<NodeId>,
}

impl<K: Ord> InternalNode<K> {
    pub(crate) fn new(order: usize, first_child: NodeId) -> Self {
        Self {
            routers: Vec::with_capacity(order),
            first_child,
            parent: None,
        }
    }

    /// Upsert a router by key. Returns the router it replaced, if any.
    pub(crate) fn add_router(&mut self, router: Router<K>) -> Option<Router<K>> {
        match self.routers.binary_search_by(|r| r.key.cmp(&router.key)) {
            Ok(idx) => Some(mem::replace(&mut self.routers[idx], router)),
            Err(idx) => {
                self.routers.insert(idx, router);
                None
            }
        }
    }

    /// Remove the router for `child`.
    ///
    /// Looks the router up by `key` first; if the key no longer matches
    /// (a separator mid-rewrite), falls back to matching the child handle.
    pub(crate) fn remove_router(&mut self, key: &K, child: NodeId) -> Option<Router<K>> {
        let idx = match self.routers.binary_search_by(|r| r.key.cmp(key)) {
            Ok(idx) if self.routers[idx].child == child => idx,
            _ => self.routers.iter().position(|r| r.child == child)?,
        };
        Some(self.routers.remove(idx))
    }

    /// Child whose key range contains `key`.
    pub(crate) fn find_child(&self, key: &K) -> NodeId {
        // Number of separators <= key; ties go to the router with that key.
        let idx = self.routers.partition_point(|r| r.key <= *key);
        if idx == 0 {
            self.first_child
        } else {
            self.routers[idx - 1].child
        }
    }

    /// Child at position `pos`, where position 0 is `first_child` and
    /// position `i + 1` is the child of router `i`.
    pub(crate) fn child_at(&self, pos: usize) -> Option<NodeId> {
        if pos == 0 {
            Some(self.first_child)
        } else {
            self.routers.get(pos - 1).map(|r| r.child)
        }
    }

    pub(crate) fn child_position(&self, child: NodeId) -> Option<usize> {
        if self.first_child == child {
            return Some(0);
        }
        self.routers
            .iter()
            .position(|r| r.child == child)
            .map(|idx| idx + 1)
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.first_child).chain(self.routers.iter().map(|r| r.child))
    }

    /// Split a full node.
    ///
    /// The left half keeps `ceil((size + 1) / 2)` children, i.e. `size / 2`
    /// routers. Returns the promoted router (whose child becomes the new
    /// node's `first_child`) and the routers for the new right node.
    pub(crate) fn split(&mut self) -> Option<(Router<K>, Vec<Router<K>>)> {
        let keep = self.routers.len() / 2;
        if keep >= self.routers.len() {
            return None;
        }
        let mut right = self.routers.split_off(keep);
        let promoted = right.remove(0);
        Some((promoted, right))
    }
}

/// A tree node: either kind, with the shared contract by matching.
#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K>),
}

impl<K: Ord, V> Node<K, V> {
    /// Entries for a leaf, routers for an internal node.
    pub(crate) fn size(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::Internal(node) => node.routers.len(),
        }
    }

    #[inline]
    pub(crate) fn is_full(&self, order: usize) -> bool {
        self.size() >= order
    }

    #[inline]
    pub(crate) fn is_underflow(&self, min_size: usize) -> bool {
        self.size() < min_size
    }

    pub(crate) fn min_key(&self) -> Option<&K> {
        match self {
            Node::Leaf(leaf) => leaf.entries.first().map(|e| &e.key),
            Node::Internal(node) => node.routers.first().map(|r| &r.key),
        }
    }

    pub(crate) fn max_key(&self) -> Option<&K> {
        match self {
            Node::Leaf(leaf) => leaf.entries.last().map(|e| &e.key),
            Node::Internal(node) => node.routers.last().map(|r| &r.key),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(leaf) => leaf.parent,
            Node::Internal(node) => node.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Leaf(leaf) => leaf.parent = parent,
            Node::Internal(node) => node.parent = parent,
        }
    }
}
