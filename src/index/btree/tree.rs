//! Tree core - the unlocked B+ tree.
//!
//! [`TreeCore`] owns the node arena and the root handle and implements every
//! structural algorithm. It has no synchronization of its own; the public
//! [`BPlusTree`](super::BPlusTree) wraps it in a single `RwLock`.
//!
//! This file holds construction, node access, descent, search and the
//! insert/split path. Deletion lives in `delete.rs`, scans in `scan.rs` and
//! structural checks in `validate.rs`.

use tracing::{debug, trace};

use super::arena::{NodeArena, NodeId};
use super::entry::{Entry, Router};
use super::node::{InternalNode, LeafNode, Node};
use crate::common::{Error, Result};

pub(crate) struct TreeCore<K, V> {
    pub(crate) arena: NodeArena<Node<K, V>>,
    pub(crate) root: NodeId,

    /// Maximum keys per node; a node reaching this size is split.
    pub(crate) order: usize,

    /// Number of entries in the tree, maintained on insert/delete.
    pub(crate) len: usize,
}

impl<K: Ord + Clone, V: Clone> TreeCore<K, V> {
    /// Create an empty tree: a single empty leaf as root.
    ///
    /// The caller validates `order` (see [`MIN_ORDER`](crate::common::config::MIN_ORDER)).
    pub(crate) fn new(order: usize) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::Leaf(LeafNode::new(order)));
        Self {
            arena,
            root,
            order,
            len: 0,
        }
    }

    /// Fewest entries a non-root leaf may hold.
    ///
    /// A full leaf of `order` entries splits into `order / 2` and
    /// `order - order / 2`, so this is the guaranteed lower bound.
    ///
    /// This is looser than the classic `ceil((order + 1) / 2)`
    /// minimum: with a split on reaching `order` keys, a freshly split node
    /// (2 + 2 at order 4) would already violate that bound. Internal nodes
    /// follow the same reasoning with [`min_fanout`](Self::min_fanout).
    #[inline]
    pub(crate) fn min_leaf_entries(&self) -> usize {
        self.order / 2
    }

    /// Fewest children a non-root internal node may have.
    #[inline]
    pub(crate) fn min_fanout(&self) -> usize {
        self.order.div_ceil(2)
    }

    /// Fewest routers a non-root internal node may hold.
    #[inline]
    pub(crate) fn min_routers(&self) -> usize {
        self.min_fanout() - 1
    }

    // ========================================================================
    // Node access
    // ========================================================================

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node<K, V>> {
        self.arena
            .get(id)
            .ok_or_else(|| Error::invariant(format!("{id} is not allocated")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<K, V>> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| Error::invariant(format!("{id} is not allocated")))
    }

    pub(crate) fn leaf(&self, id: NodeId) -> Result<&LeafNode<K, V>> {
        match self.node(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Internal(_) => Err(Error::invariant(format!("{id} is not a leaf"))),
        }
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> Result<&mut LeafNode<K, V>> {
        match self.node_mut(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Internal(_) => Err(Error::invariant(format!("{id} is not a leaf"))),
        }
    }

    pub(crate) fn internal(&self, id: NodeId) -> Result<&InternalNode<K>> {
        match self.node(id)? {
            Node::Internal(node) => Ok(node),
            Node::Leaf(_) => Err(Error::invariant(format!("{id} is not an internal node"))),
        }
    }

    pub(crate) fn internal_mut(&mut self, id: NodeId) -> Result<&mut InternalNode<K>> {
        match self.node_mut(id)? {
            Node::Internal(node) => Ok(node),
            Node::Leaf(_) => Err(Error::invariant(format!("{id} is not an internal node"))),
        }
    }

    #[inline]
    pub(crate) fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.node_mut(id)?.set_parent(parent);
        Ok(())
    }

    // ========================================================================
    // Descent
    // ========================================================================

    /// Walk from the root to the leaf whose range contains `key`.
    pub(crate) fn find_leaf(&self, key: &K) -> Result<NodeId> {
        self.descend(|node| node.find_child(key))
    }

    /// Leftmost leaf, reached by always following `first_child`.
    pub(crate) fn leftmost_leaf(&self) -> Result<NodeId> {
        self.descend(|node| node.first_child)
    }

    fn descend<F>(&self, mut pick: F) -> Result<NodeId>
    where
        F: FnMut(&InternalNode<K>) -> NodeId,
    {
        let mut id = self.root;
        // A path longer than the node count means the links form a cycle.
        for _ in 0..=self.arena.len() {
            match self.node(id)? {
                Node::Leaf(_) => return Ok(id),
                Node::Internal(node) => id = pick(node),
            }
        }
        Err(Error::invariant("descent did not reach a leaf"))
    }

    /// Least key under `id`, or `None` for an empty subtree.
    pub(crate) fn subtree_min(&self, id: NodeId) -> Result<Option<K>> {
        let mut id = id;
        for _ in 0..=self.arena.len() {
            match self.node(id)? {
                Node::Leaf(leaf) => return Ok(leaf.entries.first().map(|e| e.key.clone())),
                Node::Internal(node) => id = node.first_child,
            }
        }
        Err(Error::invariant(format!("{id} is on a first-child cycle")))
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    pub(crate) fn search(&self, key: &K) -> Result<Option<V>> {
        let leaf_id = self.find_leaf(key)?;
        Ok(self.leaf(leaf_id)?.find_entry(key).map(|e| e.value.clone()))
    }

    /// Levels from root to leaf along `first_child`, root counted as 1.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Some(Node::Internal(node)) = self.arena.get(id) {
            height += 1;
            id = node.first_child;
        }
        height
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Upsert `key -> value`, returning the value it replaced.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let leaf_id = self.find_leaf(&key)?;
        let order = self.order;

        if let Some(old) = self.leaf_mut(leaf_id)?.add_entry(Entry::new(key, value)) {
            // Same key: replaced in place, shape unchanged.
            return Ok(Some(old));
        }
        self.len += 1;

        if self.node(leaf_id)?.is_full(order) {
            self.split_leaf(leaf_id)?;
        }
        Ok(None)
    }

    /// Split a full leaf and hook the new right half into the leaf list and
    /// the parent.
    fn split_leaf(&mut self, leaf_id: NodeId) -> Result<()> {
        let order = self.order;

        let (right_entries, old_next, parent) = {
            let leaf = self.leaf_mut(leaf_id)?;
            (leaf.split(), leaf.next, leaf.parent)
        };
        let separator = right_entries
            .first()
            .map(|e| e.key.clone())
            .ok_or_else(|| Error::invariant("leaf split produced an empty right half"))?;

        let mut right = LeafNode::new(order);
        right.entries.extend(right_entries);
        right.prev = Some(leaf_id);
        right.next = old_next;
        right.parent = parent;
        let right_id = self.arena.alloc(Node::Leaf(right));

        self.leaf_mut(leaf_id)?.next = Some(right_id);
        if let Some(next_id) = old_next {
            self.leaf_mut(next_id)?.prev = Some(right_id);
        }

        trace!(left = %leaf_id, right = %right_id, "split leaf");
        self.insert_into_parent(leaf_id, separator, right_id)
    }

    /// Add `(key, right)` to the parent of `left`, splitting ancestors
    /// upward as long as they fill up.
    fn insert_into_parent(&mut self, left: NodeId, key: K, right: NodeId) -> Result<()> {
        let order = self.order;
        let (mut left, mut key, mut right) = (left, key, right);

        loop {
            let Some(parent_id) = self.parent_of(left)? else {
                // `left` was the root: grow the tree by one level.
                let mut root = InternalNode::new(order, left);
                root.routers.push(Router::new(key, right));
                let root_id = self.arena.alloc(Node::Internal(root));
                self.set_parent(left, Some(root_id))?;
                self.set_parent(right, Some(root_id))?;
                self.root = root_id;

                debug!(root = %root_id, height = self.height(), "grew new root");
                return Ok(());
            };

            self.set_parent(right, Some(parent_id))?;
            let parent = self.internal_mut(parent_id)?;
            if parent.add_router(Router::new(key, right)).is_some() {
                return Err(Error::invariant(format!(
                    "{parent_id} already routes the promoted separator"
                )));
            }
            if parent.routers.len() < order {
                return Ok(());
            }

            let (promoted, right_routers) = parent
                .split()
                .ok_or_else(|| Error::invariant(format!("{parent_id} is too small to split")))?;
            let grandparent = parent.parent;

            let mut sibling = InternalNode::new(order, promoted.child);
            sibling.routers.extend(right_routers);
            sibling.parent = grandparent;
            let sibling_id = self.arena.alloc(Node::Internal(sibling));

            let moved: Vec<NodeId> = self.internal(sibling_id)?.children().collect();
            for child in moved {
                self.set_parent(child, Some(sibling_id))?;
            }

            trace!(left = %parent_id, right = %sibling_id, "split internal node");
            left = parent_id;
            key = promoted.key;
            right = sibling_id;
        }
    }

    // ========================================================================
    // Whole-tree operations
    // ========================================================================

    /// Drop every node and start over with a single empty leaf.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::Leaf(LeafNode::new(self.order)));
        self.len = 0;
    }

    /// Clear, then insert every pair. Returns the resulting size.
    pub(crate) fn rebuild<I>(&mut self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.clear();
        for (key, value) in entries {
            self.insert(key, value)?;
        }
        debug!(size = self.len, height = self.height(), "rebuilt index");
        Ok(self.len)
    }
}
