//! Delete and rebalancing.
//!
//! After an entry leaves its leaf, one of three things happens:
//!
//! 1. The leaf is empty: it is spliced out of the leaf list and its parent,
//!    and the parent is checked (root collapse, removal when childless,
//!    internal underflow).
//! 2. The leaf lost its minimum: the separator naming that minimum is
//!    rewritten, bubbling up only while the leaf is a `first_child`.
//! 3. The leaf underflows: borrow from the left sibling, else the right
//!    sibling, else merge (left preferred).
//!
//! Internal underflow is handled by rotating a router through the parent,
//! or by merging with a sibling and pulling the separator down, repeated
//! upward in a loop until a node is no longer short or the root collapses.
//!
//! Siblings are always children of the same parent. Separators are kept
//! equal to the least key of the subtree they route to.

use std::mem;

use tracing::{debug, trace};

use super::arena::NodeId;
use super::entry::Router;
use super::node::{LeafNode, Node};
use super::tree::TreeCore;
use crate::common::{Error, Result};

/// Position of a child in its parent and the children on either side.
struct Siblings {
    pos: usize,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K: Ord + Clone, V: Clone> TreeCore<K, V> {
    /// Remove `key`. Returns `false` when it was not present.
    pub(crate) fn delete(&mut self, key: &K) -> Result<bool> {
        let leaf_id = self.find_leaf(key)?;

        let old_min = {
            let leaf = self.leaf_mut(leaf_id)?;
            let old_min = leaf.entries.first().map(|e| e.key.clone());
            if leaf.remove_entry(key).is_none() {
                return Ok(false);
            }
            old_min
        };
        self.len -= 1;

        if leaf_id == self.root {
            // The root leaf may shrink all the way to empty.
            return Ok(true);
        }

        let (empty, new_min, size) = {
            let leaf = self.leaf(leaf_id)?;
            (
                leaf.entries.is_empty(),
                leaf.entries.first().map(|e| e.key.clone()),
                leaf.entries.len(),
            )
        };

        if empty {
            self.remove_empty_node(leaf_id, old_min)?;
            return Ok(true);
        }

        if new_min != old_min {
            if let Some(new_min) = new_min {
                self.update_separator(leaf_id, new_min)?;
            }
        }

        if size < self.min_leaf_entries() {
            self.rebalance_leaf(leaf_id)?;
        }
        Ok(true)
    }

    // ========================================================================
    // Separator maintenance
    // ========================================================================

    /// `node_id`'s least key is now `new_min`; rewrite the router naming it.
    ///
    /// While the node is its parent's `first_child` the parent has the same
    /// minimum and no router of its own, so keep climbing.
    pub(crate) fn update_separator(&mut self, node_id: NodeId, new_min: K) -> Result<()> {
        let mut child = node_id;
        while let Some(parent_id) = self.parent_of(child)? {
            let parent = self.internal_mut(parent_id)?;
            match parent.child_position(child) {
                Some(0) => child = parent_id,
                Some(pos) => {
                    parent.routers[pos - 1].key = new_min;
                    return Ok(());
                }
                None => {
                    return Err(Error::invariant(format!(
                        "{parent_id} does not list its child {child}"
                    )))
                }
            }
        }
        Ok(())
    }

    fn siblings(&self, parent_id: NodeId, child: NodeId) -> Result<Siblings> {
        let parent = self.internal(parent_id)?;
        let pos = parent.child_position(child).ok_or_else(|| {
            Error::invariant(format!("{parent_id} does not list its child {child}"))
        })?;
        let left = if pos > 0 { parent.child_at(pos - 1) } else { None };
        let right = parent.child_at(pos + 1);
        Ok(Siblings { pos, left, right })
    }

    // ========================================================================
    // Empty node removal
    // ========================================================================

    /// Splice an empty non-root node out of the tree.
    ///
    /// `old_min` is the least key the node held before it emptied and is
    /// used to find the router naming it; internal nodes pass `None` and are
    /// found by handle.
    fn remove_empty_node(&mut self, node_id: NodeId, old_min: Option<K>) -> Result<()> {
        let (mut node_id, mut old_min) = (node_id, old_min);

        loop {
            let node = self
                .arena
                .take(node_id)
                .ok_or_else(|| Error::invariant(format!("{node_id} is not allocated")))?;
            if let Node::Leaf(leaf) = &node {
                self.unlink_leaf(leaf)?;
            }
            let parent_id = node
                .parent()
                .ok_or_else(|| Error::invariant(format!("empty {node_id} has no parent")))?;
            trace!(node = %node_id, parent = %parent_id, "removed empty node");

            let parent = self.internal_mut(parent_id)?;
            if parent.routers.is_empty() {
                // `node_id` was the only child: the parent is empty too.
                if parent_id == self.root {
                    self.reset_root()?;
                    return Ok(());
                }
                node_id = parent_id;
                old_min = None;
                continue;
            }

            let was_first = parent.first_child == node_id;
            if was_first {
                let promoted = parent.routers.remove(0);
                parent.first_child = promoted.child;
            } else {
                let removed = match &old_min {
                    Some(key) => parent.remove_router(key, node_id),
                    None => parent
                        .routers
                        .iter()
                        .position(|r| r.child == node_id)
                        .map(|idx| parent.routers.remove(idx)),
                };
                if removed.is_none() {
                    return Err(Error::invariant(format!(
                        "{parent_id} has no router for {node_id}"
                    )));
                }
            }

            if was_first {
                // The parent's least key moved up to its new first child.
                if let Some(min) = self.subtree_min(parent_id)? {
                    self.update_separator(parent_id, min)?;
                }
            }
            return self.after_child_removed(parent_id);
        }
    }

    /// Point the neighbors of a removed leaf at each other.
    fn unlink_leaf(&mut self, leaf: &LeafNode<K, V>) -> Result<()> {
        if let Some(prev) = leaf.prev {
            self.leaf_mut(prev)?.next = leaf.next;
        }
        if let Some(next) = leaf.next {
            self.leaf_mut(next)?.prev = leaf.prev;
        }
        Ok(())
    }

    /// `parent_id` just lost a child; collapse or rebalance as needed.
    fn after_child_removed(&mut self, parent_id: NodeId) -> Result<()> {
        let remaining = self.internal(parent_id)?.routers.len();
        if parent_id == self.root {
            if remaining == 0 {
                self.collapse_root()?;
            }
            return Ok(());
        }
        if remaining < self.min_routers() {
            self.rebalance_internal(parent_id)?;
        }
        Ok(())
    }

    // ========================================================================
    // Root changes
    // ========================================================================

    /// Replace a router-less internal root with its only child.
    fn collapse_root(&mut self) -> Result<()> {
        let old_root = self.root;
        if !self.internal(old_root)?.routers.is_empty() {
            return Ok(());
        }
        let child = match self.arena.take(old_root) {
            Some(Node::Internal(node)) => node.first_child,
            _ => return Err(Error::invariant(format!("{old_root} vanished during collapse"))),
        };
        self.set_parent(child, None)?;
        self.root = child;

        debug!(old_root = %old_root, new_root = %child, height = self.height(), "collapsed root");
        Ok(())
    }

    /// The root lost its last child: start over with an empty leaf.
    fn reset_root(&mut self) -> Result<()> {
        let old_root = self.root;
        self.arena
            .take(old_root)
            .ok_or_else(|| Error::invariant(format!("{old_root} is not allocated")))?;
        self.root = self.arena.alloc(Node::Leaf(LeafNode::new(self.order)));

        debug!(old_root = %old_root, new_root = %self.root, "replaced empty root with leaf");
        Ok(())
    }

    // ========================================================================
    // Leaf underflow
    // ========================================================================

    fn rebalance_leaf(&mut self, leaf_id: NodeId) -> Result<()> {
        let min = self.min_leaf_entries();
        let parent_id = self
            .parent_of(leaf_id)?
            .ok_or_else(|| Error::invariant(format!("underflowing {leaf_id} has no parent")))?;
        let Siblings { pos, left, right } = self.siblings(parent_id, leaf_id)?;

        if let Some(left_id) = left {
            if self.node(left_id)?.size() > min {
                return self.borrow_from_left_leaf(parent_id, left_id, leaf_id, pos);
            }
        }
        if let Some(right_id) = right {
            if self.node(right_id)?.size() > min {
                return self.borrow_from_right_leaf(parent_id, leaf_id, right_id, pos);
            }
        }

        match (left, right) {
            (Some(left_id), _) => self.merge_leaves(parent_id, left_id, leaf_id, pos - 1)?,
            (None, Some(right_id)) => self.merge_leaves(parent_id, leaf_id, right_id, pos)?,
            (None, None) => {
                return Err(Error::invariant(format!(
                    "underflowing {leaf_id} has no sibling"
                )))
            }
        }
        self.after_child_removed(parent_id)
    }

    /// Move the left sibling's last entry to the front of `leaf_id`.
    fn borrow_from_left_leaf(
        &mut self,
        parent_id: NodeId,
        left_id: NodeId,
        leaf_id: NodeId,
        pos: usize,
    ) -> Result<()> {
        let moved = self
            .leaf_mut(left_id)?
            .entries
            .pop()
            .ok_or_else(|| Error::invariant(format!("{left_id} is empty")))?;
        let separator = moved.key.clone();
        self.leaf_mut(leaf_id)?.entries.insert(0, moved);
        self.internal_mut(parent_id)?.routers[pos - 1].key = separator;

        trace!(from = %left_id, to = %leaf_id, "borrowed entry from left leaf");
        Ok(())
    }

    /// Move the right sibling's first entry to the end of `leaf_id`.
    fn borrow_from_right_leaf(
        &mut self,
        parent_id: NodeId,
        leaf_id: NodeId,
        right_id: NodeId,
        pos: usize,
    ) -> Result<()> {
        let right = self.leaf_mut(right_id)?;
        if right.entries.len() < 2 {
            return Err(Error::invariant(format!("{right_id} has no entry to lend")));
        }
        let moved = right.entries.remove(0);
        let separator = right.entries[0].key.clone();
        self.leaf_mut(leaf_id)?.entries.push(moved);
        self.internal_mut(parent_id)?.routers[pos].key = separator;

        trace!(from = %right_id, to = %leaf_id, "borrowed entry from right leaf");
        Ok(())
    }

    /// Append `right_id` to `left_id`, free it, and drop the separator at
    /// `sep_idx` from the parent.
    fn merge_leaves(
        &mut self,
        parent_id: NodeId,
        left_id: NodeId,
        right_id: NodeId,
        sep_idx: usize,
    ) -> Result<()> {
        self.check_separator_child(parent_id, sep_idx, right_id)?;

        let right = match self.arena.take(right_id) {
            Some(Node::Leaf(leaf)) => leaf,
            _ => return Err(Error::invariant(format!("{right_id} is not a leaf"))),
        };
        let next = right.next;

        let left = self.leaf_mut(left_id)?;
        left.entries.extend(right.entries);
        left.next = next;
        if let Some(next_id) = next {
            self.leaf_mut(next_id)?.prev = Some(left_id);
        }
        self.internal_mut(parent_id)?.routers.remove(sep_idx);

        trace!(into = %left_id, absorbed = %right_id, "merged leaves");
        Ok(())
    }

    fn check_separator_child(&self, parent_id: NodeId, sep_idx: usize, child: NodeId) -> Result<()> {
        match self.internal(parent_id)?.routers.get(sep_idx) {
            Some(router) if router.child == child => Ok(()),
            _ => Err(Error::invariant(format!(
                "{parent_id} router {sep_idx} does not point at {child}"
            ))),
        }
    }

    // ========================================================================
    // Internal underflow
    // ========================================================================

    /// Fix a short internal node, then its parent, and so on upward.
    fn rebalance_internal(&mut self, node_id: NodeId) -> Result<()> {
        let min = self.min_routers();
        let mut node_id = node_id;

        loop {
            if node_id == self.root {
                return self.collapse_root();
            }
            if !self.node(node_id)?.is_underflow(min) {
                return Ok(());
            }

            let parent_id = self.parent_of(node_id)?.ok_or_else(|| {
                Error::invariant(format!("underflowing {node_id} has no parent"))
            })?;
            let Siblings { pos, left, right } = self.siblings(parent_id, node_id)?;

            if let Some(left_id) = left {
                if self.node(left_id)?.size() > min {
                    return self.rotate_from_left(parent_id, left_id, node_id, pos);
                }
            }
            if let Some(right_id) = right {
                if self.node(right_id)?.size() > min {
                    return self.rotate_from_right(parent_id, node_id, right_id, pos);
                }
            }

            match (left, right) {
                (Some(left_id), _) => self.merge_internal(parent_id, left_id, node_id, pos - 1)?,
                (None, Some(right_id)) => {
                    self.merge_internal(parent_id, node_id, right_id, pos)?
                }
                (None, None) => {
                    return Err(Error::invariant(format!(
                        "underflowing {node_id} has no sibling"
                    )))
                }
            }
            node_id = parent_id;
        }
    }

    /// Rotate the left sibling's last child into `node_id` through the
    /// parent separator.
    fn rotate_from_left(
        &mut self,
        parent_id: NodeId,
        left_id: NodeId,
        node_id: NodeId,
        pos: usize,
    ) -> Result<()> {
        let Router {
            key: borrowed_key,
            child: borrowed_child,
        } = self
            .internal_mut(left_id)?
            .routers
            .pop()
            .ok_or_else(|| Error::invariant(format!("{left_id} has no router to lend")))?;

        let separator = mem::replace(
            &mut self.internal_mut(parent_id)?.routers[pos - 1].key,
            borrowed_key,
        );
        let node = self.internal_mut(node_id)?;
        let old_first = mem::replace(&mut node.first_child, borrowed_child);
        node.routers.insert(0, Router::new(separator, old_first));
        self.set_parent(borrowed_child, Some(node_id))?;

        trace!(from = %left_id, to = %node_id, "rotated router from left sibling");
        Ok(())
    }

    /// Rotate the right sibling's first child into `node_id` through the
    /// parent separator.
    fn rotate_from_right(
        &mut self,
        parent_id: NodeId,
        node_id: NodeId,
        right_id: NodeId,
        pos: usize,
    ) -> Result<()> {
        let right = self.internal_mut(right_id)?;
        if right.routers.is_empty() {
            return Err(Error::invariant(format!("{right_id} has no router to lend")));
        }
        let Router {
            key: new_separator,
            child: new_first,
        } = right.routers.remove(0);
        let moved = mem::replace(&mut right.first_child, new_first);

        let separator = mem::replace(
            &mut self.internal_mut(parent_id)?.routers[pos].key,
            new_separator,
        );
        self.internal_mut(node_id)?
            .routers
            .push(Router::new(separator, moved));
        self.set_parent(moved, Some(node_id))?;

        trace!(from = %right_id, to = %node_id, "rotated router from right sibling");
        Ok(())
    }

    /// Merge `right_id` into `left_id`, pulling down the separator at
    /// `sep_idx` as the router for the absorbed `first_child`.
    fn merge_internal(
        &mut self,
        parent_id: NodeId,
        left_id: NodeId,
        right_id: NodeId,
        sep_idx: usize,
    ) -> Result<()> {
        self.check_separator_child(parent_id, sep_idx, right_id)?;
        {
            let separator = &self.internal(parent_id)?.routers[sep_idx].key;
            let left_ok = self
                .node(left_id)?
                .max_key()
                .map_or(true, |max| max < separator);
            let right_ok = self
                .node(right_id)?
                .min_key()
                .map_or(true, |min| separator <= min);
            if !(left_ok && right_ok) {
                return Err(Error::invariant(format!(
                    "separator {sep_idx} of {parent_id} does not divide {left_id} and {right_id}"
                )));
            }
        }

        let separator = self.internal_mut(parent_id)?.routers.remove(sep_idx).key;
        let right = match self.arena.take(right_id) {
            Some(Node::Internal(node)) => node,
            _ => return Err(Error::invariant(format!("{right_id} is not an internal node"))),
        };
        let moved: Vec<NodeId> = right.children().collect();

        let left = self.internal_mut(left_id)?;
        left.routers.push(Router::new(separator, right.first_child));
        left.routers.extend(right.routers);
        for child in moved {
            self.set_parent(child, Some(left_id))?;
        }

        trace!(into = %left_id, absorbed = %right_id, "merged internal nodes");
        Ok(())
    }
}
