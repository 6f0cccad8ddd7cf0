//! Structural validation.
//!
//! [`TreeCore::validate`] walks the whole tree and reports the first broken
//! invariant as [`Error::InvariantViolation`]:
//!
//! - keys strictly ascending inside every node
//! - every key of a subtree inside the range its parent routes to it
//! - separators equal to the least key of their subtree
//! - all leaves at the same depth
//! - non-root occupancy within `[min, order - 1]`
//! - parent handles agree with the child lists
//! - the leaf list visits exactly the leaves, in order, with matching
//!   `prev` links
//! - the maintained size matches the entry count, and no node leaked

use super::arena::NodeId;
use super::node::Node;
use super::tree::TreeCore;
use crate::common::{Error, Result};

#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    leaves: Vec<NodeId>,
    entries: usize,
    nodes: usize,
}

impl<K: Ord + Clone, V: Clone> TreeCore<K, V> {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.parent_of(self.root)?.is_some() {
            return Err(Error::invariant(format!("root {} has a parent", self.root)));
        }

        let mut walk = Walk::default();
        self.check_subtree(self.root, None, None, None, 1, &mut walk)?;

        if walk.entries != self.len {
            return Err(Error::invariant(format!(
                "size is {} but leaves hold {} entries",
                self.len, walk.entries
            )));
        }
        if walk.nodes != self.arena.len() {
            return Err(Error::invariant(format!(
                "{} nodes reachable but {} allocated",
                walk.nodes,
                self.arena.len()
            )));
        }
        self.check_leaf_list(&walk.leaves)
    }

    fn check_subtree(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        let node = self.node(id)?;
        walk.nodes += 1;

        if node.parent() != parent {
            return Err(Error::invariant(format!(
                "{id} has parent {:?}, expected {:?}",
                node.parent(),
                parent
            )));
        }
        self.check_occupancy(id, node)?;

        let in_range = |key: &K| {
            lower.map_or(true, |lo| key >= lo) && upper.map_or(true, |hi| key < hi)
        };

        match node {
            Node::Leaf(leaf) => {
                let keys: Vec<&K> = leaf.entries.iter().map(|e| &e.key).collect();
                check_ascending(id, &keys)?;
                if !keys.iter().all(|&k| in_range(k)) {
                    return Err(Error::invariant(format!("{id} holds a key outside its range")));
                }

                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(d) if d != depth => {
                        return Err(Error::invariant(format!(
                            "{id} is at depth {depth}, other leaves at {d}"
                        )))
                    }
                    Some(_) => {}
                }
                walk.leaves.push(id);
                walk.entries += leaf.entries.len();
            }
            Node::Internal(internal) => {
                let keys: Vec<&K> = internal.routers.iter().map(|r| &r.key).collect();
                check_ascending(id, &keys)?;
                if !keys.iter().all(|&k| in_range(k)) {
                    return Err(Error::invariant(format!(
                        "{id} holds a separator outside its range"
                    )));
                }

                let first_upper = internal.routers.first().map(|r| &r.key).or(upper);
                self.check_subtree(internal.first_child, Some(id), lower, first_upper, depth + 1, walk)?;

                for (i, router) in internal.routers.iter().enumerate() {
                    if self.subtree_min(router.child)?.as_ref() != Some(&router.key) {
                        return Err(Error::invariant(format!(
                            "separator {i} of {id} is not the least key of {}",
                            router.child
                        )));
                    }
                    let next_upper = internal.routers.get(i + 1).map(|r| &r.key).or(upper);
                    self.check_subtree(router.child, Some(id), Some(&router.key), next_upper, depth + 1, walk)?;
                }
            }
        }
        Ok(())
    }

    fn check_occupancy(&self, id: NodeId, node: &Node<K, V>) -> Result<()> {
        let size = node.size();
        if size >= self.order {
            return Err(Error::invariant(format!(
                "{id} holds {size} keys, order is {}",
                self.order
            )));
        }
        if id == self.root {
            if !node.is_leaf() && size == 0 {
                return Err(Error::invariant("internal root has no routers"));
            }
            return Ok(());
        }
        let min = if node.is_leaf() {
            self.min_leaf_entries()
        } else {
            self.min_routers()
        };
        if node.is_underflow(min) {
            return Err(Error::invariant(format!(
                "{id} holds {size} keys, minimum is {min}"
            )));
        }
        Ok(())
    }

    /// The leaf list must link exactly the leaves found by the tree walk,
    /// in the same order, in both directions.
    fn check_leaf_list(&self, leaves: &[NodeId]) -> Result<()> {
        for (i, &id) in leaves.iter().enumerate() {
            let leaf = self.leaf(id)?;
            let prev = i.checked_sub(1).map(|j| leaves[j]);
            let next = leaves.get(i + 1).copied();
            if leaf.prev != prev || leaf.next != next {
                return Err(Error::invariant(format!(
                    "{id} links prev {:?} / next {:?}, expected {:?} / {:?}",
                    leaf.prev, leaf.next, prev, next
                )));
            }
        }
        Ok(())
    }
}

fn check_ascending<K: Ord>(id: NodeId, keys: &[&K]) -> Result<()> {
    if keys.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(Error::invariant(format!("{id} keys are not strictly ascending")))
    }
}
