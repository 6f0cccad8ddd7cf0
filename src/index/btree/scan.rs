//! Range and full scans over the leaf list.

use std::ops::ControlFlow;

use super::arena::NodeId;
use super::entry::Entry;
use super::node::LeafNode;
use super::tree::TreeCore;
use crate::common::{Error, Result};

impl<K: Ord + Clone, V: Clone> TreeCore<K, V> {
    /// Entries with `start <= key <= end`, ascending.
    pub(crate) fn range_query(&self, start: &K, end: &K) -> Result<Vec<Entry<K, V>>> {
        if start > end {
            return Err(Error::InvalidRange);
        }

        let mut out = Vec::new();
        self.walk_leaves(self.find_leaf(start)?, |leaf| {
            for entry in &leaf.entries {
                if entry.key > *end {
                    return ControlFlow::Break(());
                }
                if entry.key >= *start {
                    out.push(entry.clone());
                }
            }
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    /// Every entry, ascending, from the leftmost leaf.
    pub(crate) fn all_entries(&self) -> Result<Vec<Entry<K, V>>> {
        let mut out = Vec::with_capacity(self.len);
        self.walk_leaves(self.leftmost_leaf()?, |leaf| {
            out.extend(leaf.entries.iter().cloned());
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    /// Visit leaves along `next` links starting at `start` until the list
    /// ends or `visit` breaks.
    pub(crate) fn walk_leaves<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&LeafNode<K, V>) -> ControlFlow<()>,
    {
        let mut cursor = Some(start);
        // More hops than nodes means the list loops back on itself.
        let mut budget = self.arena.len();

        while let Some(id) = cursor {
            if budget == 0 {
                return Err(Error::invariant("leaf list contains a cycle"));
            }
            budget -= 1;

            let leaf = self.leaf(id)?;
            if visit(leaf).is_break() {
                break;
            }
            cursor = leaf.next;
        }
        Ok(())
    }
}
