//! Node arena - flat slot storage for tree nodes.
//!
//! Parent, sibling and child links are [`NodeId`] handles into the arena
//! rather than pointers, so the cyclic leaf list and the upward parent links
//! need neither reference counting nor `unsafe`. Freed slots go on a free
//! list and are reused by later allocations.

use std::fmt;

/// Handle to a node slot in a [`NodeArena`].
///
/// Using `usize` so the handle indexes the slot vector directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

pub(crate) struct NodeArena<T> {
    slots: Vec<Option<T>>,

    /// Stack of freed handles (LIFO so hot slots get reused first).
    free: Vec<NodeId>,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, node: T) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Returns `None` for a freed or never-allocated handle.
    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Remove a node from the arena, returning it by value.
    pub(crate) fn take(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id);
        Some(node)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
