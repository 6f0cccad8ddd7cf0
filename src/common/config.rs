//! Configuration constants for slotdb.

/// Smallest supported B+ tree order.
///
/// With order 3 a leaf holds at most 2 entries and an internal node at most
/// 2 routers (3 children) at rest. Anything smaller cannot split into two
/// non-empty halves.
pub const MIN_ORDER: usize = 3;

/// Order used by [`BPlusTree::default`](crate::BPlusTree).
///
/// Large enough that a million keys fit in a tree of height 4, small enough
/// that the linear work inside a node (shifting a `Vec`) stays cheap.
pub const DEFAULT_ORDER: usize = 64;
