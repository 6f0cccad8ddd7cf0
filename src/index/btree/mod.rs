//! B+ tree index.
//!
//! An in-memory, order-parameterized B+ tree mapping keys to opaque
//! location values (normally [`RecordId`](crate::RecordId)s).
//!
//! # Components
//! - [`BPlusTree`] - Thread-safe public index (one `RwLock` over the tree)
//! - [`Entry`] - A key/value pair as stored in leaves and returned by scans
//! - `TreeCore` - The unlocked tree; its algorithms are split by concern:
//!   - `tree` - construction, descent, search, insert and splits
//!   - `delete` - deletion, borrowing, merging, root collapse
//!   - `scan` - range and full scans over the leaf list
//!   - `validate` - structural invariant checks
//!   - `debug` - tree drawing for `{:#?}`
//! - `node` / `arena` - Leaf and internal nodes stored in a handle arena

mod arena;
mod bplus_tree;
mod debug;
mod delete;
mod entry;
mod node;
mod scan;
mod tree;
mod validate;

pub use bplus_tree::{BPlusTree, RecordIndex};
pub use entry::Entry;
