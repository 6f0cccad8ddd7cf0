//! slotdb - the index core of a toy relational engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            slotdb                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        SQL subset, catalog, record store (external)      │   │
//! │  │   rows live in slotted pages, addressed by RecordId      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/)                        │   │
//! │  │     BPlusTree: key → RecordId, one RwLock over the tree  │   │
//! │  │     node arena, leaf list, split / borrow / merge        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Common (common/)                            │   │
//! │  │         Error, Result, config, PageId, RecordId          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index is memory resident. A record store that persists its rows
//! rebuilds the index at startup with [`BPlusTree::rebuild`].
//!
//! # Modules
//! - [`common`] - Shared primitives (Error, config, PageId, RecordId)
//! - [`index`] - Index structures (B+ tree)
//!
//! # Quick Start
//! ```
//! use slotdb::{PageId, RecordId, RecordIndex};
//!
//! let index: RecordIndex<String> = RecordIndex::new(4).unwrap();
//! index.insert("alice".to_string(), RecordId::new(PageId::new(0), 1)).unwrap();
//! index.insert("bob".to_string(), RecordId::new(PageId::new(0), 2)).unwrap();
//!
//! let hits = index.range_query(&"a".to_string(), &"b".to_string()).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].key, "alice");
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_ORDER, MIN_ORDER};
pub use common::{Error, PageId, RecordId, Result};

pub use index::{BPlusTree, Entry, RecordIndex};
