//! BPlusTree - the thread-safe public index.

use std::fmt;

use parking_lot::RwLock;
use tracing::debug;

use super::entry::Entry;
use super::tree::TreeCore;
use crate::common::config::{DEFAULT_ORDER, MIN_ORDER};
use crate::common::{Error, RecordId, Result};

/// A sorted index from keys to record locators.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                        BPlusTree                         │
/// │  ┌────────────────────────────────────────────────────┐  │
/// │  │                 RwLock<TreeCore>                   │  │
/// │  │  root: NodeId ──▶ arena: [Node0] [Node1] [Node2]…  │  │
/// │  │  order, len                                        │  │
/// │  └────────────────────────────────────────────────────┘  │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// One `RwLock` guards the whole tree:
/// - read lock: `search`, `contains`, `range_query`, `all_entries`,
///   `size`, `is_empty`, `height`, `validate`
/// - write lock: `insert`, `delete`, `clear`, `rebuild`
///
/// Guards release on every return path, errors included. There is no
/// per-node locking: writers are fully serialized against each other and
/// against readers.
///
/// # Usage
/// ```
/// use slotdb::{BPlusTree, PageId, RecordId};
///
/// let index = BPlusTree::new(4).unwrap();
/// index.insert(42, RecordId::new(PageId::new(1), 3)).unwrap();
///
/// assert_eq!(index.search(&42).unwrap(), Some(RecordId::new(PageId::new(1), 3)));
/// assert!(index.delete(&42).unwrap());
/// assert!(index.is_empty());
/// ```
pub struct BPlusTree<K, V> {
    inner: RwLock<TreeCore<K, V>>,

    /// Order (immutable after construction, readable without the lock).
    order: usize,
}

/// The index the record store builds: keys to [`RecordId`]s.
pub type RecordIndex<K> = BPlusTree<K, RecordId>;

impl<K: Ord + Clone, V: Clone> BPlusTree<K, V> {
    /// Create an empty tree of the given order.
    ///
    /// `order` is the node capacity: a node reaching `order` keys is split,
    /// so at rest every node holds at most `order - 1`.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < MIN_ORDER` (3)
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder {
                order,
                min: MIN_ORDER,
            });
        }
        Ok(Self::with_order(order))
    }

    /// Build around a fresh core; `order` is already validated.
    fn with_order(order: usize) -> Self {
        Self {
            inner: RwLock::new(TreeCore::new(order)),
            order,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    // ========================================================================
    // Public API: writes
    // ========================================================================

    /// Insert `key -> value`, replacing the value of an existing key.
    ///
    /// Returns the replaced value, or `None` if the key was new.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` if the tree structure is corrupt
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>> {
        self.inner.write().insert(key, value)
    }

    /// Remove `key`. Returns `true` if it was present.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` if rebalancing finds a corrupt structure
    pub fn delete(&self, key: &K) -> Result<bool> {
        self.inner.write().delete(key)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut tree = self.inner.write();
        tree.clear();
        debug!(order = self.order, "cleared index");
    }

    /// Replace the contents with `entries`, under a single write lock.
    ///
    /// This is how a storage layer rebuilds the index from its persisted
    /// records at startup. Later duplicates overwrite earlier ones. Returns
    /// the resulting size.
    pub fn rebuild<I>(&self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.inner.write().rebuild(entries)
    }

    // ========================================================================
    // Public API: reads
    // ========================================================================

    /// Value stored for `key`, or `None` if absent.
    pub fn search(&self, key: &K) -> Result<Option<V>> {
        self.inner.read().search(key)
    }

    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.inner.read().search(key)?.is_some())
    }

    /// All entries with `start <= key <= end`, in ascending key order.
    ///
    /// # Errors
    /// - `Error::InvalidRange` if `start > end`
    pub fn range_query(&self, start: &K, end: &K) -> Result<Vec<Entry<K, V>>> {
        self.inner.read().range_query(start, end)
    }

    /// Every entry in ascending key order.
    pub fn all_entries(&self) -> Result<Vec<Entry<K, V>>> {
        self.inner.read().all_entries()
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.inner.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Levels from root to leaves; a single leaf root is height 1.
    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` describing the first broken invariant
    pub fn validate(&self) -> Result<()> {
        self.inner.read().validate()
    }
}

impl<K: Ord + Clone, V: Clone> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }
}

/// `{:?}` prints a summary; `{:#?}` draws the whole tree.
impl<K: Ord + Clone + fmt::Debug, V: Clone> fmt::Debug for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.inner.read();
        if f.alternate() {
            tree.dump(f)
        } else {
            f.debug_struct("BPlusTree")
                .field("order", &self.order)
                .field("size", &tree.len)
                .field("height", &tree.height())
                .finish()
        }
    }
}
