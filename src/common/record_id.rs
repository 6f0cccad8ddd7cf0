//! Record locators handed to the index by the record store.

use std::fmt;

/// Identifies a page in the heap file.
///
/// `u32` gives 4 billion pages, far more than the record store needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}

/// Location of a record: the page it lives on and its slot in that page.
///
/// The index never looks inside a `RecordId`. It stores the value on insert
/// and hands the same value back from searches and scans.
///
/// # Example
/// ```
/// use slotdb::{PageId, RecordId};
///
/// let rid = RecordId::new(PageId::new(3), 7);
/// assert_eq!(rid.page_id(), PageId::new(3));
/// assert_eq!(rid.slot(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    page_id: PageId,
    slot: u16,
}

impl RecordId {
    /// Create a locator for `slot` on `page_id`.
    #[inline]
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn slot(&self) -> u16 {
        self.slot
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}, slot {})", self.page_id.0, self.slot)
    }
}
