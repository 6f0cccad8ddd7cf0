//! Common types and utilities shared across slotdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - Record locators (PageId, RecordId)

pub mod config;
pub mod error;
mod record_id;

pub use error::{Error, Result};
pub use record_id::{PageId, RecordId};
