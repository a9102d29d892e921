//! # Posted clip stores
//!
//! Durable record of which clip ids were already announced.

pub use self::file::JsonFileStore;
pub use self::memory::MemoryStore;

pub mod file;
pub mod memory;

use crate::error::StoreError;

/// A grow-only set of announced clip ids.
///
/// `add` must not return before the id is durable, the pipeline relies on it
/// to never announce a clip twice.
pub trait DedupStore: Send {
    /// Check whether the clip was already announced
    fn contains(&self, id: &str) -> bool;

    /// Record a clip as announced and persist the whole set
    fn add(&mut self, id: &str) -> Result<(), StoreError>;

    /// Number of recorded ids
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
