//! Shared fingerprint -> files map written by the hashing workers.
//!
//! # Overview
//!
//! [`AggregationStore`] is the only mutable state shared between workers.
//! The map lives behind a single [`Mutex`] owned by the store, and the only
//! way to mutate it is [`AggregationStore::record`], which appends under the
//! lock. The map can only be read back by consuming the store
//! ([`AggregationStore::into_inner`]), which requires every worker's handle
//! to be gone. Unsynchronized appends to a shared `HashMap` are therefore not
//! expressible through this type.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::AggregationStore;
//! use dupfind::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let store = AggregationStore::new();
//! store.record([1u8; 32], FileEntry::new(PathBuf::from("/a"), 5));
//! store.record([1u8; 32], FileEntry::new(PathBuf::from("/b"), 5));
//!
//! let map = store.into_inner();
//! assert_eq!(map[&[1u8; 32]].len(), 2);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::scanner::{FileEntry, Hash};

/// Fingerprint -> files discovered with that fingerprint.
pub type HashGroups = HashMap<Hash, Vec<FileEntry>>;

/// Mutex-guarded aggregation of hashed files.
#[derive(Debug, Default)]
pub struct AggregationStore {
    groups: Mutex<HashGroups>,
}

impl AggregationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the bucket for `hash`.
    ///
    /// The lookup, append and store-back happen in one critical section over
    /// the whole map, so concurrent callers inserting new keys never race.
    pub fn record(&self, hash: Hash, entry: FileEntry) {
        self.lock().entry(hash).or_default().push(entry);
    }

    /// Number of distinct fingerprints recorded so far.
    #[must_use]
    pub fn fingerprint_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of files recorded so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    /// Consume the store and return the map.
    #[must_use]
    pub fn into_inner(self) -> HashGroups {
        self.groups
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // A worker that panicked while holding the lock finished any push it
    // started, so the map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashGroups> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
