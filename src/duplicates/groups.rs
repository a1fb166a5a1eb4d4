//! Duplicate groups and the post-hash filter.
//!
//! # Overview
//!
//! Once every worker has joined, the drained aggregation map is turned into
//! [`DuplicateGroup`]s by [`filter_duplicates`], which keeps only fingerprints
//! shared by two or more files.
//!
//! Workers append to a bucket in whatever order the scheduler lets them, so
//! the order of files within a group (and of groups within the map) differs
//! between runs. [`GroupOrder::Sorted`] removes that variance for reports and
//! tests; [`GroupOrder::Unordered`] skips the sort.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{filter_duplicates, GroupOrder, HashGroups};
//! use dupfind::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let mut map = HashGroups::new();
//! map.entry([1; 32]).or_default().push(FileEntry::new(PathBuf::from("/b"), 5));
//! map.entry([1; 32]).or_default().push(FileEntry::new(PathBuf::from("/a"), 5));
//! map.entry([2; 32]).or_default().push(FileEntry::new(PathBuf::from("/c"), 5));
//!
//! let (groups, stats) = filter_duplicates(map, GroupOrder::Sorted);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].files[0].path, PathBuf::from("/a"));
//! assert_eq!(stats.unique_files, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::store::HashGroups;
use crate::scanner::{FileEntry, Hash};

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content fingerprint shared by every file in the group
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    /// File size in bytes (identical content means identical size)
    pub size: u64,
    /// Files sharing the fingerprint; index 0 is the copy that is kept on deletion
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileEntry>) -> Self {
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        if self.files.len() > 1 {
            self.total_size().saturating_sub(self.files[0].size)
        } else {
            0
        }
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Sort files by path so the kept copy (index 0) is stable.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Output ordering for [`filter_duplicates`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// Paths sorted within each group; groups by reclaimable bytes
    /// (largest first), then by hash.
    #[default]
    Sorted,
    /// Whatever order the map and the workers produced.
    Unordered,
}

/// Counters from the filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Distinct fingerprints in the input map
    pub fingerprints: usize,
    /// Files whose fingerprint was not shared
    pub unique_files: usize,
    /// Groups kept
    pub duplicate_groups: usize,
    /// Files in kept groups beyond the first of each group
    pub duplicate_files: usize,
    /// Bytes that removing every duplicate would free
    pub wasted_space: u64,
}

/// Keep fingerprints shared by two or more files.
///
/// Pure over its input: the same map yields the same groups, and with
/// [`GroupOrder::Sorted`] the same order.
#[must_use]
pub fn filter_duplicates(groups: HashGroups, order: GroupOrder) -> (Vec<DuplicateGroup>, FilterStats) {
    let mut stats = FilterStats {
        fingerprints: groups.len(),
        ..Default::default()
    };

    let mut duplicates: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter_map(|(hash, files)| {
            if files.len() < 2 {
                stats.unique_files += files.len();
                return None;
            }
            let size = files.first().map_or(0, |f| f.size);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                crate::scanner::hash_to_hex(&hash),
                files.len(),
                size
            );
            Some(DuplicateGroup::new(hash, size, files))
        })
        .collect();

    if order == GroupOrder::Sorted {
        for group in &mut duplicates {
            group.sort_files();
        }
        duplicates.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| a.hash.cmp(&b.hash))
        });
    }

    stats.duplicate_groups = duplicates.len();
    stats.duplicate_files = duplicates.iter().map(DuplicateGroup::duplicate_count).sum();
    stats.wasted_space = duplicates.iter().map(DuplicateGroup::wasted_space).sum();

    (duplicates, stats)
}

mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::scanner::{hash_to_hex, hex_to_hash, Hash};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex_to_hash(&hex).ok_or_else(|| serde::de::Error::custom("expected 64 hex characters"))
    }
}
