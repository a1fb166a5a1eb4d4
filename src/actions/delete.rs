//! Deletion of duplicate copies.
//!
//! # Overview
//!
//! [`delete_duplicates`] removes every file of each [`DuplicateGroup`] except
//! the one at index 0:
//! - Nothing is touched unless the caller passes [`Confirmation::Confirmed`]
//! - Permanent removal by default, or move to the system trash
//! - One failed file is reported and the rest of the group still proceeds
//! - Files whose size changed since the scan are left alone
//!
//! Which copy sits at index 0 is decided by whoever built the groups. With
//! [`GroupOrder::Sorted`](crate::duplicates::GroupOrder::Sorted) it is the
//! lexicographically smallest path.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::actions::delete::{delete_duplicates, Confirmation, DeleteConfig};
//! use dupfind::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (groups, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let result = delete_duplicates(&groups, Confirmation::Confirmed, &DeleteConfig::default(), None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileEntry;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }
}

/// Explicit yes/no obtained from the user before anything is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead and delete.
    Confirmed,
    /// Delete nothing.
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Per-file outcome of a batch deletion.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions, each tagged with its path.
    pub failures: Vec<DeleteError>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether the batch was skipped for lack of confirmation.
    pub declined: bool,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.declined {
            "Deletion cancelled, no files removed".to_string()
        } else if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Remove files outright instead of moving them to the trash.
    pub permanent: bool,
    /// Skip files whose size no longer matches the scan.
    pub verify_size: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: true,
            verify_size: true,
        }
    }
}

impl DeleteConfig {
    /// Config for permanent removal.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }

    /// Config for moving files to the system trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            permanent: false,
            ..Self::default()
        }
    }

    /// Enable/disable the size check before removal.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &DeleteError);
}

/// Files that [`delete_duplicates`] would remove: every entry but index 0.
#[must_use]
pub fn deletion_candidates(groups: &[DuplicateGroup]) -> Vec<&FileEntry> {
    groups
        .iter()
        .flat_map(|g| g.files.iter().skip(1))
        .collect()
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be accessed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Permanently remove a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if removal is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

fn delete_entry(entry: &FileEntry, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.verify_size {
        let current = fs::symlink_metadata(&entry.path)
            .map_err(|e| DeleteError::from_io(&entry.path, e))?
            .len();
        if current != entry.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                entry.path.display(),
                entry.size,
                current
            );
            return Err(DeleteError::Modified(entry.path.clone()));
        }
    }

    if config.permanent {
        permanent_delete(&entry.path)
    } else {
        delete_to_trash(&entry.path)
    }
}

/// Delete every duplicate copy, keeping index 0 of each group.
///
/// Returns immediately with `declined` set when `confirmation` is
/// [`Confirmation::Declined`]. Otherwise every candidate is attempted; a
/// failure is logged once, recorded in `failures`, and does not stop the
/// remaining files of the group or of later groups.
#[must_use]
pub fn delete_duplicates(
    groups: &[DuplicateGroup],
    confirmation: Confirmation,
    config: &DeleteConfig,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    if confirmation == Confirmation::Declined {
        log::info!("Deletion declined, leaving {} group(s) untouched", groups.len());
        result.declined = true;
        return result;
    }

    let total = deletion_candidates(groups).len();
    let mut index = 0;

    for group in groups {
        let group_paths = group.paths();
        let victims: Vec<PathBuf> = group_paths.iter().skip(1).cloned().collect();
        if let Err(e) = validate_preserves_copy(&victims, &group_paths) {
            result.failures.push(e);
            index += victims.len();
            continue;
        }

        for entry in group.files.iter().skip(1) {
            if let Some(cb) = callback {
                cb.on_before_delete(&entry.path, index, total);
            }
            index += 1;

            match delete_entry(entry, config) {
                Ok(deleted) => {
                    result.bytes_freed += deleted.size;
                    if let Some(cb) = callback {
                        cb.on_delete_success(&deleted.path, deleted.size);
                    }
                    result.successes.push(deleted);
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", entry.path.display(), e);
                    if let Some(cb) = callback {
                        cb.on_delete_failure(&entry.path, &e);
                    }
                    result.failures.push(e);
                }
            }
        }
    }

    log::info!("{}", result.summary());

    result
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no path of the group survives.
///
/// # Example
///
/// ```
/// use dupfind::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/a"), PathBuf::from("/b")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    use std::collections::HashSet;

    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        Ok(())
    }
}
