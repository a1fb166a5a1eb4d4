//! File discovery and fingerprinting.
//!
//! [`walker`] is the producing half of a scan: it turns a root directory into
//! a stream of [`FileEntry`] values. [`hasher`] turns one entry into a
//! [`Hash`]. Neither holds shared state, so both can be used on their own:
//!
//! ```no_run
//! use dupfind::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let walker = Walker::new(Path::new("."), WalkerConfig::default().with_skip_empty(true));
//!
//! for file in walker.walk().filter_map(Result::ok) {
//!     if let Ok(hash) = hasher.full_hash(&file.path) {
//!         println!("{}  {}", dupfind::scanner::hash_to_hex(&hash), file.path.display());
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub use hasher::{hash_to_hex, hex_to_hash, Hash, HashAlgorithm, Hasher};
pub use walker::{WalkStats, Walker};

/// A regular file discovered by the walker.
///
/// The path is fixed once the walker emits the entry; workers only read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path to the file, as reached from the scan root
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Which files a [`Walker`] emits. The default emits every regular file
/// under the root and never leaves it through a symlink.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories and hash symlinked files.
    pub follow_symlinks: bool,
    /// Drop entries whose name starts with `.`, and everything below them.
    pub skip_hidden: bool,
    /// Drop zero-length files (they all share one fingerprint).
    pub skip_empty: bool,
    /// Inclusive lower size bound in bytes.
    pub min_size: Option<u64>,
    /// Inclusive upper size bound in bytes.
    pub max_size: Option<u64>,
    /// Gitignore-style patterns.
    pub ignore_patterns: Vec<String>,
    /// Also apply the rules of a `.gitignore` at the root.
    pub respect_gitignore: bool,
}

impl WalkerConfig {
    /// Build from the filter settings; empty files are kept.
    #[must_use]
    pub fn new(
        follow_symlinks: bool,
        skip_hidden: bool,
        min_size: Option<u64>,
        max_size: Option<u64>,
        ignore_patterns: Vec<String>,
    ) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            skip_empty: false,
            min_size,
            max_size,
            ignore_patterns,
            respect_gitignore: false,
        }
    }

    #[must_use]
    pub fn with_respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Enable or disable skipping of zero-length files.
    #[must_use]
    pub fn with_skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }
}

/// A path the scan had to skip. Never fatal: the scan records it and moves on.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Vanished during the walk, or a dangling symlink.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Discovered, then failed in a hashing worker.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => p,
            Self::HashError(e) => e.path(),
        }
    }
}

/// Failure to read a file to the end while fingerprinting it.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// Removed between discovery and hashing.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Read failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entries_order_by_path() {
        let mut entries = vec![
            FileEntry::new(PathBuf::from("/b"), 1),
            FileEntry::new(PathBuf::from("/a"), 9),
        ];
        entries.sort();
        assert_eq!(entries[0].path, PathBuf::from("/a"));
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.follow_symlinks);
        assert!(!config.skip_hidden);
        assert!(!config.skip_empty);
        assert!(config.min_size.is_none());
        assert!(config.max_size.is_none());
        assert!(config.ignore_patterns.is_empty());
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_walker_config_new() {
        let config = WalkerConfig::new(
            true,
            true,
            Some(1024),
            Some(1_000_000),
            vec!["*.tmp".to_string()],
        )
        .with_skip_empty(true);

        assert!(config.follow_symlinks);
        assert!(config.skip_hidden);
        assert!(config.skip_empty);
        assert_eq!(config.min_size, Some(1024));
        assert_eq!(config.max_size, Some(1_000_000));
        assert_eq!(config.ignore_patterns, vec!["*.tmp".to_string()]);
    }

    #[test]
    fn test_scan_error_display() {
        let denied = ScanError::PermissionDenied(PathBuf::from("/root/secret"));
        let missing = ScanError::NotFound(PathBuf::from("/dangling"));

        assert_eq!(denied.to_string(), "Permission denied: /root/secret");
        assert_eq!(missing.to_string(), "Path not found: /dangling");
        assert_eq!(missing.path(), std::path::Path::new("/dangling"));
    }

    #[test]
    fn test_hash_error_display() {
        assert_eq!(
            HashError::NotFound(PathBuf::from("/tmp/gone")).to_string(),
            "File not found: /tmp/gone"
        );
        assert_eq!(
            HashError::PermissionDenied(PathBuf::from("/locked")).to_string(),
            "Permission denied: /locked"
        );
    }

    #[test]
    fn test_hash_error_from_io_classifies_kind() {
        let path = std::path::Path::new("/gone.txt");

        let err = HashError::from_io(path, std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, HashError::NotFound(_)));

        let err = HashError::from_io(
            path,
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, HashError::PermissionDenied(_)));

        let err = HashError::from_io(path, std::io::Error::other("disk on fire"));
        assert!(matches!(err, HashError::Io { .. }));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn test_scan_error_wraps_hash_error_path() {
        let err = ScanError::from(HashError::NotFound(PathBuf::from("/a")));
        assert_eq!(err.path(), std::path::Path::new("/a"));
        assert_eq!(err.to_string(), "File not found: /a");
    }
}
