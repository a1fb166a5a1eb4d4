//! The producer side of a scan.
//!
//! [`Walker::walk`] yields every regular file under the root as a lazy
//! iterator of `Result<FileEntry, ScanError>`; an unreadable entry becomes an
//! `Err` item and the walk continues past it. [`Walker::feed`] drives that
//! iterator into the hashing queue and closes the queue when it is done.
//!
//! Directory reads run on jwalk's rayon pool, children are sorted by name so
//! a tree is always visited in the same order, and filtering (ignore
//! patterns, hidden names, sizes, symlinks) happens before anything reaches
//! the queue.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let (tx, rx) = crossbeam_channel::bounded(64);
//! let consumer = std::thread::spawn(move || rx.iter().count());
//!
//! let stats = walker.feed(tx);
//! assert_eq!(consumer.join().unwrap(), stats.files);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Recursive file lister for one root.
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    // notified once per file handed to the queue
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

/// Counters produced by [`Walker::feed`].
#[derive(Debug, Clone, Default)]
pub struct WalkStats {
    /// Files handed to the work queue
    pub files: usize,
    /// Sum of the sizes of those files
    pub bytes: u64,
    /// Entries that could not be visited
    pub errors: Vec<ScanError>,
    /// Whether the walk stopped early because of a shutdown request
    pub interrupted: bool,
}

impl Walker {
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Stop pulling entries once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The root being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    // Root .gitignore plus the configured patterns; None when nothing to match.
    fn ignore_matcher(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let root_ignore = self.root.join(".gitignore");
        if self.config.respect_gitignore && root_ignore.is_file() {
            match builder.add(&root_ignore) {
                Some(e) => log::warn!("Skipping {}: {}", root_ignore.display(), e),
                None => log::debug!("Using ignore rules from {}", root_ignore.display()),
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Ignoring invalid pattern '{}': {}", pattern, e);
            }
        }

        builder
            .build()
            .map_err(|e| log::warn!("Ignore patterns disabled: {}", e))
            .ok()
            .filter(|matcher| !matcher.is_empty())
    }

    fn is_ignored(&self, path: &Path, matcher: Option<&Gitignore>) -> bool {
        let Some(matcher) = matcher else {
            return false;
        };
        match path.strip_prefix(&self.root) {
            Ok(relative) => matcher
                .matched_path_or_any_parents(relative, false)
                .is_ignore(),
            Err(_) => false,
        }
    }

    fn passes_size_filter(&self, size: u64) -> bool {
        if self.config.skip_empty && size == 0 {
            return false;
        }
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Lazily list the regular files under the root.
    ///
    /// Unreadable entries, including symlinks whose target is missing, come
    /// out as `Err` items. Directories, ignored paths, other unfollowed
    /// symlinks and filtered sizes are skipped silently.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let matcher = self.ignore_matcher();

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_, _, _, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (a, b) => b.is_ok().cmp(&a.is_ok()),
                });
            })
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Shutdown requested, walk of {} stops", self.root.display());
                }
                !stop
            })
            .filter_map(move |item| match item {
                Ok(entry) => self.visit(entry.path(), entry.file_type(), matcher.as_ref()),
                Err(e) => {
                    let path = e.path().map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(self.jwalk_error(path, e)))
                }
            })
    }

    fn visit(
        &self,
        path: PathBuf,
        file_type: std::fs::FileType,
        matcher: Option<&Gitignore>,
    ) -> Option<Result<FileEntry, ScanError>> {
        if file_type.is_dir() || path == self.root {
            return None;
        }
        if self.is_ignored(&path, matcher) {
            log::trace!("Ignored: {}", path.display());
            return None;
        }
        if file_type.is_symlink() && !self.config.follow_symlinks {
            // Not followed, but a link whose target cannot be reached is reported.
            if let Err(e) = std::fs::metadata(&path) {
                return Some(Err(self.io_error(&path, e)));
            }
            log::trace!("Not following symlink: {}", path.display());
            return None;
        }

        let metadata = if self.config.follow_symlinks {
            std::fs::metadata(&path)
        } else {
            std::fs::symlink_metadata(&path)
        };
        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Some(Err(self.io_error(&path, e))),
        };

        // fifos, sockets, devices
        if !metadata.is_file() {
            log::trace!("Not a regular file: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!("Size {} filtered out: {}", size, path.display());
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }

    /// Drive the walk into a work queue.
    ///
    /// The sender is taken by value and dropped when the walk ends, which
    /// closes the queue for the consumers exactly once. Blocks when a bounded
    /// queue is full.
    pub fn feed(&self, sender: Sender<FileEntry>) -> WalkStats {
        let mut stats = WalkStats::default();

        for result in self.walk() {
            match result {
                Ok(entry) => {
                    stats.files += 1;
                    stats.bytes += entry.size;
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(stats.files, entry.path.to_string_lossy().as_ref());
                    }
                    if sender.send(entry).is_err() {
                        // Every receiver is gone; nothing left to feed.
                        log::warn!("Work queue closed before the walk finished");
                        stats.files -= 1;
                        break;
                    }
                }
                Err(e) => stats.errors.push(e),
            }
        }

        drop(sender);
        stats.interrupted = self.is_shutdown_requested();

        log::debug!(
            "Walk of {} finished: {} files, {} errors",
            self.root.display(),
            stats.files,
            stats.errors.len()
        );
        stats
    }

    fn io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("Path not found (broken link or removed): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: Arc::new(error),
                }
            }
        }
    }

    fn jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        match error.io_error().map(std::io::Error::kind) {
            Some(kind) => self.io_error(&path, std::io::Error::new(kind, error.to_string())),
            None => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                ScanError::Io {
                    path,
                    source: Arc::new(std::io::Error::other(error.to_string())),
                }
            }
        }
    }
}
