//! Duplicate finder: the scan pipeline orchestrator.
//!
//! # Overview
//!
//! [`DuplicateFinder`] wires the pieces together in a fixed order:
//!
//! 1. **Validate** the root (missing or non-directory roots fail before any
//!    thread starts)
//! 2. **Spawn** the [`WorkerPool`] on the receiving end of a bounded queue
//! 3. **Walk** on the calling thread, feeding the queue; the walker drops the
//!    sender when done, closing the queue
//! 4. **Join** the pool (completion barrier)
//! 5. **Filter** the drained store into duplicate groups
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(16));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use super::groups::{filter_duplicates, DuplicateGroup, GroupOrder};
use super::pool::{
    PoolConfig, PoolError, WorkerPool, DEFAULT_WORKERS, MAX_QUEUE_CAPACITY, MAX_WORKERS,
    QUEUE_SLOTS_PER_WORKER,
};
use super::store::AggregationStore;
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{FileEntry, HashAlgorithm, Hasher, ScanError, WalkStats, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers.
    pub workers: usize,
    /// Work queue capacity; `None` means `workers * 2`.
    pub queue_capacity: Option<usize>,
    /// Fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Walker configuration.
    pub walker_config: WalkerConfig,
    /// Ordering applied to the resulting groups.
    pub order: GroupOrder,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("order", &self.order)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            algorithm: HashAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            order: GroupOrder::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers (minimum 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the work queue capacity (minimum 1).
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity.clamp(1, MAX_QUEUE_CAPACITY));
        self
    }

    /// Set the fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the group ordering.
    #[must_use]
    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Effective queue capacity.
    #[must_use]
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.workers.max(1).saturating_mul(QUEUE_SLOTS_PER_WORKER))
            .min(MAX_QUEUE_CAPACITY)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn pool_config(&self) -> PoolConfig {
        let mut config = PoolConfig::default().with_workers(self.workers);
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }
        config
    }
}

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Files handed to the workers
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Files hashed and recorded
    pub hashed_files: usize,
    /// Files that could not be hashed
    pub failed_files: usize,
    /// Bytes read by the workers
    pub bytes_hashed: u64,
    /// Number of hashing workers used
    pub workers: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the kept copy)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Walk and hash errors, one per offending path
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken up by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize(self.total_size).to_string()
    }

    /// Whether any non-fatal error was collected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The worker pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Duplicate finder that orchestrates the scan pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_algorithm(config.algorithm);
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory (checked before any
    ///   thread is started)
    /// - The scan is interrupted by the shutdown flag
    /// - A worker thread cannot be spawned or panics
    ///
    /// Unreadable entries and files are not errors here; they are collected
    /// in [`ScanSummary::scan_errors`].
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        self.run_pipeline(|sender| walker.feed(sender))
    }

    /// Find duplicates among an already collected list of files.
    ///
    /// The files go through the same queue and worker pool as a directory
    /// scan. Entries that no longer exist are reported as hash errors.
    ///
    /// # Errors
    ///
    /// Same as [`DuplicateFinder::find_duplicates`], minus path validation.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let flag = self.config.shutdown_flag.clone();
        self.run_pipeline(move |sender| {
            let mut stats = WalkStats::default();
            for file in files {
                if flag.as_ref().is_some_and(|f| f.load(Ordering::SeqCst)) {
                    stats.interrupted = true;
                    break;
                }
                let size = file.size;
                if sender.send(file).is_err() {
                    break;
                }
                stats.files += 1;
                stats.bytes += size;
            }
            stats
        })
    }

    fn run_pipeline<P>(&self, produce: P) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError>
    where
        P: FnOnce(Sender<FileEntry>) -> WalkStats,
    {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let capacity = self.config.effective_queue_capacity();
        let (sender, receiver) = crossbeam_channel::bounded(capacity);

        let pool = WorkerPool::spawn(
            self.config.pool_config(),
            receiver,
            Arc::clone(&self.hasher),
            AggregationStore::new(),
        )?;

        log::info!(
            "Hashing with {} workers ({}), queue capacity {}",
            pool.worker_count(),
            self.hasher.algorithm(),
            capacity
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
            callback.on_phase_start(PHASE_HASHING, 0);
        }

        // The producer owns the only sender; the queue closes when it returns.
        let walk_stats = produce(sender);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        let report = pool.join()?;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        if walk_stats.interrupted || self.config.is_shutdown_requested() {
            log::info!("Scan interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let (groups, filter_stats) = filter_duplicates(report.store.into_inner(), self.config.order);

        let failed_files = report.errors.len();
        let mut scan_errors = walk_stats.errors;
        scan_errors.extend(report.errors.into_iter().map(ScanError::from));

        let summary = ScanSummary {
            total_files: walk_stats.files,
            total_size: walk_stats.bytes,
            hashed_files: report.hashed_files,
            failed_files,
            bytes_hashed: report.bytes_hashed,
            workers: report.workers,
            duplicate_groups: filter_stats.duplicate_groups,
            duplicate_files: filter_stats.duplicate_files,
            reclaimable_space: filter_stats.wasted_space,
            scan_duration: start_time.elapsed(),
            interrupted: false,
            scan_errors,
        };

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.total_files,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }
}
