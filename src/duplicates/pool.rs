//! Fixed-size pool of hashing workers.
//!
//! # Overview
//!
//! [`WorkerPool::spawn`] starts `workers` named threads that share one
//! receiving end of the work queue. Each worker repeatedly takes a
//! [`FileEntry`], hashes it and records the result in the
//! [`AggregationStore`]. `recv` blocks while the queue is empty and open, and
//! fails once the producer has dropped its sender and the queue is drained,
//! which is when a worker exits.
//!
//! [`WorkerPool::join`] is the completion barrier: it waits for every worker
//! and only then hands the store back, so nothing can read the map while a
//! worker might still write to it.
//!
//! ```text
//! Walker ──send──▶ bounded queue ──recv──▶ worker 0..N ──record──▶ AggregationStore
//!                                              │
//!                                              └── HashError ──▶ error channel
//! ```
//!
//! The worker count bounds how many files are open at once regardless of
//! how many files the tree holds.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{AggregationStore, PoolConfig, WorkerPool};
//! use dupfind::scanner::{FileEntry, Hasher};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let (tx, rx) = crossbeam_channel::bounded(16);
//! let pool = WorkerPool::spawn(
//!     PoolConfig::default().with_workers(4),
//!     rx,
//!     Arc::new(Hasher::new()),
//!     AggregationStore::new(),
//! )
//! .unwrap();
//!
//! tx.send(FileEntry::new(PathBuf::from("Cargo.toml"), 0)).unwrap();
//! drop(tx);
//!
//! let report = pool.join().unwrap();
//! println!("hashed {} files", report.hashed_files);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::store::AggregationStore;
use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, HashError, Hasher};

/// Default number of hashing workers.
pub const DEFAULT_WORKERS: usize = 100;

/// Queue capacity per worker when no explicit capacity is configured.
pub const QUEUE_SLOTS_PER_WORKER: usize = 2;

/// Upper bound on the worker count; larger requests are clamped.
pub const MAX_WORKERS: usize = 1024;

/// Upper bound on an explicit queue capacity (the channel preallocates its slots).
pub const MAX_QUEUE_CAPACITY: usize = 1 << 16;

/// Configuration for the worker pool.
#[derive(Clone)]
pub struct PoolConfig {
    /// Number of worker threads (at least 1).
    pub workers: usize,
    /// Optional shutdown flag; once set, workers drain the queue without hashing.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, notified after each hashed file.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl PoolConfig {
    /// Set the worker count, clamped to `1..=MAX_WORKERS`.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
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
}

/// Errors raised by the pool itself (never by individual files).
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// The OS refused to start a worker thread.
    #[error("failed to spawn hashing worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// One or more workers panicked; their in-flight files were not recorded.
    #[error("{count} hashing worker(s) panicked")]
    WorkerPanicked {
        /// Number of workers that panicked
        count: usize,
    },

    /// The store was still referenced after every worker joined.
    #[error("aggregation store still shared after workers joined")]
    StoreStillShared,
}

/// Per-worker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Files hashed and recorded
    pub hashed: usize,
    /// Files that failed to hash
    pub failed: usize,
    /// Files drained without hashing after shutdown
    pub skipped: usize,
    /// Bytes of recorded files
    pub bytes: u64,
}

/// Result of a drained pool.
#[derive(Debug)]
pub struct PoolReport {
    /// The populated store, now exclusively owned by the caller
    pub store: AggregationStore,
    /// Files that could not be hashed, each reported once
    pub errors: Vec<HashError>,
    /// Number of workers that ran
    pub workers: usize,
    /// Files hashed and recorded
    pub hashed_files: usize,
    /// Files drained without hashing after a shutdown request
    pub skipped_files: usize,
    /// Bytes of recorded files
    pub bytes_hashed: u64,
}

struct WorkerContext {
    queue: Receiver<FileEntry>,
    errors: Sender<HashError>,
    hasher: Arc<Hasher>,
    store: Arc<AggregationStore>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl WorkerContext {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::default();

        while let Ok(entry) = self.queue.recv() {
            if self.is_shutdown_requested() {
                // Keep draining so a producer blocked on a full queue wakes up.
                stats.skipped += 1;
                continue;
            }

            match self.hasher.full_hash(&entry.path) {
                Ok(hash) => {
                    log::trace!("Hashed {}", entry.path.display());
                    stats.hashed += 1;
                    stats.bytes += entry.size;
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_item_completed(entry.size);
                    }
                    self.store.record(hash, entry);
                }
                Err(e) => {
                    log::warn!("Could not hash {}: {}", entry.path.display(), e);
                    stats.failed += 1;
                    // The pool holds the receiver until join, so this cannot fail.
                    let _ = self.errors.send(e);
                }
            }
        }

        stats
    }
}

/// A running set of hashing workers.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerStats>>,
    store: Arc<AggregationStore>,
    errors: Receiver<HashError>,
}

impl WorkerPool {
    /// Start the workers.
    ///
    /// `store` is moved into the pool and returned by [`WorkerPool::join`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a thread cannot be created. Workers
    /// that did start exit once the caller drops the queue's sender.
    pub fn spawn(
        config: PoolConfig,
        queue: Receiver<FileEntry>,
        hasher: Arc<Hasher>,
        store: AggregationStore,
    ) -> Result<Self, PoolError> {
        let workers = config.workers.clamp(1, MAX_WORKERS);
        let store = Arc::new(store);
        let (error_tx, error_rx) = crossbeam_channel::unbounded();

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let ctx = WorkerContext {
                queue: queue.clone(),
                errors: error_tx.clone(),
                hasher: Arc::clone(&hasher),
                store: Arc::clone(&store),
                shutdown_flag: config.shutdown_flag.clone(),
                progress_callback: config.progress_callback.clone(),
            };

            let handle = thread::Builder::new()
                .name(format!("dupfind-hash-{worker_id}"))
                .spawn(move || ctx.run())
                .map_err(PoolError::Spawn)?;
            handles.push(handle);
        }

        log::debug!("Started {} hashing workers", workers);

        Ok(Self {
            handles,
            store,
            errors: error_rx,
        })
    }

    /// Number of running workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit and collect the results.
    ///
    /// Returns only after the queue has been closed by the producer and
    /// drained by the workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::WorkerPanicked`] if any worker panicked. Every
    /// worker is joined before the error is returned.
    pub fn join(self) -> Result<PoolReport, PoolError> {
        let workers = self.handles.len();
        let mut totals = WorkerStats::default();
        let mut panicked = 0;

        for handle in self.handles {
            match handle.join() {
                Ok(stats) => {
                    totals.hashed += stats.hashed;
                    totals.failed += stats.failed;
                    totals.skipped += stats.skipped;
                    totals.bytes += stats.bytes;
                }
                Err(_) => panicked += 1,
            }
        }

        if panicked > 0 {
            log::error!("{} hashing worker(s) panicked", panicked);
            return Err(PoolError::WorkerPanicked { count: panicked });
        }

        let errors: Vec<HashError> = self.errors.try_iter().collect();
        debug_assert_eq!(errors.len(), totals.failed);

        let store = Arc::try_unwrap(self.store).map_err(|_| PoolError::StoreStillShared)?;

        log::debug!(
            "Workers drained: {} hashed, {} failed, {} skipped",
            totals.hashed,
            totals.failed,
            totals.skipped
        );

        Ok(PoolReport {
            store,
            errors,
            workers,
            hashed_files: totals.hashed,
            skipped_files: totals.skipped,
            bytes_hashed: totals.bytes,
        })
    }
}
