//! Duplicate detection module.
//!
//! This module provides:
//! - The shared fingerprint map ([`AggregationStore`])
//! - The fixed-size hashing pool ([`WorkerPool`])
//! - The post-hash filter ([`filter_duplicates`])
//! - The orchestrator that runs all of the above ([`DuplicateFinder`])

pub mod finder;
pub mod groups;
pub mod pool;
pub mod store;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{filter_duplicates, DuplicateGroup, FilterStats, GroupOrder};
pub use pool::{
    PoolConfig, PoolError, PoolReport, WorkerPool, WorkerStats, DEFAULT_WORKERS,
    MAX_QUEUE_CAPACITY, MAX_WORKERS, QUEUE_SLOTS_PER_WORKER,
};
pub use store::{AggregationStore, HashGroups};
