//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress in the terminal while a scan runs.
//!
//! Walking and hashing overlap in time, so both phases are counters rather
//! than bars with a known length: the walker bumps the "walking" counter for
//! every file it queues, and the workers bump the "hashing" counter for every
//! file they finish.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while the walker discovers files.
pub const PHASE_WALKING: &str = "walking";

/// Phase name used while workers hash files.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for scan phases.
///
/// Implementations must be cheap and thread-safe: `on_item_completed` is
/// called concurrently from every hashing worker.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_HASHING`])
    /// * `total` - Total number of items, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called by the walker for each file it queues.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of files queued so far (1-based)
    /// * `path` - Path just queued
    fn on_progress(&self, current: usize, path: &str);

    /// Called by a worker after it hashes a file.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfind::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn counter_style(unit: &str) -> ProgressStyle {
        ProgressStyle::with_template(&format!(
            "{{spinner:.green}} {{msg}} [{{elapsed_precise}}] {{pos}} {unit}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            PHASE_WALKING => Some(&self.walking),
            PHASE_HASHING => Some(&self.hashing),
            _ => None,
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if self.quiet {
            return;
        }
        let Some(slot) = self.slot(phase) else {
            return;
        };

        let (message, unit) = if phase == PHASE_WALKING {
            ("Walking", "files queued")
        } else {
            ("Hashing", "files hashed")
        };
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::counter_style(unit));
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.walking.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_position(current as u64);
        }
    }

    fn on_item_completed(&self, _bytes: u64) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.hashing.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.inc(1);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let Some(slot) = self.slot(phase) else {
            return;
        };

        if let Some(pb) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pb.finish_with_message(format!("{} complete", capitalize(phase)));
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.walking.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_message(message.to_string());
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
