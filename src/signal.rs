//! Ctrl+C handling.
//!
//! A single `AtomicBool` is shared by the walker, every hashing worker and
//! the finder. Once it is set the walker stops producing and drops its end of
//! the queue, workers drain what is left in the queue without hashing, and
//! the finder reports
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted).
//!
//! ```no_run
//! use dupfind::duplicates::FinderConfig;
//!
//! let shutdown = dupfind::signal::install_handler().expect("signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(shutdown.shared());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Process exit code after SIGINT (128 + 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Cloneable handle on the shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// The underlying flag, as taken by [`FinderConfig::with_shutdown_flag`](crate::duplicates::FinderConfig::with_shutdown_flag).
    #[must_use]
    pub fn shared(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("could not install Ctrl+C handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static PROCESS_FLAG: Mutex<Option<ShutdownFlag>> = Mutex::new(None);

/// Hook Ctrl+C to the process-wide [`ShutdownFlag`].
///
/// `ctrlc` allows one handler per process, so the hook is registered by the
/// first successful call only. Every later call returns the same flag,
/// cleared, which lets scans run back to back in one process. A failed
/// registration leaves nothing behind, so the next call tries again.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the OS hook cannot be set.
pub fn install_handler() -> Result<ShutdownFlag, SignalError> {
    install_into(&PROCESS_FLAG, |flag| {
        let on_signal = flag.clone();
        ctrlc::set_handler(move || {
            on_signal.set();
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted, waiting for workers to drain the queue...");
            let _ = stderr.flush();
            log::info!("Shutdown requested by Ctrl+C");
        })
    })
}

fn install_into(
    slot: &Mutex<Option<ShutdownFlag>>,
    register: impl FnOnce(&ShutdownFlag) -> Result<(), ctrlc::Error>,
) -> Result<ShutdownFlag, SignalError> {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(flag) = slot.as_ref() {
        flag.clear();
        return Ok(flag.clone());
    }

    let flag = ShutdownFlag::new();
    match register(&flag) {
        Ok(()) => {}
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("A Ctrl+C handler is already registered; the flag will not be set by signals");
        }
        Err(e) => return Err(SignalError::InstallFailed(e)),
    }

    *slot = Some(flag.clone());
    Ok(flag)
}
