//! Signal handling for graceful shutdown.
//!
//! Centralized Ctrl+C handling: an `Arc<AtomicBool>` flag is shared
//! with the walker and both hashing stages, which stop issuing new I/O
//! once it is set. Partial results are discarded by the caller, so an
//! interrupted run never emits a truncated report.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ldup::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//!
//! if handler.is_shutdown_requested() {
//!     // Stop scheduling work
//! }
//!
//! // Pass the flag to DuplicateFinder, Walker, etc.
//! let shutdown_flag = handler.get_flag();
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption: 128 + signal number.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Process-wide flag backing every installed handler. `ctrlc` only
/// accepts one handler per process, so repeated installs share it.
static INSTALLED_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Shutdown handler wrapping the shared atomic flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the flag for passing to worker threads.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }
}

/// Install the Ctrl+C handler and return a [`ShutdownHandler`] bound to
/// its flag.
///
/// Safe to call more than once in a process (e.g., across tests):
/// subsequent calls return a handler sharing the already-installed
/// flag.
///
/// # Errors
///
/// Returns an error if the underlying OS signal hook cannot be
/// registered.
pub fn install_handler() -> anyhow::Result<ShutdownHandler> {
    if let Some(flag) = INSTALLED_FLAG.get() {
        return Ok(ShutdownHandler { flag: flag.clone() });
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "Interrupted. Cleaning up...");
    })?;

    let _ = INSTALLED_FLAG.set(handler.get_flag());
    Ok(handler)
}
