//! Progress reporting utilities using indicatif.
//!
//! The detection pipeline reports through the [`ProgressCallback`]
//! trait so the core never touches a terminal directly. [`Progress`]
//! is the CLI implementation: a spinner while walking, counted bars
//! for the two hashing phases, all drawn on stderr so stdout stays
//! clean for results.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during the
/// duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// `total` is the number of items the phase will process; 0 when
    /// unknown in advance (the walking phase).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed (1-based).
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been fully processed, with its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the display message.
    fn on_message(&self, _message: &str) {}
}

/// Terminal progress reporter.
///
/// One bar per pipeline phase, managed through a [`MultiProgress`] so
/// phases can overlap without fighting over the terminal.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    prehash: Mutex<Option<ProgressBar>>,
    fullhash: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// With `quiet` set, no bars are drawn and every callback is a
    /// no-op.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            prehash: Mutex::new(None),
            fullhash: Mutex::new(None),
            quiet,
        }
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "walking" => Some(&self.walking),
            "prehash" => Some(&self.prehash),
            "fullhash" => Some(&self.fullhash),
            _ => None,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} ({pos} files)")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:>10} [{bar:30.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
    }

    fn phase_label(phase: &str) -> &'static str {
        match phase {
            "prehash" => "Comparing",
            "fullhash" => "Hashing",
            _ => "Scanning",
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let Some(slot) = self.slot(phase) else { return };

        let bar = if phase == "walking" {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.set_message("Scanning");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            let bar = self.multi.add(ProgressBar::new(total as u64));
            bar.set_style(Self::bar_style());
            bar.set_message(Self::phase_label(phase));
            bar
        };

        *slot.lock().expect("progress lock poisoned") = Some(bar);
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        // Walk position is unknown ahead of time; the other phases are
        // counted against their totals.
        for slot in [&self.walking, &self.prehash, &self.fullhash] {
            if let Some(bar) = slot.lock().expect("progress lock poisoned").as_ref() {
                if !bar.is_finished() {
                    bar.set_position(current as u64);
                    if let Some(name) = std::path::Path::new(path).file_name() {
                        bar.set_message(name.to_string_lossy().into_owned());
                    }
                    return;
                }
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let Some(slot) = self.slot(phase) else { return };
        if let Some(bar) = slot.lock().expect("progress lock poisoned").take() {
            bar.finish_and_clear();
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self.walking.lock().expect("progress lock poisoned").as_ref() {
            bar.set_message(message.to_string());
        }
    }
}
