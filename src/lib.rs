//! ldup - Duplicate File Lister
//!
//! Finds groups of byte-identical files under one or more directory
//! roots using staged content hashing: size partitioning first, then a
//! 4KB BLAKE3 prefix fingerprint, and a streamed full-content hash only
//! for files that are still ambiguous.

use std::path::PathBuf;
use std::sync::Arc;

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use crate::cli::Cli;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application: scan, render, and choose an exit code.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed, if the
/// scan is interrupted, or if rendering fails. Non-fatal scan problems
/// are reported as warnings, not errors.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler()?;

    let mut config = FinderConfig::default()
        .with_io_threads(cli.io_threads)
        .with_paranoid(cli.paranoid)
        .with_walker_config(cli.walker_config())
        .with_shutdown_flag(handler.get_flag());

    // Bars draw on stderr, but a scripted (--json/--quiet) run should
    // stay silent there too apart from warnings.
    if !cli.quiet && !cli.json {
        config = config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let roots: Vec<PathBuf> = cli.roots();
    let finder = DuplicateFinder::new(config);
    let (groups, summary) = finder.find_duplicates_in_paths(roots)?;

    let exit_code = ExitCode::for_scan(groups.len(), summary.scan_errors.len());

    if cli.json {
        let output = JsonOutput::new(&groups, &summary, exit_code);
        println!("{}", output.to_json_pretty()?);
    } else {
        TextOutput::new(&groups, &summary).print()?;
    }

    Ok(exit_code)
}
