//! Command-line interface definitions.
//!
//! A single flat argument set, defined with the clap derive API: roots
//! to scan plus flags controlling traversal, output format, and
//! verbosity.
//!
//! # Example
//!
//! ```bash
//! # List duplicates among the direct children of the current directory
//! ldup
//!
//! # Recurse into subdirectories, include hidden entries
//! ldup -r --hidden ~/Documents ~/Downloads
//!
//! # Machine-readable output for scripting
//! ldup -r --json ~/Documents
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::scanner::WalkerConfig;

/// Searches for and lists duplicate files in the given directories.
///
/// Files are compared by content, not name: same-size files are
/// fingerprinted by their first 4KB and only still-ambiguous files are
/// hashed in full, so unique files are never read end to end.
#[derive(Debug, Parser)]
#[command(name = "ldup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan (defaults to the current directory)
    #[arg(value_name = "DIRECTORY")]
    pub directories: Vec<PathBuf>,

    /// Traverse subdirectories of each DIRECTORY
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden files and files inside hidden directories
    #[arg(long)]
    pub hidden: bool,

    /// Emit results as JSON instead of a human-readable listing
    #[arg(long)]
    pub json: bool,

    /// Number of I/O threads for hashing
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,

    /// Re-verify hash matches byte by byte before reporting
    ///
    /// Slower but rules out hash collisions entirely.
    #[arg(long)]
    pub paranoid: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and logging; print results only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// The roots to scan; the current directory when none were given.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.directories.clone()
        }
    }

    /// Walker configuration implied by the flags.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.recursive, self.hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ldup"]).unwrap();

        assert!(cli.directories.is_empty());
        assert!(!cli.recursive);
        assert!(!cli.hidden);
        assert!(!cli.json);
        assert_eq!(cli.io_threads, 4);
        assert!(!cli.paranoid);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);

        assert_eq!(cli.roots(), vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_cli_multiple_directories() {
        let cli = Cli::try_parse_from(["ldup", "/a", "/b", "/c"]).unwrap();

        assert_eq!(
            cli.directories,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
        assert_eq!(cli.roots(), cli.directories);
    }

    #[test]
    fn test_cli_recursive_short_and_long() {
        let cli = Cli::try_parse_from(["ldup", "-r", "/a"]).unwrap();
        assert!(cli.recursive);

        let cli = Cli::try_parse_from(["ldup", "--recursive", "/a"]).unwrap();
        assert!(cli.recursive);
    }

    #[test]
    fn test_cli_hidden_and_json() {
        let cli = Cli::try_parse_from(["ldup", "--hidden", "--json", "/a"]).unwrap();
        assert!(cli.hidden);
        assert!(cli.json);
    }

    #[test]
    fn test_cli_walker_config() {
        let cli = Cli::try_parse_from(["ldup", "-r", "--hidden"]).unwrap();
        let config = cli.walker_config();

        assert!(config.recursive);
        assert!(config.include_hidden);
    }

    #[test]
    fn test_cli_verbosity_count() {
        let cli = Cli::try_parse_from(["ldup", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["ldup", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_io_threads() {
        let cli = Cli::try_parse_from(["ldup", "--io-threads", "8"]).unwrap();
        assert_eq!(cli.io_threads, 8);
    }

    #[test]
    fn test_cli_paranoid_and_json_errors() {
        let cli = Cli::try_parse_from(["ldup", "--paranoid", "--json-errors"]).unwrap();
        assert!(cli.paranoid);
        assert!(cli.json_errors);
    }

    #[test]
    fn test_cli_version_flag() {
        // clap exits early on --version, which try_parse_from reports as Err
        let result = Cli::try_parse_from(["ldup", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag() {
        let result = Cli::try_parse_from(["ldup", "--help"]);
        assert!(result.is_err());
    }
}
