//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Content hashing with BLAKE3 (prefix fingerprint + streamed full hash)
//! - Hardlink detection
//! - Unicode path normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (prefix and streaming full-content)
//! - [`hardlink`]: Inode tracking so one file never competes with itself
//! - [`path_utils`]: NFC path normalization for cross-root deduplication
//!
//! # Example
//!
//! ```no_run
//! use ldup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     recursive: true,
//!     include_hidden: false,
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hardlink;
pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

// Re-export main types
pub use hasher::{hash_to_hex, Hash, Hasher, HasherMetrics, PREHASH_SIZE};
pub use walker::{MultiWalker, Walker};

/// A discovered regular file.
///
/// Carries the two facts needed to enter duplicate detection: where the
/// file lives and how many bytes it holds. Entries are created once per
/// scan and never mutated; fingerprints computed later in the pipeline
/// travel alongside the entry rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false, only direct children of
    /// each root are considered.
    pub recursive: bool,

    /// Include hidden entries (names starting with `.`). When false,
    /// hidden directories are not descended into at all and hidden files
    /// are never yielded.
    pub include_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration from CLI flags.
    #[must_use]
    pub fn new(recursive: bool, include_hidden: bool) -> Self {
        Self {
            recursive,
            include_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
///
/// These are non-fatal: the scan reports them as warnings and continues
/// with the remaining entries.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// The path the warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::NotADirectory(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
            Self::Hash(e) => e.path(),
        }
    }

    /// The reason, without the path repeated.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::NotFound(_) => "path not found".to_string(),
            Self::NotADirectory(_) => "not a directory".to_string(),
            Self::PermissionDenied(_) => "permission denied".to_string(),
            Self::Io { source, .. } => source.to_string(),
            Self::Hash(e) => e.reason(),
        }
    }
}

/// Errors that can occur while reading a file for hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The file was not found (it may have vanished mid-scan).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }

    /// The reason, without the path repeated.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::NotFound(_) => "file not found".to_string(),
            Self::PermissionDenied(_) => "permission denied".to_string(),
            Self::Io { source, .. } => source.to_string(),
        }
    }

    /// Whether this error came from a shutdown request mid-read.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let entry = FileEntry::new(PathBuf::from("/test/file.txt"), 1024);

        assert_eq!(entry.path, PathBuf::from("/test/file.txt"));
        assert_eq!(entry.size, 1024);
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.recursive);
        assert!(!config.include_hidden);
    }

    #[test]
    fn test_walker_config_new() {
        let config = WalkerConfig::new(true, true);

        assert!(config.recursive);
        assert!(config.include_hidden);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }

    #[test]
    fn test_scan_error_path_and_reason() {
        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.path(), Path::new("/missing"));
        assert_eq!(err.reason(), "path not found");

        let err = ScanError::Io {
            path: PathBuf::from("/x"),
            source: Arc::new(std::io::Error::other("boom")),
        };
        assert_eq!(err.path(), Path::new("/x"));
        assert_eq!(err.reason(), "boom");
    }

    #[test]
    fn test_hash_error_classification() {
        let err = HashError::from_io(
            Path::new("/gone"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, HashError::NotFound(_)));

        let err = HashError::from_io(
            Path::new("/secret"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, HashError::PermissionDenied(_)));
        assert_eq!(err.to_string(), "Permission denied: /secret");
    }

    #[test]
    fn test_hash_error_is_interrupted() {
        let err = HashError::from_io(
            Path::new("/x"),
            std::io::Error::from(std::io::ErrorKind::Interrupted),
        );
        assert!(err.is_interrupted());

        let err = HashError::NotFound(PathBuf::from("/x"));
        assert!(!err.is_interrupted());
    }
}
