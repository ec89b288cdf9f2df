//! Directory walkers built on jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] traverses a single root and yields every regular file it
//! can reach, subject to the recursion and hidden-entry rules in
//! [`WalkerConfig`]. [`MultiWalker`] layers root-list normalization and
//! cross-root deduplication on top, so overlapping roots, duplicate
//! roots, and hardlinks never produce two entries for one underlying
//! file.
//!
//! # Symlink policy
//!
//! Symbolic links are never followed and never reported, whether they
//! point at directories (avoids traversal loops) or at files (a symlink
//! is an alias, not a copy; reporting it as a duplicate of its target
//! would be misleading). Hardlinked names for the same inode are
//! likewise collapsed to the first one seen.
//!
//! # Hidden entries
//!
//! With `include_hidden` off, a dot-prefixed directory is not descended
//! into at all and a dot-prefixed file is never yielded. A root the
//! user named explicitly is always traversed, hidden or not.
//!
//! # Example
//!
//! ```no_run
//! use ldup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::new(true, false));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::hardlink::HardlinkTracker;
use super::{path_utils, FileEntry, ScanError, WalkerConfig};

/// Directory walker for a single root.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag is set, remaining entries are discarded instead of
    /// being yielded.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Walk the root, yielding file entries and per-path warnings.
    ///
    /// Only directory-listing and metadata system calls are performed;
    /// file contents are never opened here. Children are visited in
    /// sorted order for deterministic traversal.
    pub fn walk(self) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
        let Walker {
            root,
            config,
            shutdown_flag,
        } = self;

        let max_depth = if config.recursive { usize::MAX } else { 1 };

        let walk_dir = WalkDir::new(&root)
            .follow_links(false)
            .skip_hidden(!config.include_hidden)
            .max_depth(max_depth)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if shutdown_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                log::debug!("Walker: shutdown requested, discarding remaining entries");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // Skip the root directory itself
                    if path == root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = match std::fs::symlink_metadata(&path) {
                        Ok(m) => m,
                        Err(e) => return Some(Err(io_scan_error(&path, e))),
                    };

                    // Sockets, FIFOs and the like are not content
                    if !metadata.is_file() {
                        return None;
                    }

                    Some(Ok(FileEntry::new(path, metadata.len())))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(jwalk_scan_error(path, &e)))
                }
            }
        })
    }
}

/// Classify an I/O error encountered while stat-ing a path.
fn io_scan_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::debug!("File vanished during scan: {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            }
        }
    }
}

/// Convert a jwalk traversal error into a warning.
fn jwalk_scan_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
    log::warn!("Walker error for {}: {}", path.display(), error);
    if let Some(io) = error.io_error() {
        if io.kind() == std::io::ErrorKind::PermissionDenied {
            return ScanError::PermissionDenied(path);
        }
        if io.kind() == std::io::ErrorKind::NotFound {
            return ScanError::NotFound(path);
        }
    }
    ScanError::Io {
        path,
        source: Arc::new(std::io::Error::other(error.to_string())),
    }
}

/// Walker over a list of roots with cross-root deduplication.
///
/// Construction normalizes the root list: roots are canonicalized,
/// exact duplicates are dropped, invalid roots become warnings, and —
/// when recursing — a root nested inside another kept root is pruned so
/// its files are not visited twice. Every yielded file is additionally
/// deduplicated by NFC-normalized canonical path and by inode.
#[derive(Debug)]
pub struct MultiWalker {
    roots: Vec<PathBuf>,
    invalid: Vec<ScanError>,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl MultiWalker {
    /// Create a walker over the given roots.
    ///
    /// Roots that do not exist or are not directories are recorded and
    /// later yielded as warnings; they never abort the scan.
    #[must_use]
    pub fn new(paths: Vec<PathBuf>, config: WalkerConfig) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();
        let mut seen_roots: HashSet<PathBuf> = HashSet::new();
        let mut invalid: Vec<ScanError> = Vec::new();

        for path in paths {
            let canonical = match std::fs::canonicalize(&path) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("Skipping missing root: {}", path.display());
                    invalid.push(ScanError::NotFound(path));
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    log::warn!("Skipping unreadable root: {}", path.display());
                    invalid.push(ScanError::PermissionDenied(path));
                    continue;
                }
                Err(e) => {
                    log::warn!("Skipping root {}: {}", path.display(), e);
                    invalid.push(ScanError::Io {
                        path,
                        source: Arc::new(e),
                    });
                    continue;
                }
            };

            if !canonical.is_dir() {
                log::warn!("Skipping non-directory root: {}", path.display());
                invalid.push(ScanError::NotADirectory(path));
                continue;
            }

            if seen_roots.insert(path_utils::normalize_pathbuf(&canonical)) {
                roots.push(canonical);
            } else {
                log::debug!("Ignoring duplicate root: {}", path.display());
            }
        }

        // A recursive walk of a parent already covers any nested root
        if config.recursive {
            let all = roots.clone();
            roots.retain(|root| {
                let nested = all
                    .iter()
                    .any(|other| other != root && root.starts_with(other));
                if nested {
                    log::debug!(
                        "Pruning root {} (covered by an enclosing root)",
                        root.display()
                    );
                }
                !nested
            });
        }

        Self {
            roots,
            invalid,
            config,
            shutdown_flag: None,
        }
    }

    /// The normalized roots that will actually be walked.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Walk all roots, yielding warnings for invalid roots first, then
    /// deduplicated file entries.
    pub fn walk(self) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
        let MultiWalker {
            roots,
            invalid,
            config,
            shutdown_flag,
        } = self;

        let mut seen_files: HashSet<PathBuf> = HashSet::new();
        let mut hardlinks = HardlinkTracker::new();

        let root_warnings = invalid.into_iter().map(Err);

        let files = roots
            .into_iter()
            .flat_map(move |root| {
                let mut walker = Walker::new(&root, config.clone());
                if let Some(flag) = &shutdown_flag {
                    walker = walker.with_shutdown_flag(flag.clone());
                }
                walker.walk()
            })
            .filter_map(move |result| {
                let file = match result {
                    Ok(file) => file,
                    Err(e) => return Some(Err(e)),
                };

                // Overlapping roots can reach one file by several paths;
                // key on the NFC-normalized canonical path.
                let canonical = std::fs::canonicalize(&file.path)
                    .unwrap_or_else(|_| file.path.clone());
                if !seen_files.insert(path_utils::normalize_pathbuf(&canonical)) {
                    log::trace!("Skipping already-seen path: {}", file.path.display());
                    return None;
                }

                if let Ok(metadata) = std::fs::symlink_metadata(&file.path) {
                    if hardlinks.is_hardlink(&metadata) {
                        log::debug!("Skipping hardlink: {}", file.path.display());
                        return None;
                    }
                }

                Some(Ok(file))
            });

        root_warnings.chain(files)
    }
}
