//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping**: group files by exact size (see
//!    [`crate::duplicates::groups`]); zero-byte files short-circuit to a
//!    finished group without hashing
//! 2. **Phase 2 - Prefix fingerprint**: hash the first 4KB of same-size
//!    files and prune sub-classes that fall to one member
//! 3. **Phase 3 - Full hash**: stream the entire content of whatever is
//!    still ambiguous
//!
//! Each refinement step only subdivides classes from the previous step,
//! so a file's full content is read at most once per scan, and a file
//! whose size is unique is never read at all.
//!
//! # Example
//!
//! ```no_run
//! use ldup::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use growable_bloom_filter::GrowableBloom;
use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, hasher::files_identical, FileEntry, Hash, HashError, Hasher, MultiWalker,
    ScanError, WalkerConfig,
};

use super::groups::{group_by_size, DuplicateGroup};

/// False positive rate for the streaming size filters.
const BLOOM_FP_RATE: f64 = 0.01;

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// A fingerprint class key: parent size plus the stage's digest.
///
/// Keying on the pair keeps every refinement scoped inside its parent
/// size class, so classes from different sizes can never merge.
pub type ClassKey = (u64, Hash);

/// Drop singleton partitions, keeping only classes that can still hold
/// duplicates.
///
/// Both hashing stages end with this step: a class that refines down to
/// one member is proven unique and leaves the pipeline.
fn retain_ambiguous<K: std::hash::Hash + Eq>(
    groups: HashMap<K, Vec<FileEntry>>,
    mut on_unique: impl FnMut(FileEntry),
) -> HashMap<K, Vec<FileEntry>> {
    groups
        .into_iter()
        .filter_map(|(key, mut files)| {
            if files.len() > 1 {
                Some((key, files))
            } else {
                if let Some(file) = files.pop() {
                    on_unique(file);
                }
                None
            }
        })
        .collect()
}

/// Build a bounded thread pool for hashing I/O.
fn build_pool(io_threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(io_threads)
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "Failed to create custom thread pool, using global sizing with {} threads",
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        })
}

/// Configuration for the prefix fingerprint phase.
#[derive(Clone, Default)]
pub struct PrehashConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for PrehashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrehashConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl PrehashConfig {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the prefix fingerprint phase.
#[derive(Debug, Clone, Default)]
pub struct PrehashStats {
    /// Total files that entered Phase 2
    pub input_files: usize,
    /// Number of files successfully fingerprinted
    pub hashed_files: usize,
    /// Number of files that failed to read
    pub failed_files: usize,
    /// Errors encountered during fingerprinting
    pub errors: Vec<HashError>,
    /// Number of files eliminated as unique within their size class
    pub unique_prehashes: usize,
    /// Number of files that could still be duplicates
    pub potential_duplicates: usize,
    /// Number of fingerprint classes with 2+ files
    pub duplicate_groups: usize,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

impl PrehashStats {
    /// Percentage of files eliminated by prefix comparison.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.potential_duplicates;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Group files by prefix fingerprint within size classes (Phase 2).
///
/// For each size class, hashes the first [`crate::scanner::PREHASH_SIZE`]
/// bytes of every member and refines the class by that digest. A
/// sub-class of one file cannot contain duplicates; its full content is
/// never read. This bounds per-file I/O to a constant amount regardless
/// of file size.
///
/// Returns the surviving classes keyed by `(size, prefix digest)` and
/// statistics about the phase.
#[must_use]
pub fn phase2_prehash(
    size_groups: HashMap<u64, Vec<FileEntry>>,
    hasher: Arc<Hasher>,
    config: PrehashConfig,
) -> (HashMap<ClassKey, Vec<FileEntry>>, PrehashStats) {
    let input_files: usize = size_groups.values().map(Vec::len).sum();
    let mut stats = PrehashStats {
        input_files,
        ..Default::default()
    };

    let all_files: Vec<FileEntry> = size_groups.into_values().flatten().collect();
    if all_files.is_empty() {
        log::debug!("Phase 2: no files to process");
        return (HashMap::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("prehash", all_files.len());
    }

    log::info!(
        "Phase 2: computing prefix fingerprints for {} files",
        all_files.len()
    );

    let pool = build_pool(config.io_threads.max(1));

    // Hash on a bounded pool; entries skipped after shutdown come back
    // as None and are discarded by the caller's interruption check.
    let results: Vec<Option<(FileEntry, Result<Hash, HashError>)>> = pool.install(|| {
        all_files
            .into_par_iter()
            .enumerate()
            .map(|(idx, file)| {
                if config.is_shutdown_requested() {
                    return None;
                }
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                }
                let result = hasher.prehash(&file.path);
                Some((file, result))
            })
            .collect()
    });

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 2: interrupted by shutdown signal");
    }

    let mut prehash_groups: HashMap<ClassKey, Vec<FileEntry>> = HashMap::new();
    for (file, result) in results.into_iter().flatten() {
        match result {
            Ok(prehash) => {
                stats.hashed_files += 1;
                prehash_groups
                    .entry((file.size, prehash))
                    .or_default()
                    .push(file);
            }
            Err(e) => {
                log::warn!("Failed to fingerprint {}: {}", file.path.display(), e);
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    let filtered = retain_ambiguous(prehash_groups, |file| {
        stats.unique_prehashes += 1;
        log::trace!("Eliminated by prefix fingerprint: {}", file.path.display());
    });

    for files in filtered.values() {
        stats.potential_duplicates += files.len();
        stats.duplicate_groups += 1;
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("prehash");
    }

    log::info!(
        "Phase 2 complete: {} files -> {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}

/// Configuration for the full hash phase.
#[derive(Clone, Default)]
pub struct FullhashConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Re-verify hash matches byte by byte before grouping.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FullhashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullhashConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FullhashConfig {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the full hash phase.
#[derive(Debug, Clone, Default)]
pub struct FullhashStats {
    /// Total files that entered Phase 3
    pub input_files: usize,
    /// Number of files successfully hashed in full
    pub hashed_files: usize,
    /// Number of files that failed to read
    pub failed_files: usize,
    /// Errors encountered during hashing
    pub errors: Vec<HashError>,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of confirmed duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space wasted by duplicates
    pub wasted_space: u64,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Compute full hashes for the remaining ambiguous classes (Phase 3).
///
/// The authoritative step: streams the entire content of every file
/// whose size and prefix both matched something else, and groups by
/// `(size, full digest)`. Equal digest is treated as equal content;
/// with `paranoid` set, groups are additionally re-verified byte by
/// byte before being reported.
#[must_use]
pub fn phase3_fullhash(
    prehash_groups: HashMap<ClassKey, Vec<FileEntry>>,
    hasher: Arc<Hasher>,
    config: FullhashConfig,
) -> (Vec<DuplicateGroup>, FullhashStats) {
    let input_files: usize = prehash_groups.values().map(Vec::len).sum();
    let mut stats = FullhashStats {
        input_files,
        ..Default::default()
    };

    let all_files: Vec<FileEntry> = prehash_groups.into_values().flatten().collect();
    if all_files.is_empty() {
        log::debug!("Phase 3: no files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("fullhash", all_files.len());
    }

    log::info!("Phase 3: computing full hashes for {} files", all_files.len());

    let pool = build_pool(config.io_threads.max(1));

    let results: Vec<Option<(FileEntry, Result<Hash, HashError>)>> = pool.install(|| {
        all_files
            .into_par_iter()
            .enumerate()
            .map(|(idx, file)| {
                if config.is_shutdown_requested() {
                    return None;
                }
                if file.size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        file.size / (1024 * 1024),
                        file.path.display()
                    );
                }
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                }
                let result = hasher.full_hash(&file.path);
                if result.is_ok() {
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_item_completed(file.size);
                    }
                }
                Some((file, result))
            })
            .collect()
    });

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 3: interrupted by shutdown signal");
    }

    let mut fullhash_groups: HashMap<ClassKey, Vec<FileEntry>> = HashMap::new();
    for (file, result) in results.into_iter().flatten() {
        match result {
            Ok(fullhash) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                fullhash_groups
                    .entry((file.size, fullhash))
                    .or_default()
                    .push(file);
            }
            Err(e) => {
                if !e.is_interrupted() {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                }
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    let confirmed = retain_ambiguous(fullhash_groups, |file| {
        log::trace!("Eliminated by full hash: {}", file.path.display());
    });

    let mut duplicate_groups: Vec<DuplicateGroup> = Vec::new();
    for ((size, hash), files) in confirmed {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            hash_to_hex(&hash),
            files.len(),
            size
        );
        if config.paranoid {
            for bucket in confirm_identical(files, &mut stats.errors) {
                if bucket.len() > 1 {
                    duplicate_groups.push(DuplicateGroup::new(hash, size, bucket));
                }
            }
        } else {
            duplicate_groups.push(DuplicateGroup::new(hash, size, files));
        }
    }

    stats.duplicate_groups = duplicate_groups.len();
    stats.duplicate_files = duplicate_groups.iter().map(DuplicateGroup::duplicate_count).sum();
    stats.wasted_space = duplicate_groups.iter().map(DuplicateGroup::wasted_space).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("fullhash");
    }

    log::info!(
        "Phase 3 complete: {} groups, {} duplicates, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (duplicate_groups, stats)
}

/// Re-partition a hash-matched group by streamed byte comparison.
///
/// Defense against the (astronomically unlikely) case of a digest
/// collision. Files that cannot be re-read are dropped from the group
/// with a warning.
fn confirm_identical(files: Vec<FileEntry>, errors: &mut Vec<HashError>) -> Vec<Vec<FileEntry>> {
    let mut buckets: Vec<Vec<FileEntry>> = Vec::new();

    'files: for file in files {
        for bucket in &mut buckets {
            match files_identical(&bucket[0].path, &file.path) {
                Ok(true) => {
                    bucket.push(file);
                    continue 'files;
                }
                Ok(false) => {
                    log::warn!(
                        "Hash collision suspected: {} differs from {} despite equal digest",
                        file.path.display(),
                        bucket[0].path.display()
                    );
                }
                Err(e) => {
                    log::warn!("Failed to verify {}: {}", file.path.display(), e);
                    errors.push(e);
                    continue 'files;
                }
            }
        }
        buckets.push(vec![file]);
    }

    buckets
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Enable byte-by-byte verification after hash matching.
    pub paranoid: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            paranoid: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-by-byte verification after hash matching.
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files considered
    pub total_files: usize,
    /// Total size of all considered files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size partitioning (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files eliminated by prefix fingerprint
    pub eliminated_by_prehash: usize,
    /// Number of prefix reads issued during this scan
    pub prefix_reads: usize,
    /// Number of full-content reads issued during this scan
    pub full_reads: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Non-fatal warnings collected during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }

    /// Whether any non-fatal warnings were collected.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that abort a duplicate scan.
///
/// Per-path problems never abort; they surface as warnings on
/// [`ScanSummary`]. Only an empty root list (a configuration error,
/// caught before any I/O) or a shutdown request ends the run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// No root directories were provided.
    #[error("No directories provided to scan")]
    NoRoots,
}

/// Duplicate finder that orchestrates the multi-phase pipeline.
///
/// 1. **Walk** — collect candidate files from the roots
/// 2. **Phase 1** — partition by size, discard unique sizes
/// 3. **Phase 2** — prefix fingerprints for same-size files
/// 4. **Phase 3** — full hashes for whatever remains ambiguous
///
/// # Example
///
/// ```no_run
/// use ldup::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under a single root.
    ///
    /// Convenience wrapper around [`Self::find_duplicates_in_paths`].
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn find_duplicates(
        &self,
        path: &std::path::Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        self.find_duplicates_in_paths(vec![path.to_path_buf()])
    }

    /// Find all duplicate files across the given root directories.
    ///
    /// Runs the complete pipeline and returns the confirmed groups in a
    /// deterministic order (groups by size descending then digest,
    /// members by path) together with scan statistics and warnings.
    ///
    /// Invalid roots and unreadable entries become warnings on the
    /// summary; they never abort the scan.
    ///
    /// # Errors
    ///
    /// - [`FinderError::NoRoots`] if `paths` is empty (checked before
    ///   any I/O)
    /// - [`FinderError::Interrupted`] if shutdown was requested; partial
    ///   results are discarded
    pub fn find_duplicates_in_paths(
        &self,
        paths: Vec<PathBuf>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let metrics_start = self.hasher.metrics();
        let mut summary = ScanSummary::default();

        if paths.is_empty() {
            return Err(FinderError::NoRoots);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {} path(s)", paths.len());

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Scanning {} path(s)", paths.len()));
        }

        let mut multi_walker = MultiWalker::new(paths, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            multi_walker = multi_walker.with_shutdown_flag(flag.clone());
        }

        let roots = multi_walker.roots();
        log::info!(
            "Scanning {} directory root(s): {:?}",
            roots.len(),
            roots.iter().map(|p| p.display()).collect::<Vec<_>>()
        );

        // Collect candidate files. Unique sizes are rejected on the fly
        // so the common case never keeps one entry per scanned file.
        let mut files = Vec::new();
        let mut seen_sizes = GrowableBloom::new(BLOOM_FP_RATE, 1000);
        let mut duplicate_sizes = GrowableBloom::new(BLOOM_FP_RATE, 1000);
        let mut first_occurrences: HashMap<u64, FileEntry> = HashMap::new();
        let mut walked = 0usize;

        for result in multi_walker.walk() {
            match result {
                Ok(file) => {
                    walked += 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(walked, file.path.to_string_lossy().as_ref());
                    }

                    // Zero-byte files are the partitioner's special case
                    if file.size == 0 {
                        files.push(file);
                        continue;
                    }

                    if duplicate_sizes.contains(file.size) {
                        files.push(file);
                    } else if seen_sizes.contains(file.size) {
                        duplicate_sizes.insert(file.size);
                        if let Some(first) = first_occurrences.remove(&file.size) {
                            files.push(first);
                        }
                        files.push(file);
                    } else {
                        seen_sizes.insert(file.size);
                        first_occurrences.insert(file.size, file);
                    }
                }
                Err(e) => summary.scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        summary.total_files = files.len() + first_occurrences.len();
        summary.total_size = files.iter().map(|f| f.size).sum::<u64>()
            + first_occurrences.values().map(|f| f.size).sum::<u64>();

        log::info!(
            "Found {} files ({})",
            summary.total_files,
            summary.total_size_display()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let discarded_during_walk = first_occurrences.len();
        drop(first_occurrences);

        // Phase 1: partition by size
        let (size_groups, empty_files, size_stats) = group_by_size(files);
        summary.eliminated_by_size = size_stats.eliminated_unique + discarded_during_walk;

        let mut duplicate_groups: Vec<DuplicateGroup> = Vec::new();

        // Two or more empty files are trivially identical; no hashing stage
        if empty_files.len() > 1 {
            log::debug!(
                "{} empty files form a duplicate group without any content read",
                empty_files.len()
            );
            duplicate_groups.push(DuplicateGroup::from_empty_files(empty_files));
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if !size_groups.is_empty() {
            // Phase 2: prefix fingerprint comparison
            let prehash_config = PrehashConfig {
                io_threads: self.config.io_threads,
                shutdown_flag: self.config.shutdown_flag.clone(),
                progress_callback: self.config.progress_callback.clone(),
            };

            let (prehash_groups, prehash_stats) =
                phase2_prehash(size_groups, self.hasher.clone(), prehash_config);

            summary.eliminated_by_prehash = prehash_stats.unique_prehashes;
            summary.scan_errors.extend(
                prehash_stats
                    .errors
                    .into_iter()
                    .filter(|e| !e.is_interrupted())
                    .map(ScanError::from),
            );

            if prehash_stats.interrupted || self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }

            if !prehash_groups.is_empty() {
                // Phase 3: full hash comparison
                let fullhash_config = FullhashConfig {
                    io_threads: self.config.io_threads,
                    paranoid: self.config.paranoid,
                    shutdown_flag: self.config.shutdown_flag.clone(),
                    progress_callback: self.config.progress_callback.clone(),
                };

                let (confirmed, fullhash_stats) =
                    phase3_fullhash(prehash_groups, self.hasher.clone(), fullhash_config);

                summary.scan_errors.extend(
                    fullhash_stats
                        .errors
                        .into_iter()
                        .filter(|e| !e.is_interrupted())
                        .map(ScanError::from),
                );

                if fullhash_stats.interrupted || self.config.is_shutdown_requested() {
                    return Err(FinderError::Interrupted);
                }

                duplicate_groups.extend(confirmed);
            }
        }

        // Deterministic output: members by path, groups by size then digest
        for group in &mut duplicate_groups {
            group.sort_files();
        }
        duplicate_groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.hash.cmp(&b.hash)));

        summary.duplicate_groups = duplicate_groups.len();
        summary.duplicate_files = duplicate_groups
            .iter()
            .map(DuplicateGroup::duplicate_count)
            .sum();
        summary.reclaimable_space = duplicate_groups
            .iter()
            .map(DuplicateGroup::wasted_space)
            .sum();

        let metrics = self.hasher.metrics().since(&metrics_start);
        summary.prefix_reads = metrics.prefix_reads;
        summary.full_reads = metrics.full_reads;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((duplicate_groups, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    fn entry(path: &Path) -> FileEntry {
        let size = std::fs::metadata(path).unwrap().len();
        FileEntry::new(path.to_path_buf(), size)
    }

    #[test]
    fn test_retain_ambiguous() {
        let mut groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
        groups.insert(
            1,
            vec![
                FileEntry::new(PathBuf::from("/a"), 1),
                FileEntry::new(PathBuf::from("/b"), 1),
            ],
        );
        groups.insert(2, vec![FileEntry::new(PathBuf::from("/c"), 2)]);

        let mut pruned = Vec::new();
        let kept = retain_ambiguous(groups, |f| pruned.push(f.path));

        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key(&1));
        assert_eq!(pruned, vec![PathBuf::from("/c")]);
    }

    #[test]
    fn test_finder_config_io_threads_clamped() {
        let config = FinderConfig::default().with_io_threads(0);
        assert_eq!(config.io_threads, 1);
    }

    #[test]
    fn test_phase2_prunes_unique_prefixes() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.txt", b"shared content");
        let b = write_file(dir.path(), "b.txt", b"shared content");
        let c = write_file(dir.path(), "c.txt", b"other contents"); // same size

        let mut size_groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
        size_groups.insert(14, vec![entry(&a), entry(&b), entry(&c)]);

        let hasher = Arc::new(Hasher::new());
        let (groups, stats) =
            phase2_prehash(size_groups, hasher, PrehashConfig::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(stats.input_files, 3);
        assert_eq!(stats.hashed_files, 3);
        assert_eq!(stats.unique_prehashes, 1);
        assert_eq!(stats.potential_duplicates, 2);
    }

    #[test]
    fn test_phase3_separates_same_prefix_different_tail() {
        use crate::scanner::PREHASH_SIZE;

        let dir = TempDir::new().unwrap();
        let mut base = vec![b'x'; PREHASH_SIZE + 8];
        let a = write_file(dir.path(), "a.bin", &base);
        let b = write_file(dir.path(), "b.bin", &base);
        base[PREHASH_SIZE + 3] = b'y';
        let c = write_file(dir.path(), "c.bin", &base);

        let hasher = Arc::new(Hasher::new());
        let mut size_groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
        size_groups.insert(
            (PREHASH_SIZE + 8) as u64,
            vec![entry(&a), entry(&b), entry(&c)],
        );

        let (prehash_groups, _) =
            phase2_prehash(size_groups, hasher.clone(), PrehashConfig::default());
        // Prefixes all match, so nothing was pruned yet
        assert_eq!(prehash_groups.values().map(Vec::len).sum::<usize>(), 3);

        let (groups, stats) =
            phase3_fullhash(prehash_groups, hasher, FullhashConfig::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(stats.hashed_files, 3);
    }

    #[test]
    fn test_phase3_paranoid_keeps_true_duplicates() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.txt", b"identical twins");
        let b = write_file(dir.path(), "b.txt", b"identical twins");

        let hasher = Arc::new(Hasher::new());
        let mut prehash_groups: HashMap<ClassKey, Vec<FileEntry>> = HashMap::new();
        prehash_groups.insert((15, [1u8; 32]), vec![entry(&a), entry(&b)]);

        let config = FullhashConfig {
            paranoid: true,
            ..Default::default()
        };
        let (groups, _) = phase3_fullhash(prehash_groups, hasher, config);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_phase_errors_on_vanished_file() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.txt", b"will survive!");
        let b = write_file(dir.path(), "b.txt", b"will survive!");
        let ghost = dir.path().join("ghost.txt");

        let mut size_groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
        size_groups.insert(
            13,
            vec![entry(&a), entry(&b), FileEntry::new(ghost, 13)],
        );

        let hasher = Arc::new(Hasher::new());
        let (groups, stats) =
            phase2_prehash(size_groups, hasher, PrehashConfig::default());

        // The vanished file is excluded; its siblings proceed
        assert_eq!(stats.failed_files, 1);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(groups.values().map(Vec::len).sum::<usize>(), 2);
    }

    #[test]
    fn test_no_roots_is_a_config_error() {
        let finder = DuplicateFinder::with_defaults();
        let err = finder.find_duplicates_in_paths(Vec::new()).unwrap_err();
        assert!(matches!(err, FinderError::NoRoots));
    }

    #[test]
    fn test_shutdown_before_scan_interrupts() {
        let flag = Arc::new(AtomicBool::new(true));
        let finder =
            DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

        let dir = TempDir::new().unwrap();
        let err = finder.find_duplicates(dir.path()).unwrap_err();
        assert!(matches!(err, FinderError::Interrupted));
    }

    #[test]
    fn test_summary_display_helpers() {
        let summary = ScanSummary {
            total_size: 2048,
            reclaimable_space: 1024,
            ..Default::default()
        };
        assert!((summary.wasted_percentage() - 50.0).abs() < 0.1);
        assert!(!summary.reclaimable_display().is_empty());
        assert!(!summary.has_warnings());
    }
}
