//! Size-based file grouping and duplicate group management.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot have identical content, so partitioning by
//! exact byte size and discarding singleton classes eliminates most
//! candidates before a single byte of content is read.
//!
//! Zero-byte files are the one class that needs no hashing at all:
//! every empty file has the same (empty) content, so two or more of
//! them form a finished duplicate group immediately.
//!
//! # Example
//!
//! ```
//! use ldup::scanner::FileEntry;
//! use ldup::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, empty, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);  // the two 1024-byte files
//! assert_eq!(groups.len(), 1);
//! assert!(empty.is_empty());
//! ```

use std::collections::HashMap;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// Confirmed group of files with identical content.
///
/// The only structure that outlives the detection pipeline. Groups are
/// disjoint by construction: each file appears in at most one group.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the shared file content
    pub hash: Hash,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// The identical files, at least two
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileEntry>) -> Self {
        debug_assert!(files.iter().all(|f| f.size == size));
        Self { hash, size, files }
    }

    /// Build the group of zero-byte files.
    ///
    /// Empty files all share the hash of empty input, so the group is
    /// complete without opening a single file.
    #[must_use]
    pub fn from_empty_files(files: Vec<FileEntry>) -> Self {
        Self {
            hash: *blake3::hash(&[]).as_bytes(),
            size: 0,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space wasted by the group (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        if self.files.len() > 1 {
            self.size * (self.files.len() as u64 - 1)
        } else {
            0
        }
    }

    /// Number of duplicate copies (total minus one original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as a lowercase hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Just the member paths.
    #[must_use]
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Sort members by path for deterministic output.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct non-zero file sizes
    pub unique_sizes: usize,
    /// Number of files that could still be duplicates (in classes of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton classes)
    pub eliminated_unique: usize,
    /// Number of zero-byte files (grouped without hashing)
    pub empty_files: usize,
    /// Number of size classes with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size (Phase 1 of duplicate detection).
///
/// Returns:
/// - the size classes that still matter (cardinality ≥ 2, size > 0),
///   keyed by size;
/// - the zero-byte files, split out because they need no hashing — two
///   or more of them are already a finished duplicate group
///   (see [`DuplicateGroup::from_empty_files`]);
/// - statistics about the partitioning.
///
/// No file content is read; this operates purely on sizes gathered
/// during collection.
///
/// # Example
///
/// ```
/// use ldup::scanner::FileEntry;
/// use ldup::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, _empty, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);  // the 200-byte file
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (HashMap<u64, Vec<FileEntry>>, Vec<FileEntry>, GroupingStats) {
    let mut all_groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    let mut empty_files: Vec<FileEntry> = Vec::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size == 0 {
            empty_files.push(file);
            continue;
        }

        all_groups.entry(file.size).or_default().push(file);
    }

    stats.empty_files = empty_files.len();
    stats.unique_sizes = all_groups.len();

    let filtered_groups: HashMap<u64, Vec<FileEntry>> = all_groups
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated unique size {}: {}",
                    size,
                    files[0].path.display()
                );
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size class {} bytes: {} potential duplicates",
                    size,
                    files.len()
                );
                true
            }
        })
        .collect();

    log::info!(
        "Phase 1 complete: {} files -> {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered_groups, empty_files, stats)
}
