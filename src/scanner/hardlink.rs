//! Hardlink detection for avoiding false duplicate identification.
//!
//! Hardlinks are multiple directory entries pointing to the same inode.
//! They share content but are NOT duplicates — they are the same file,
//! and listing them as a duplicate group would be misleading. The
//! tracker remembers `(device, inode)` pairs and reports repeat
//! sightings.
//!
//! # Platform Support
//!
//! - **Unix**: `(device, inode)` from file metadata
//! - **Other**: detection disabled; every file is treated as unique

use std::collections::HashSet;
use std::fs::Metadata;

/// Tracks seen inodes to detect hardlinks.
///
/// Not thread-safe; the walker that owns it applies it from a single
/// consuming iterator.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    seen: HashSet<InodeKey>,
}

impl HardlinkTracker {
    /// Create a new hardlink tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a file is a hardlink to a previously seen file.
    ///
    /// The first sighting of an inode is recorded and reported as not a
    /// hardlink; subsequent sightings return `true`. On platforms
    /// without inode metadata this always returns `false`.
    pub fn is_hardlink(&mut self, metadata: &Metadata) -> bool {
        if let Some(key) = InodeKey::from_metadata(metadata) {
            if self.seen.contains(&key) {
                return true;
            }
            self.seen.insert(key);
        }
        false
    }

    /// Number of distinct inodes recorded so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Identity of a file on disk: device plus inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InodeKey {
    device: u64,
    inode: u64,
}

impl InodeKey {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
