//! BLAKE3 file hashing with bounded-memory streaming.
//!
//! # Overview
//!
//! The [`Hasher`] computes two kinds of fingerprints:
//!
//! - **Prefix fingerprint** ([`Hasher::prehash`]): a hash of the first
//!   [`PREHASH_SIZE`] bytes only. Cheap enough to run on every file in a
//!   same-size group; eliminates most non-duplicates without reading
//!   full contents.
//! - **Full fingerprint** ([`Hasher::full_hash`]): a hash of the entire
//!   file, streamed in fixed-size chunks so peak memory stays constant
//!   regardless of file size.
//!
//! The hasher counts how many prefix and full reads it has issued
//! ([`Hasher::metrics`]), which lets callers and tests verify that no
//! file is read in full more than once per scan.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Number of leading bytes covered by the prefix fingerprint.
pub const PREHASH_SIZE: usize = 4096;

/// Chunk size for streaming reads. Bounds per-file memory during full
/// hashing and byte comparison.
const CHUNK_SIZE: usize = 64 * 1024;

/// Read counts observed by a [`Hasher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HasherMetrics {
    /// Number of prefix reads issued
    pub prefix_reads: usize,
    /// Number of full-content reads issued
    pub full_reads: usize,
}

impl HasherMetrics {
    /// Reads issued since an earlier snapshot.
    #[must_use]
    pub fn since(&self, earlier: &HasherMetrics) -> HasherMetrics {
        HasherMetrics {
            prefix_reads: self.prefix_reads - earlier.prefix_reads,
            full_reads: self.full_reads - earlier.full_reads,
        }
    }
}

/// BLAKE3 file hasher.
///
/// Thread-safe: one instance is shared across the hashing worker pool.
/// An optional shutdown flag aborts in-flight full reads between chunks.
#[derive(Debug, Default)]
pub struct Hasher {
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    prefix_reads: AtomicUsize,
    full_reads: AtomicUsize,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the first [`PREHASH_SIZE`] bytes of a file.
    ///
    /// For files shorter than the prefix, the whole content is covered.
    /// I/O is bounded to one prefix-sized read regardless of file size.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, HashError> {
        self.prefix_reads.fetch_add(1, Ordering::Relaxed);

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buf = [0u8; PREHASH_SIZE];
        let mut filled = 0;

        // read() may return short counts; keep going until the prefix is
        // filled or the file ends.
        while filled < PREHASH_SIZE {
            let n = file
                .read(&mut buf[filled..])
                .map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        Ok(*blake3::hash(&buf[..filled]).as_bytes())
    }

    /// Hash the entire content of a file, streamed in fixed-size chunks.
    ///
    /// Peak memory is [`CHUNK_SIZE`] regardless of file size. The
    /// shutdown flag is polled between chunks; a shutdown mid-read fails
    /// with an `Interrupted` I/O error.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or if
    /// shutdown was requested while streaming.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        self.full_reads.fetch_add(1, Ordering::Relaxed);

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::from_io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::Interrupted, "shutdown requested"),
                ));
            }
            let n = file
                .read(&mut buf)
                .map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Snapshot of the read counters.
    #[must_use]
    pub fn metrics(&self) -> HasherMetrics {
        HasherMetrics {
            prefix_reads: self.prefix_reads.load(Ordering::Relaxed),
            full_reads: self.full_reads.load(Ordering::Relaxed),
        }
    }
}

/// Compare two files byte by byte with bounded memory.
///
/// Used by paranoid mode to confirm that a hash match really is a
/// content match.
///
/// # Errors
///
/// Returns [`HashError`] if either file cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let n_a = read_full(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
        let n_b = read_full(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill as much of `buf` as the file will give, tolerating short reads.
fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Render a hash as a lowercase hexadecimal string.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write as _;

    let mut hex = String::with_capacity(64);
    for byte in hash {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
