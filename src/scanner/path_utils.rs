//! Unicode path normalization utilities.
//!
//! macOS stores file names in NFD (decomposed) form while Linux and
//! Windows typically use NFC (composed), so the same visual name can
//! have two byte representations:
//!
//! - NFC: `café.txt` — 'é' is U+00E9 (single code point)
//! - NFD: `café.txt` — 'e' U+0065 + combining acute accent U+0301
//!
//! The cross-root deduplication key normalizes to NFC so the same file
//! reached through two spellings is only counted once.

use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a string to NFC (composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a [`Path`] to NFC form.
///
/// Paths containing invalid UTF-8 are returned unchanged; they cannot
/// collide with a normalized sibling spelling anyway.
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_nfd_to_nfc() {
        let nfd = "cafe\u{0301}.txt";
        assert_eq!(normalize_path_str(nfd), "café.txt");
    }

    #[test]
    fn test_normalize_nfc_unchanged() {
        let nfc = "café.txt";
        assert_eq!(normalize_path_str(nfc), nfc);
    }

    #[test]
    fn test_normalize_ascii_unchanged() {
        assert_eq!(normalize_path_str("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_normalize_pathbuf_components() {
        let path = PathBuf::from("documents/cafe\u{0301}.txt");
        assert_eq!(normalize_pathbuf(&path), PathBuf::from("documents/café.txt"));
    }

    #[test]
    fn test_spellings_collapse_to_same_key() {
        let a = PathBuf::from("/root/cafe\u{0301}/file.txt");
        let b = PathBuf::from("/root/café/file.txt");
        assert_eq!(normalize_pathbuf(&a), normalize_pathbuf(&b));
    }
}
