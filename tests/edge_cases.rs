use ldup::duplicates::{DuplicateFinder, FinderConfig};
use ldup::scanner::{WalkerConfig, PREHASH_SIZE};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

fn recursive_finder() -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default().with_walker_config(WalkerConfig::new(true, false)),
    )
}

#[test]
fn test_zero_byte_files_group_without_any_read() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("empty1.txt")).unwrap();
    File::create(dir.path().join("empty2.txt")).unwrap();
    File::create(dir.path().join("empty3.txt")).unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    assert_eq!(groups[0].size, 0);

    // No content was opened for this group
    assert_eq!(summary.prefix_reads, 0);
    assert_eq!(summary.full_reads, 0);
}

#[test]
fn test_single_zero_byte_file_is_not_a_group() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("empty.txt")).unwrap();
    File::create(dir.path().join("full.txt"))
        .unwrap()
        .write_all(b"data")
        .unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_very_small_files() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("small1.txt"))
        .unwrap()
        .write_all(b"a")
        .unwrap();
    File::create(dir.path().join("small2.txt"))
        .unwrap()
        .write_all(b"a")
        .unwrap();
    File::create(dir.path().join("small3.txt"))
        .unwrap()
        .write_all(b"b")
        .unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.total_files, 3);
}

#[test]
fn test_unique_size_never_triggers_hashing() {
    let dir = tempdir().unwrap();

    // All sizes distinct: nothing should ever be opened
    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"x")
        .unwrap();
    File::create(dir.path().join("b.txt"))
        .unwrap()
        .write_all(b"xx")
        .unwrap();
    File::create(dir.path().join("c.txt"))
        .unwrap()
        .write_all(b"xxx")
        .unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.prefix_reads, 0);
    assert_eq!(summary.full_reads, 0);
    assert_eq!(summary.eliminated_by_size, 3);
}

#[test]
fn test_no_file_read_in_full_more_than_once() {
    let dir = tempdir().unwrap();

    for name in ["a.bin", "b.bin", "c.bin"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(&[7u8; 2000])
            .unwrap();
    }

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    // Three candidates: one prefix read and one full read each, no rereads
    assert_eq!(summary.prefix_reads, 3);
    assert_eq!(summary.full_reads, 3);
}

#[test]
fn test_prefix_match_prunes_full_read() {
    let dir = tempdir().unwrap();

    // Same size, prefixes differ: full content must never be read
    File::create(dir.path().join("a.bin"))
        .unwrap()
        .write_all(&vec![b'a'; PREHASH_SIZE * 2])
        .unwrap();
    File::create(dir.path().join("b.bin"))
        .unwrap()
        .write_all(&vec![b'b'; PREHASH_SIZE * 2])
        .unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.prefix_reads, 2);
    assert_eq!(summary.full_reads, 0);
}

#[test]
fn test_file_at_prehash_boundary() {
    let dir = tempdir().unwrap();

    let content = vec![b'x'; PREHASH_SIZE];
    File::create(dir.path().join("a.bin"))
        .unwrap()
        .write_all(&content)
        .unwrap();
    File::create(dir.path().join("b.bin"))
        .unwrap()
        .write_all(&content)
        .unwrap();

    let finder = recursive_finder();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, PREHASH_SIZE as u64);
}

#[test]
fn test_same_prefix_different_tail() {
    let dir = tempdir().unwrap();

    let mut content_a = vec![b'x'; PREHASH_SIZE + 100];
    let content_b = content_a.clone();
    content_a[PREHASH_SIZE + 50] = b'y';

    File::create(dir.path().join("a.bin"))
        .unwrap()
        .write_all(&content_a)
        .unwrap();
    File::create(dir.path().join("b.bin"))
        .unwrap()
        .write_all(&content_b)
        .unwrap();

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    // The prefix filter cannot separate them; the full hash must
    assert!(groups.is_empty());
    assert_eq!(summary.prefix_reads, 2);
    assert_eq!(summary.full_reads, 2);
}

#[test]
fn test_large_duplicate_spanning_many_chunks() {
    let dir = tempdir().unwrap();

    // Larger than the 64 KiB streaming chunk so hashing iterates
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    File::create(dir.path().join("big1.bin"))
        .unwrap()
        .write_all(&content)
        .unwrap();
    File::create(dir.path().join("big2.bin"))
        .unwrap()
        .write_all(&content)
        .unwrap();

    let finder = recursive_finder();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 200_000);
}

#[test]
fn test_mixed_empty_and_content_duplicates() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("e1")).unwrap();
    File::create(dir.path().join("e2")).unwrap();
    for name in ["c1.txt", "c2.txt"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"payload")
            .unwrap();
    }

    let finder = recursive_finder();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(summary.duplicate_groups, 2);

    // Groups are ordered by size descending: content group first
    assert_eq!(groups[0].size, 7);
    assert_eq!(groups[1].size, 0);
}
