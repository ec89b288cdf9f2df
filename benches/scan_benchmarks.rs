use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ldup::duplicates::{DuplicateFinder, FinderConfig};
use ldup::scanner::{Hasher, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a test directory with a specific structure
fn setup_test_dir(depth: usize, files_per_dir: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    create_dir_recursive(temp_dir.path().to_path_buf(), depth, files_per_dir);
    temp_dir
}

fn create_dir_recursive(path: PathBuf, depth: usize, files_per_dir: usize) {
    if depth == 0 {
        return;
    }

    if !path.exists() {
        fs::create_dir_all(&path).expect("Failed to create dir");
    }

    for i in 0..files_per_dir {
        let file_path = path.join(format!("file_{}.txt", i));
        // Half the files per directory repeat content so every phase runs
        let content = if i % 2 == 0 {
            format!("shared content block {}", i)
        } else {
            format!("unique content {} in {}", i, path.display())
        };
        fs::write(file_path, content).expect("Failed to write file");
    }

    if depth > 1 {
        for i in 0..2 {
            let sub_dir = path.join(format!("dir_{}", i));
            create_dir_recursive(sub_dir, depth - 1, files_per_dir);
        }
    }
}

// 1. Directory Walking Benchmarks
fn bench_walker(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 10); // depth 4, 10 files per dir -> roughly 150 files
    let config = WalkerConfig::new(true, false);

    c.bench_function("walker_150_files", |b| {
        b.iter(|| {
            let walker = Walker::new(temp_dir.path(), config.clone());
            let files: Vec<_> = walker.walk().collect();
            black_box(files);
        })
    });
}

// 2. Hashing Benchmarks
fn bench_hasher(c: &mut Criterion) {
    let mut group = c.benchmark_group("hasher");
    let hasher = Hasher::new();

    for size_kb in [1, 1024, 10240] {
        // 1KB, 1MB, 10MB
        let data = vec![b'a'; size_kb * 1024];
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bench_file.dat");
        fs::write(&file_path, &data).expect("Failed to write bench file");

        group.bench_with_input(format!("full_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| {
                let hash = hasher.full_hash(path).unwrap();
                black_box(hash);
            });
        });

        group.bench_with_input(format!("prefix_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| {
                let hash = hasher.prehash(path).unwrap();
                black_box(hash);
            });
        });
    }
    group.finish();
}

// 3. End-to-end Pipeline Benchmark
fn bench_finder(c: &mut Criterion) {
    let temp_dir = setup_test_dir(3, 20);

    c.bench_function("finder_end_to_end", |b| {
        b.iter(|| {
            let finder = DuplicateFinder::new(
                FinderConfig::default()
                    .with_io_threads(4)
                    .with_walker_config(WalkerConfig::new(true, false)),
            );
            let result = finder.find_duplicates(temp_dir.path()).unwrap();
            black_box(result);
        })
    });
}

criterion_group!(benches, bench_walker, bench_hasher, bench_finder);
criterion_main!(benches);
