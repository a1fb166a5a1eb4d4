use dupfind::duplicates::{
    AggregationStore, DuplicateFinder, FinderConfig, GroupOrder, PoolConfig, WorkerPool,
};
use dupfind::scanner::{Hasher, Walker, WalkerConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn build_tree() -> TempDir {
    let dir = tempdir().unwrap();
    for d in 0..6 {
        let sub = dir.path().join(format!("d{d}")).join(format!("inner{}", d % 2));
        fs::create_dir_all(&sub).unwrap();
        for f in 0..25 {
            let content = format!("content-{}", (d * 25 + f) % 17);
            fs::write(sub.join(format!("f{f}.txt")), content).unwrap();
        }
    }
    fs::write(dir.path().join("empty"), "").unwrap();
    dir
}

// Recursive listing with std only, independent of the walker.
fn list_files(root: &Path) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let file_type = entry.file_type().unwrap();
            if file_type.is_dir() {
                stack.push(entry.path());
            } else if file_type.is_file() {
                files.insert(entry.path());
            }
        }
    }
    files
}

#[test]
fn test_store_holds_every_file_exactly_once() {
    let dir = build_tree();
    let expected = list_files(dir.path());

    let (tx, rx) = crossbeam_channel::bounded(8);
    let pool = WorkerPool::spawn(
        PoolConfig::default().with_workers(32),
        rx,
        Arc::new(Hasher::new()),
        AggregationStore::new(),
    )
    .unwrap();
    let stats = Walker::new(dir.path(), WalkerConfig::default()).feed(tx);
    let report = pool.join().unwrap();

    let recorded: Vec<PathBuf> = report
        .store
        .into_inner()
        .into_values()
        .flatten()
        .map(|e| e.path)
        .collect();
    let unique: BTreeSet<PathBuf> = recorded.iter().cloned().collect();

    assert_eq!(stats.files, expected.len());
    assert_eq!(recorded.len(), expected.len(), "no file recorded twice");
    assert_eq!(unique, expected);
    assert!(report.errors.is_empty());
}

#[test]
fn test_one_and_hundred_workers_produce_same_groups() {
    let dir = build_tree();

    let groups_with = |workers: usize| -> BTreeSet<BTreeSet<PathBuf>> {
        let finder = DuplicateFinder::new(
            FinderConfig::default()
                .with_workers(workers)
                .with_order(GroupOrder::Unordered),
        );
        let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
        groups
            .into_iter()
            .map(|g| g.paths().into_iter().collect())
            .collect()
    };

    let one = groups_with(1);
    let hundred = groups_with(100);

    assert_eq!(one.len(), 17);
    assert_eq!(one, hundred);
}

#[test]
fn test_queue_of_one_slot_still_completes() {
    let dir = build_tree();
    let expected = list_files(dir.path()).len();

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_workers(3)
            .with_queue_capacity(1),
    );
    let (_, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, expected);
    assert_eq!(summary.hashed_files, expected);
}

#[test]
fn test_identical_content_shares_bucket() {
    let dir = tempdir().unwrap();
    let cases: [(&str, &[u8]); 5] = [
        ("same1", b"abc"),
        ("same2", b"abc"),
        ("case", b"ABC"),
        ("longer", b"abcd"),
        ("binary", &[0, 159, 146, 150]),
    ];
    for (name, content) in cases {
        fs::write(dir.path().join(name), content).unwrap();
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].paths(),
        vec![dir.path().join("same1"), dir.path().join("same2")]
    );
    assert_eq!(summary.hashed_files, 5);
}

#[test]
fn test_root_gitignore_does_not_hide_files_by_default() {
    let dir = build_tree();
    fs::write(dir.path().join(".gitignore"), "*.log\nd0/\n").unwrap();
    fs::write(dir.path().join("a.log"), "hello").unwrap();
    fs::write(dir.path().join("b.log"), "hello").unwrap();
    let expected = list_files(dir.path());

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(8));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    let grouped: BTreeSet<PathBuf> = groups.iter().flat_map(|g| g.paths()).collect();
    assert_eq!(summary.total_files, expected.len());
    assert!(summary.scan_errors.is_empty());
    assert!(grouped.contains(&dir.path().join("a.log")));
    assert!(grouped.contains(&dir.path().join("b.log")));
    assert!(grouped.iter().any(|p| p.starts_with(dir.path().join("d0"))));
}
