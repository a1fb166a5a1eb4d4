use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError, GroupOrder};
use dupfind::scanner::{HashAlgorithm, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert!(summary.scan_errors.is_empty());
}

#[test]
fn test_scan_hello_hello_world() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("A"), "hello").unwrap();
    fs::write(dir.path().join("B"), "hello").unwrap();
    fs::write(dir.path().join("C"), "world").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].paths(),
        vec![dir.path().join("A"), dir.path().join("B")]
    );
    assert!(!groups[0].paths().contains(&dir.path().join("C")));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_sha256_hash_matches_known_digest() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("A"), "hello").unwrap();
    fs::write(dir.path().join("B"), "hello").unwrap();

    let finder =
        DuplicateFinder::new(FinderConfig::default().with_algorithm(HashAlgorithm::Sha256));
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(
        groups[0].hash_hex(),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    for (name, content) in [("a.txt", "content a"), ("b.txt", "content b"), ("c.txt", "content c")] {
        fs::write(dir.path().join(name), content).unwrap();
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_multiple_groups_sorted_by_reclaimable_space() {
    let dir = tempdir().unwrap();
    let big = vec![b'x'; 4096];
    fs::write(dir.path().join("small1"), "tiny").unwrap();
    fs::write(dir.path().join("small2"), "tiny").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("big1"), &big).unwrap();
    fs::write(dir.path().join("nested").join("big2"), &big).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].size, 4096);
    assert_eq!(groups[1].size, 4);
    assert_eq!(summary.reclaimable_space, 4096 + 4);
}

#[test]
fn test_scan_unordered_keeps_membership() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("z"), "same").unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_order(GroupOrder::Unordered));
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    let mut paths = groups[0].paths();
    paths.sort();
    assert_eq!(paths, vec![dir.path().join("a"), dir.path().join("z")]);
}

#[test]
fn test_scan_respects_walker_filters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep1.dat"), "payload").unwrap();
    fs::write(dir.path().join("keep2.dat"), "payload").unwrap();
    fs::write(dir.path().join("skip.tmp"), "payload").unwrap();
    fs::write(dir.path().join("empty1"), "").unwrap();
    fs::write(dir.path().join("empty2"), "").unwrap();

    let walker_config = WalkerConfig {
        ignore_patterns: vec!["*.tmp".to_string()],
        skip_empty: true,
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_missing_root_fails_before_work() {
    let dir = tempdir().unwrap();
    let missing: PathBuf = dir.path().join("missing");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .unwrap_err();

    assert!(matches!(err, FinderError::PathNotFound(_)));
    assert!(err.to_string().contains("missing"));
}
