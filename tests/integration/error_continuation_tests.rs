use dupfind::duplicates::DuplicateFinder;
use dupfind::scanner::{FileEntry, HashError, ScanError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_files_are_reported_once_each() {
    let dir = tempdir().unwrap();
    let files = vec![
        FileEntry::new(dir.path().join("nonexistent_1.txt"), 100),
        FileEntry::new(dir.path().join("nonexistent_2.txt"), 100),
    ];

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);
    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            other => panic!("Expected NotFound HashError, got: {other:?}"),
        }
    }
}

#[test]
fn test_file_removed_after_discovery() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), "dup").unwrap();
    }
    fs::write(dir.path().join("vanishing"), "dup").unwrap();

    // Collect the listing first, then remove one file before hashing.
    let files: Vec<FileEntry> = ["a", "b", "c", "vanishing"]
        .iter()
        .map(|n| FileEntry::new(dir.path().join(n), 3))
        .collect();
    fs::remove_file(dir.path().join("vanishing")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(
        summary.scan_errors[0].path(),
        dir.path().join("vanishing").as_path()
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_stop_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "dup").unwrap();
    fs::write(dir.path().join("b"), "dup").unwrap();
    let locked = dir.path().join("locked");
    fs::write(&locked, "dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway; nothing to assert then.
    let readable = fs::read(&locked).is_ok();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    if readable {
        assert_eq!(groups[0].len(), 3);
        return;
    }
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.scan_errors.len(), 1);
    assert!(matches!(
        &summary.scan_errors[0],
        ScanError::HashError(HashError::PermissionDenied(p)) if p == &locked
    ));
}
