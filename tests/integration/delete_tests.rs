use dupfind::actions::{delete_duplicates, Confirmation, DeleteConfig, DeleteError};
use dupfind::duplicates::DuplicateFinder;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_delete_three_copies_keeps_one() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), "identical").unwrap();
    }

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let result = delete_duplicates(&groups, Confirmation::Confirmed, &DeleteConfig::default(), None);

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 0);
    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("b").exists());
    assert!(!dir.path().join("c").exists());

    let (after, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert!(after.is_empty());
}

#[test]
fn test_declined_confirmation_keeps_everything() {
    let dir = tempdir().unwrap();
    for name in ["a", "b"] {
        fs::write(dir.path().join(name), "identical").unwrap();
    }

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let result = delete_duplicates(&groups, Confirmation::Declined, &DeleteConfig::default(), None);

    assert!(result.declined);
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[cfg(unix)]
#[test]
fn test_permission_failure_is_reported_and_others_proceed() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked_dir = dir.path().join("locked");
    fs::create_dir(&locked_dir).unwrap();
    fs::write(dir.path().join("a"), "identical").unwrap();
    fs::write(dir.path().join("c"), "identical").unwrap();
    fs::write(locked_dir.join("b"), "identical").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files[0].path, dir.path().join("a"));

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();
    // Privileged users ignore directory permissions; nothing to assert then.
    let privileged = fs::write(locked_dir.join("probe"), "x").is_ok();
    if privileged {
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = delete_duplicates(&groups, Confirmation::Confirmed, &DeleteConfig::default(), None);
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failure_count(), 1);
    assert!(matches!(
        &result.failures[0],
        DeleteError::PermissionDenied(p) if p == &locked_dir.join("b")
    ));
    assert!(dir.path().join("a").exists());
    assert!(locked_dir.join("b").exists());
    assert!(!dir.path().join("c").exists());
}

#[test]
fn test_unremovable_copy_is_reported_and_others_proceed() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), "identical").unwrap();
    }

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups[0].len(), 3);

    // A directory now sits where a copy was; unlinking it fails for every user.
    let swapped = dir.path().join("b");
    fs::remove_file(&swapped).unwrap();
    fs::create_dir(&swapped).unwrap();

    let config = DeleteConfig::permanent().with_verify_size(false);
    let result = delete_duplicates(&groups, Confirmation::Confirmed, &config, None);

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].path(), Some(swapped.as_path()));
    assert!(swapped.is_dir());
    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("c").exists());
}
