use clap::Parser;
use dupfind::cli::Cli;
use dupfind::error::ExitCode;
use dupfind::run_app;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupfind", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_exit_code_when_duplicates_found() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();

    let code = run(&["scan", dir.path().to_str().unwrap(), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_exit_code_when_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "one").unwrap();

    let code = run(&["scan", dir.path().to_str().unwrap(), "--workers", "2"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run(&["scan", missing.to_str().unwrap()]).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_delete_with_yes_removes_copies() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), "same").unwrap();
    }

    let code = run(&[
        "scan",
        dir.path().to_str().unwrap(),
        "--output",
        "json",
        "--delete",
        "--yes",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("b").exists());
    assert!(!dir.path().join("c").exists());
}

#[test]
fn test_init_config_writes_and_refuses_overwrite() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("dupfind.toml");

    let code = run(&["init-config", dest.to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(fs::read_to_string(&dest).unwrap().contains("workers"));

    assert!(run(&["init-config", dest.to_str().unwrap()]).is_err());
    assert!(run(&["init-config", dest.to_str().unwrap(), "--force"]).is_ok());
}
