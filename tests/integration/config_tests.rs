use dupfind::config::Config;
use dupfind::duplicates::GroupOrder;
use dupfind::scanner::HashAlgorithm;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

// Tests touching DUPFIND_* variables must not overlap.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_defaults_extract() {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.workers, 100);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert!(config.queue_capacity.is_none());
}

#[test]
fn test_config_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
workers = 8
queue_capacity = 64
algorithm = "sha256"
skip_hidden = true
min_size = 10
ignore_patterns = ["target/", "*.tmp"]
sorted = false
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.workers, 8);
    assert_eq!(config.queue_capacity, Some(64));
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert!(config.skip_hidden);
    assert_eq!(config.min_size, Some(10));
    assert_eq!(config.ignore_patterns, vec!["target/", "*.tmp"]);

    let finder = config.finder_config();
    assert_eq!(finder.order, GroupOrder::Unordered);
    assert_eq!(finder.effective_queue_capacity(), 64);
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 8\nskip_empty = false\n").unwrap();

    std::env::set_var("DUPFIND_WORKERS", "16");
    std::env::set_var("DUPFIND_SKIP_EMPTY", "true");
    let result = Config::load(Some(&path));
    std::env::remove_var("DUPFIND_WORKERS");
    std::env::remove_var("DUPFIND_SKIP_EMPTY");

    let config = result.unwrap();
    assert_eq!(config.workers, 16);
    assert!(config.skip_empty);
}

#[test]
fn test_zero_workers_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 0\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("workers"));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = [not toml").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_unknown_algorithm_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"md5\"\n").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_save_round_trips_through_load() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        workers: 4,
        algorithm: HashAlgorithm::Sha256,
        max_size: Some(1_000_000),
        ignore_patterns: vec!["*.bak".to_string()],
        ..Config::default()
    };
    config.save(&path).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("workers = 4"));
    assert!(saved.contains("algorithm = \"sha256\""));

    assert_eq!(Config::load(Some(&path)).unwrap(), config);
}
