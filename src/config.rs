//! Layered configuration.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory (e.g. `~/.config/dupfind/config.toml` on Linux)
//! 3. Environment variables prefixed with `DUPFIND_` (e.g. `DUPFIND_WORKERS=8`)
//! 4. Command-line flags, applied by the caller on the extracted [`Config`]
//!
//! ```toml
//! workers = 32
//! algorithm = "sha256"
//! skip_hidden = true
//! ignore_patterns = ["target/", "*.tmp"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{FinderConfig, GroupOrder, DEFAULT_WORKERS, MAX_QUEUE_CAPACITY, MAX_WORKERS};
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub workers: usize,
    /// Work queue capacity; unset means two slots per worker.
    pub queue_capacity: Option<usize>,
    /// Fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Skip zero-byte files.
    pub skip_empty: bool,
    /// Minimum file size in bytes.
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    pub max_size: Option<u64>,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    /// Apply the root directory's `.gitignore` as well.
    pub respect_gitignore: bool,
    /// Sort paths within groups and groups by reclaimable space.
    pub sorted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            algorithm: HashAlgorithm::default(),
            follow_symlinks: false,
            skip_hidden: false,
            skip_empty: false,
            min_size: None,
            max_size: None,
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
            sorted: true,
        }
    }
}

impl Config {
    /// The figment behind [`Config::load`], without the extraction.
    ///
    /// With `path == None` the platform default file is merged if present.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(default_path) = Self::default_path() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given file does not exist, if any layer holds
    /// a malformed value, or if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(path)
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Reject values the scan cannot run with.
    ///
    /// # Errors
    ///
    /// Fails when `workers` is outside `1..=MAX_WORKERS`, `queue_capacity`
    /// outside `1..=MAX_QUEUE_CAPACITY`, or `min_size > max_size`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            bail!("workers must be between 1 and {MAX_WORKERS}, got {}", self.workers);
        }
        if let Some(capacity) = self.queue_capacity {
            if !(1..=MAX_QUEUE_CAPACITY).contains(&capacity) {
                bail!("queue_capacity must be between 1 and {MAX_QUEUE_CAPACITY}, got {capacity}");
            }
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                bail!("min_size ({min}) is larger than max_size ({max})");
            }
        }
        Ok(())
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails on serialization or I/O errors.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Platform-specific default config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfind").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.min_size,
            self.max_size,
            self.ignore_patterns.clone(),
        )
        .with_skip_empty(self.skip_empty)
        .with_respect_gitignore(self.respect_gitignore)
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let mut config = FinderConfig::default()
            .with_workers(self.workers)
            .with_algorithm(self.algorithm)
            .with_walker_config(self.walker_config())
            .with_order(if self.sorted {
                GroupOrder::Sorted
            } else {
                GroupOrder::Unordered
            });
        if let Some(capacity) = self.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }
        config
    }
}
