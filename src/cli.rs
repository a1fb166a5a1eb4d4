//! Command-line interface definitions.
//!
//! ```bash
//! # Report duplicates under ~/Downloads
//! dupfind scan ~/Downloads
//!
//! # JSON report, 16 workers, SHA-256 fingerprints
//! dupfind scan ~/Downloads --output json --workers 16 --algorithm sha256
//!
//! # Remove every copy but the first of each group, without prompting
//! dupfind scan ~/Downloads --delete --yes
//!
//! # Write the default configuration file
//! dupfind init-config
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::actions::Confirmation;
use crate::config::Config;
use crate::scanner::HashAlgorithm;

/// Concurrent duplicate file finder.
///
/// Walks a directory tree, fingerprints every regular file on a fixed pool of
/// worker threads and reports files with identical content.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Write the current configuration to a TOML file
    InitConfig(InitConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Number of hashing workers [default: 100]
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: Option<u64>,

    /// Work queue capacity [default: 2 per worker]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub queue_capacity: Option<u64>,

    /// Fingerprint algorithm [default: blake3]
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Gitignore-style pattern to skip (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Also skip what the root directory's .gitignore excludes
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Follow symbolic links during the walk
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Skip zero-byte files
    #[arg(long)]
    pub skip_empty: bool,

    /// Report groups in discovery order instead of sorting them
    #[arg(long)]
    pub unsorted: bool,

    /// Delete every copy but the first of each group
    #[arg(long)]
    pub delete: bool,

    /// Move deleted copies to the system trash instead of removing them
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Do not ask for confirmation before deleting
    #[arg(short = 'y', long, requires = "delete")]
    pub yes: bool,
}

impl ScanArgs {
    /// Overlay the flags given on the command line onto `config`.
    ///
    /// Flags that were not given leave the configured value alone.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.workers = usize::try_from(workers).unwrap_or(usize::MAX);
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = Some(usize::try_from(capacity).unwrap_or(usize::MAX));
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if self.min_size.is_some() {
            config.min_size = self.min_size;
        }
        if self.max_size.is_some() {
            config.max_size = self.max_size;
        }
        config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        config.follow_symlinks |= self.follow_symlinks;
        config.respect_gitignore |= self.respect_gitignore;
        config.skip_hidden |= self.skip_hidden;
        config.skip_empty |= self.skip_empty;
        if self.unsorted {
            config.sorted = false;
        }
    }
}

/// Arguments for the init-config subcommand.
#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination [default: platform config directory]
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Decimal (KB, MB, GB, TB) and binary (KiB, MiB, GiB, TiB) suffixes are
/// accepted, case-insensitive. A bare number is bytes.
///
/// ```
/// use dupfind::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// ```
///
/// # Errors
///
/// Returns an error for empty input, negative or malformed numbers and
/// unknown suffixes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<bytesize::ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}

/// Ask on `output` and read a yes/no answer from `input`.
///
/// Only `y` or `yes` (any case) confirm; anything else, including EOF,
/// declines.
///
/// # Errors
///
/// Returns any I/O error from reading or writing.
pub fn prompt_confirmation<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Confirmation> {
    write!(output, "{message} [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(Confirmation::from(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    )))
}
