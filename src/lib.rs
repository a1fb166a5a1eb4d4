//! dupfind - concurrent duplicate file finder.
//!
//! A single walker feeds a bounded queue; a fixed pool of hashing workers
//! drains it into a mutex-guarded fingerprint map; once every worker has
//! joined, fingerprints shared by two or more files are reported as
//! duplicate groups. Copies can optionally be removed afterwards.
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(8));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &groups {
//!     println!("{}: {:?}", group.hash_hex(), group.paths());
//! }
//! println!("{} reclaimable", summary.reclaimable_display());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::actions::{delete_duplicates, deletion_candidates, Confirmation, DeleteConfig};
use crate::cli::{Cli, Commands, InitConfigArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the parsed command line.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable root path, an
/// interrupted scan, or a failure to write the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let color = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Commands::Scan(ref args) => run_scan(args, cli.config.as_deref(), cli.quiet, color),
        Commands::InitConfig(ref args) => init_config(args, cli.config.as_deref()),
    }
}

fn run_scan(
    args: &ScanArgs,
    config_path: Option<&Path>,
    quiet: bool,
    color: bool,
) -> Result<ExitCode> {
    let mut config = Config::load(config_path)?;
    args.apply_to(&mut config);
    config.validate()?;

    let shutdown = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let mut finder_config = config.finder_config().with_shutdown_flag(shutdown.shared());
    if !quiet && args.output == OutputFormat::Text {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let started = Instant::now();
    log::info!(
        "Scan of {} started at {}",
        args.path.display(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;

    log::info!(
        "Scan of {} finished in {:.2}s",
        args.path.display(),
        started.elapsed().as_secs_f64()
    );

    let mut exit_code = ExitCode::from_summary(&summary);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary)
            .with_color(color)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code, config.algorithm)
            .write_to(&mut out, true)
            .context("Failed to write report")?,
    }
    out.flush().context("Failed to write report")?;
    drop(out);

    if args.delete && !groups.is_empty() {
        let candidates = deletion_candidates(&groups);
        let bytes: u64 = candidates.iter().map(|f| f.size).sum();

        let confirmation = if args.yes {
            Confirmation::Confirmed
        } else if io::stdin().is_terminal() {
            let message = format!(
                "Delete {} file(s), {}{}?",
                candidates.len(),
                bytesize::ByteSize(bytes),
                if args.trash { " (to trash)" } else { " permanently" }
            );
            cli::prompt_confirmation(&mut io::stdin().lock(), &mut io::stderr(), &message)
                .context("Failed to read confirmation")?
        } else {
            log::warn!("stdin is not a terminal; pass --yes to delete without a prompt");
            Confirmation::Declined
        };

        let delete_config = if args.trash {
            DeleteConfig::trash()
        } else {
            DeleteConfig::permanent()
        };
        let result = delete_duplicates(&groups, confirmation, &delete_config, None);

        if !quiet {
            eprintln!("{}", result.summary());
        }
        if !result.all_succeeded() {
            exit_code = ExitCode::PartialSuccess;
        }
    }

    Ok(exit_code)
}

fn init_config(args: &InitConfigArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let Some(dest) = args.path.clone().or_else(Config::default_path) else {
        bail!("Could not determine a config directory; pass a destination path");
    };
    if dest.exists() && !args.force {
        bail!("{} already exists; use --force to overwrite", dest.display());
    }

    let config = Config::load(config_path)?;
    config.save(&dest)?;

    println!("Wrote configuration to {}", dest.display());
    Ok(ExitCode::Success)
}
