//! Logging setup for dupfind.
//!
//! Uses the `log` facade with an `env_logger` backend. The level comes from
//! (highest priority first):
//!
//! 1. `RUST_LOG`, when set
//! 2. `--quiet` (errors only) or `--verbose` (`-v` debug, `-vv` trace)
//! 3. Info
//!
//! Debug builds prefix each line with a timestamp and, from `-v` on, the
//! emitting thread. Hashing happens on `dupfind-hash-N` threads, so the thread
//! name tells which worker logged a line. Release builds print level and
//! message only.
//!
//! ```rust,no_run
//! use dupfind::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize logging from the CLI verbosity flags.
///
/// Only the first call in a process installs a logger; later calls are
/// ignored, which keeps repeated `run_app` calls in tests harmless.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    let source = match env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
            format!("RUST_LOG={filters}")
        }
        Err(_) => {
            let level = determine_level(verbose, quiet);
            builder.filter_level(level);
            format!("{level}")
        }
    };
    configure_format(&mut builder, verbose);

    if builder.try_init().is_ok() {
        log::debug!("Logging initialized ({source})");
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let style = buf.default_level_style(record.level());
            let timestamp = buf.timestamp_millis();
            write!(buf, "{timestamp} {style}{:<5}{style:#} ", record.level())?;
            if verbose >= 1 {
                let thread = std::thread::current();
                write!(
                    buf,
                    "[{}] [{}] ",
                    thread.name().unwrap_or("-"),
                    record.target()
                )?;
            }
            writeln!(buf, "{}", record.args())
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        });
    }
}
