//! Report formatters for scan results.
//!
//! - [`TextOutput`]: human-readable listing, optionally colored
//! - [`JsonOutput`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::output::TextOutput;
//! use std::path::Path;
//!
//! let (groups, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! TextOutput::new(&groups, &summary)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
