//! JSON report.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-01-01T12:00:00Z",
//!   "algorithm": "blake3",
//!   "duplicates": [
//!     { "hash": "abc123...", "size": 1024, "files": ["/a.txt", "/b.txt"] }
//!   ],
//!   "errors": [
//!     { "path": "/locked", "message": "permission denied: /locked" }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "hashed_files": 99,
//!     "failed_files": 1,
//!     "workers": 100,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "DF003"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::HashAlgorithm;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Fingerprint as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Paths in group order; the first one is the copy deletion keeps
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a group, making paths absolute where possible.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            files: group
                .files
                .iter()
                .map(|f| normalize_path(f.path.as_path()))
                .collect(),
        }
    }
}

/// A path that could not be read.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    /// Offending path
    pub path: String,
    /// Error message
    pub message: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub hashed_files: usize,
    pub failed_files: usize,
    pub workers: usize,
    pub duplicate_groups: usize,
    pub duplicate_files: usize,
    pub reclaimable_space: u64,
    pub scan_duration_ms: u64,
    pub interrupted: bool,
    pub exit_code: i32,
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from a scan summary and the exit code of the run.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            hashed_files: summary.hashed_files,
            failed_files: summary.failed_files,
            workers: summary.workers,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Fingerprint algorithm used
    pub algorithm: HashAlgorithm,
    /// Duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Paths that could not be read or hashed
    pub errors: Vec<JsonError>,
    /// Scan statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document.
    ///
    /// ```
    /// use dupfind::duplicates::ScanSummary;
    /// use dupfind::error::ExitCode;
    /// use dupfind::output::json::JsonOutput;
    /// use dupfind::scanner::HashAlgorithm;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates, HashAlgorithm::Blake3);
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        summary: &ScanSummary,
        exit_code: ExitCode,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            algorithm,
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            errors: summary
                .scan_errors
                .iter()
                .map(|e| JsonError {
                    path: e.path().to_string_lossy().into_owned(),
                    message: e.to_string(),
                })
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

// Falls back to the path as given when it no longer exists.
fn normalize_path(path: &std::path::Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
