//! Process exit codes and machine-readable errors.

use serde::Serialize;

use crate::duplicates::{FinderError, ScanSummary};

/// Exit codes for the dupfind binary.
///
/// - 0: duplicates found
/// - 1: error
/// - 2: no duplicates found
/// - 3: completed, but some paths could not be read or removed
/// - 130: interrupted (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed and found no duplicates.
    NoDuplicates = 2,
    /// Scan completed with non-fatal per-path errors.
    PartialSuccess = 3,
    /// Scan was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::NoDuplicates => "DF002",
            Self::PartialSuccess => "DF003",
            Self::Interrupted => "DF130",
        }
    }

    /// Exit code for a finished scan.
    #[must_use]
    pub fn from_summary(summary: &ScanSummary) -> Self {
        if summary.has_errors() {
            Self::PartialSuccess
        } else if summary.duplicate_groups == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }

    /// Exit code for an error returned from `run_app`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Error printed to stderr as JSON with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Machine-readable code (e.g. "DF001")
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Top-level message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    /// Whether the scan was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build from an anyhow error and the exit code it maps to.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
