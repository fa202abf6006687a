use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// CI systems use these to tell a clean audit apart from one that found
/// something, and both apart from an audit that never finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Audit completed and nothing reached the `--fail-on` threshold
    Success = 0,
    /// Findings at or above the configured threshold were detected
    FindingsDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (snapshot, config, I/O, or a failed pipeline stage)
    ApplicationError = 3,
    /// The audit was cancelled before it completed
    Cancelled = 130,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::FindingsDetected => write!(f, "Findings Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
            ExitCode::Cancelled => write!(f, "Cancelled (130)"),
        }
    }
}

/// Application-specific errors for the COM audit.
///
/// Pipeline variants name the stage they aborted so that a caller can report
/// an aborted run distinctly from a completed one.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{stage} stage could not enumerate {path}\nDetails: {details}")]
    EnumerationFailed {
        stage: String,
        path: String,
        details: String,
    },

    #[error("{stage} stage was cancelled")]
    Cancelled { stage: String },

    #[error("{stage} stage is missing required input '{dependency}'\n\n💡 Hint: the stage that produces it must run first")]
    DependencyMissing { stage: String, dependency: String },

    #[error("Registry snapshot not found: {path}\n\n💡 Hint: Export a snapshot first or pass the correct path with --snapshot")]
    SnapshotNotFound { path: PathBuf },

    #[error("Failed to parse registry snapshot: {path}\nDetails: {details}\n\n💡 Hint: Snapshots must be JSON (.json) or YAML (.yml/.yaml) key trees")]
    SnapshotParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    /// Validation error for configuration and builder input
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl AuditError {
    /// Name of the pipeline stage this error aborted, if any
    pub fn stage(&self) -> Option<&str> {
        match self {
            AuditError::EnumerationFailed { stage, .. }
            | AuditError::Cancelled { stage }
            | AuditError::DependencyMissing { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AuditError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::FindingsDetected.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
        assert_eq!(ExitCode::Cancelled.as_i32(), 130);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::FindingsDetected),
            "Findings Detected (1)"
        );
        assert_eq!(format!("{}", ExitCode::Cancelled), "Cancelled (130)");
    }

    #[test]
    fn test_enumeration_failed_display() {
        let error = AuditError::EnumerationFailed {
            stage: "Registry".to_string(),
            path: r"HKCR\CLSID".to_string(),
            details: "access denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Registry stage could not enumerate"));
        assert!(display.contains(r"HKCR\CLSID"));
        assert!(display.contains("access denied"));
        assert_eq!(error.stage(), Some("Registry"));
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_cancelled_is_distinct() {
        let error = AuditError::Cancelled {
            stage: "Security".to_string(),
        };
        assert!(error.is_cancelled());
        assert_eq!(error.stage(), Some("Security"));
        assert_eq!(format!("{}", error), "Security stage was cancelled");
    }

    #[test]
    fn test_dependency_missing_display() {
        let error = AuditError::DependencyMissing {
            stage: "Security".to_string(),
            dependency: "components".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("missing required input 'components'"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_snapshot_errors_have_no_stage() {
        let error = AuditError::SnapshotNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        assert!(error.stage().is_none());
        assert!(format!("{}", error).contains("/tmp/missing.json"));
    }
}
