//! Error types for `confession`
//!
//! The widget core never fails: degenerate input is clamped or dropped.
//! The errors here cover the ambient surface around it, namely
//! configuration loading, the session event loop, and the CLI script
//! reader.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `confession` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Session loop error (loop stopped, reply dropped)
    pub const SESSION_ERROR: i32 = 5;

    /// Usage error (bad script command, invalid arguments)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `confession` operations.
#[derive(Debug, Error)]
pub enum ConfessionError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session loop error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Input script error
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfessionError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Session(_) => ExitCode::SESSION_ERROR,
            Self::Script(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", format_issues(.errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual file size in bytes
        size: u64,
        /// Size limit in bytes
        limit: u64,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "decoys.authoritative_index")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but the configuration still loads
    Warning,
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors talking to a running session loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session loop has stopped and no longer accepts commands
    #[error("session closed")]
    Closed,

    /// The session loop dropped the reply channel before answering
    #[error("session dropped reply to {0}")]
    ReplyDropped(&'static str),

    /// The session task panicked or was aborted
    #[error("session task failed: {0}")]
    TaskFailed(String),
}

// ============================================================================
// Script Errors
// ============================================================================

/// Errors reading interactive commands or replay scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Command word not recognised
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Command recognised but its arguments are wrong
    #[error("invalid arguments for '{command}': {message}")]
    InvalidArguments {
        /// The command word
        command: String,
        /// What was wrong
        message: String,
    },

    /// A `wait` duration that humantime cannot parse
    #[error("invalid wait '{value}': {message}")]
    InvalidWait {
        /// The raw duration string
        value: String,
        /// Parser message
        message: String,
    },

    /// A replay step failed to parse
    #[error("step {step}: {source}")]
    Step {
        /// Zero-based step index
        step: usize,
        /// The underlying error
        #[source]
        source: Box<ScriptError>,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `confession` operations.
pub type Result<T> = std::result::Result<T, ConfessionError>;
