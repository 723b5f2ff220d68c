//! Error types for rigctl.
//!
//! This module provides structured error handling with:
//! - Stable error categories for grouping
//! - A single `Error` enum shared by the library and the CLI
//!
//! Deliberate action failures (a start command exiting non-zero) are NOT
//! errors: they surface as `Ok(false)` from `ControlAction::start` and halt
//! the sequence without raising. The variants here cover the exceptional
//! conditions that abort a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rigctl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// CLI mode / scenario configuration errors.
    Config,
    /// Param dump file I/O errors.
    Dump,
    /// In-place file rewrite errors.
    Rewrite,
    /// Child process spawn errors.
    Spawn,
    /// Other file I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Dump => write!(f, "dump"),
            ErrorCategory::Rewrite => write!(f, "rewrite"),
            ErrorCategory::Spawn => write!(f, "spawn"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for rigctl.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid CLI mode or action configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Scenario file could not be read or parsed.
    #[error("invalid scenario file {path}: {message}")]
    Scenario { path: PathBuf, message: String },

    /// Param dump file could not be created or written.
    #[error("param dump failed for {path}: {source}")]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rewrite target could not be opened or written in place.
    #[error("cannot rewrite {path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A child process could not be spawned at all.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid regular expression in a rewrite action.
    #[error("invalid pattern: {0}")]
    Pattern(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::Scenario { .. } => ErrorCategory::Config,
            Error::Dump { .. } => ErrorCategory::Dump,
            Error::Rewrite { .. } | Error::Pattern(_) => ErrorCategory::Rewrite,
            Error::Spawn { .. } => ErrorCategory::Spawn,
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the run was aborted before any action could start.
    ///
    /// Config and dump errors happen during setup; everything else can
    /// surface mid-sequence.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Config | ErrorCategory::Dump
        )
    }
}

/// Structured error payload for machine-readable stderr output.
///
/// Emitted instead of the human rendering when the CLI runs with JSONL
/// diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the run was aborted before any action started.
    pub preflight: bool,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            category: err.category(),
            message: err.to_string(),
            preflight: err.is_preflight(),
        }
    }
}

impl StructuredError {
    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!(r#"{{"category":"{}","message":"serialization failed"}}"#, self.category))
    }
}
