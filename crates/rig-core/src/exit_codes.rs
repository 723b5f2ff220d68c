//! Exit codes for the rig-core CLI.
//!
//! Exit codes communicate run outcome without requiring output parsing.
//!
//! Ranges:
//! - 0-9: operational outcomes
//! - 10-19: user/environment errors
//! - 20-29: runtime errors

use rig_common::{Error, ErrorCategory};

/// Exit codes for rig-core runs.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The full sequence ran.
    Clean = 0,

    /// An action failed to start; the rest of the sequence was skipped.
    StartHalted = 1,

    /// Invalid CLI arguments (bad mode word).
    ArgsError = 10,

    /// Invalid scenario file.
    ConfigError = 11,

    /// Param dump or other I/O failure.
    IoError = 21,

    /// In-place rewrite failure.
    RewriteError = 22,

    /// A child process could not be spawned.
    SpawnError = 23,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Map a runtime error to its exit code.
    pub fn from_error(err: &Error) -> ExitCode {
        match err.category() {
            ErrorCategory::Config => match err {
                Error::Scenario { .. } => ExitCode::ConfigError,
                _ => ExitCode::ArgsError,
            },
            ErrorCategory::Dump | ErrorCategory::Io => ExitCode::IoError,
            ErrorCategory::Rewrite => ExitCode::RewriteError,
            ErrorCategory::Spawn => ExitCode::SpawnError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn outcome_codes_are_stable() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::StartHalted.as_i32(), 1);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
    }

    #[test]
    fn errors_map_to_their_range() {
        assert_eq!(
            ExitCode::from_error(&Error::Config("bad mode".into())),
            ExitCode::ArgsError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Scenario {
                path: PathBuf::from("s.toml"),
                message: "bad".into(),
            }),
            ExitCode::ConfigError
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            ExitCode::from_error(&Error::Rewrite {
                path: PathBuf::from("conf.ini"),
                source: io,
            }),
            ExitCode::RewriteError
        );
    }

    #[test]
    fn only_clean_is_success() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::StartHalted.is_success());
    }
}
