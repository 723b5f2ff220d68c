//! Command specs and blocking command execution.
//!
//! Actions never spawn processes directly; they go through the
//! [`CommandRunner`] seam so sequencing tests can record invocations
//! instead of touching the host. The production implementation blocks
//! until the child exits, which is the contract for the whole framework:
//! one action at a time, no overlap.

use rig_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A start or stop command: either a single line split on spaces, or an
/// explicit argv. Complex commands (quoting, embedded spaces) should use
/// the argv form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Argv(Vec<String>),
}

impl CommandSpec {
    /// Ordered token list. A line form is split on single spaces.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            CommandSpec::Line(line) => line.split(' ').map(str::to_string).collect(),
            CommandSpec::Argv(argv) => argv.clone(),
        }
    }

    /// Space-joined display form.
    pub fn display(&self) -> String {
        match self {
            CommandSpec::Line(line) => line.clone(),
            CommandSpec::Argv(argv) => argv.join(" "),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CommandSpec {
    fn from(line: &str) -> Self {
        CommandSpec::Line(line.to_string())
    }
}

impl From<Vec<String>> for CommandSpec {
    fn from(argv: Vec<String>) -> Self {
        CommandSpec::Argv(argv)
    }
}

impl From<&[&str]> for CommandSpec {
    fn from(argv: &[&str]) -> Self {
        CommandSpec::Argv(argv.iter().map(|s| s.to_string()).collect())
    }
}

/// Seam for executing external commands.
///
/// Returns the child's exit code. `Err` is reserved for failing to spawn
/// at all; a non-zero exit is an ordinary `Ok`.
pub trait CommandRunner: fmt::Debug + Send + Sync {
    fn run(&self, argv: &[String]) -> Result<i32>;
}

/// Production runner: spawns the command and waits for it to exit.
#[derive(Debug, Default)]
pub struct LocalRunner;

impl CommandRunner for LocalRunner {
    fn run(&self, argv: &[String]) -> Result<i32> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Config("empty command".to_string()))?;

        debug!(command = %argv.join(" "), "spawning child process");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| Error::Spawn {
                command: program.clone(),
                source,
            })?;

        // Killed-by-signal children have no code; treat as generic failure.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Recording runner for tests: logs every argv and returns a scripted
/// sequence of exit codes (then zeros).
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    exit_codes: Mutex<Vec<i32>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue exit codes to hand out, first call first.
    pub fn with_exit_codes(codes: &[i32]) -> Arc<Self> {
        let runner = Self::default();
        runner.exit_codes.lock().unwrap().extend_from_slice(codes);
        Arc::new(runner)
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> Result<i32> {
        self.calls.lock().unwrap().push(argv.to_vec());
        let mut codes = self.exit_codes.lock().unwrap();
        if codes.is_empty() {
            Ok(0)
        } else {
            Ok(codes.remove(0))
        }
    }
}
