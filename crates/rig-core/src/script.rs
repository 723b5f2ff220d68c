//! Control script orchestration.
//!
//! A control script owns an ordered action list. Start walks the list
//! top to bottom, halting at the first action that reports failure; stop
//! walks it bottom to top unconditionally. Before any action starts, the
//! script writes the self-describing `.param` dump next to the scenario.

use crate::action::ControlAction;
use crate::dump::ParamDump;
use rig_common::{Error, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lifecycle mode selected once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Start,
    Stop,
}

impl Mode {
    /// Parse the CLI mode word, case-insensitively.
    pub fn parse(word: &str) -> Result<Mode> {
        match word.to_ascii_lowercase().as_str() {
            "start" => Ok(Mode::Start),
            "stop" => Ok(Mode::Stop),
            _ => Err(Error::Config(
                "the first argument of a control script must be 'start' or 'stop'".to_string(),
            )),
        }
    }
}

/// Outcome of a start run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every active action started.
    Completed,
    /// An action reported failure; the rest of the sequence was skipped.
    Halted,
}

/// Ordered action sequence with start/stop semantics.
pub struct ControlScript {
    actions: Vec<Box<dyn ControlAction>>,
}

impl ControlScript {
    pub fn new(actions: Vec<Box<dyn ControlAction>>) -> Self {
        ControlScript { actions }
    }

    pub fn actions(&self) -> &[Box<dyn ControlAction>] {
        &self.actions
    }

    /// Execute the selected half of the lifecycle.
    pub fn run(&self, mode: Mode, param_path: &Path) -> Result<RunOutcome> {
        match mode {
            Mode::Start => self.start(param_path),
            Mode::Stop => {
                self.stop();
                Ok(RunOutcome::Completed)
            }
        }
    }

    /// Dump every action, then start active actions in order.
    ///
    /// A dump failure is fatal and no action runs. A start failure halts
    /// the remaining sequence; already-started actions are left as-is.
    pub fn start(&self, param_path: &Path) -> Result<RunOutcome> {
        self.write_param_dump(param_path)?;

        for action in &self.actions {
            if !action.active() {
                debug!(id = %action.id(), description = action.description(), "skipping inactive action");
                continue;
            }
            info!(id = %action.id(), description = action.description(), "starting action");
            if !action.start()? {
                warn!(
                    id = %action.id(),
                    description = action.description(),
                    "action failed to start, halting sequence"
                );
                return Ok(RunOutcome::Halted);
            }
        }
        Ok(RunOutcome::Completed)
    }

    /// Stop every action in reverse order, active or not. Stop failures
    /// never halt the iteration.
    pub fn stop(&self) {
        for action in self.actions.iter().rev() {
            info!(id = %action.id(), description = action.description(), "stopping action");
            action.stop();
        }
    }

    /// Write the schema/value dump.
    ///
    /// Every action contributes its values; from the second action onward
    /// the action's id joins a `|`-chain and its schema dump plus a
    /// `processes=<chain>` line follow the values.
    fn write_param_dump(&self, param_path: &Path) -> Result<()> {
        let mut dump = ParamDump::new();
        let mut chain = String::new();

        for (index, action) in self.actions.iter().enumerate() {
            action.describe_values(&mut dump);
            if index > 0 {
                if !chain.is_empty() {
                    chain.push('|');
                }
                chain.push_str(&action.id().to_string());
                action.describe_schema(action.kind(), &mut dump);
                dump.raw_line(format!("processes={chain}"));
            }
        }

        let mut file = File::create(param_path).map_err(|source| Error::Dump {
            path: param_path.to_path_buf(),
            source,
        })?;
        dump.write_to(&mut file).map_err(|source| Error::Dump {
            path: param_path.to_path_buf(),
            source,
        })
        // file handle released here, even after a partial write
    }
}
