//! rigctl core: ordered-action lifecycle runner.
//!
//! A control script owns an ordered list of heterogeneous actions (local
//! commands, detached native processes, remote command execution, service
//! control, timed waits) and drives them through a start or stop run:
//! top to bottom with halt-on-first-failure on start, bottom to top
//! unconditionally on stop. Detached processes are tracked across program
//! invocations through PID files written by external supervisor scripts.

pub mod action;
pub mod dump;
pub mod exit_codes;
pub mod logging;
pub mod platform;
pub mod runner;
pub mod scenario;
pub mod script;

pub use action::{ActionCore, ControlAction};
pub use dump::ParamDump;
pub use exit_codes::ExitCode;
pub use platform::OsFamily;
pub use runner::{CommandRunner, CommandSpec, LocalRunner};
pub use scenario::{load_scenario, Scenario};
pub use script::{ControlScript, Mode, RunOutcome};
