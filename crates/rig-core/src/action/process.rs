//! Detached native process action.
//!
//! Start and stop happen in two separate program invocations, so the
//! process handle cannot live in memory. Instead an external supervisor
//! start script launches the process and records its PID in a well-known
//! file derived from the action id; the stop script reads that file and
//! terminates the process. This module only composes the script
//! invocations; the scripts themselves are an external contract.

use crate::action::{describe_base_schema, describe_base_values, ActionCore, ControlAction};
use crate::dump::{display_opt, ParamDump};
use crate::platform::{install_root, process_script_dir, OsFamily};
use crate::runner::{CommandRunner, LocalRunner};
use rig_common::{ActionId, IdAllocator, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Prefix of the PID hand-off files in the system temp directory.
const PID_FILE_PREFIX: &str = "rig_action_";

/// OS scheduling priority handed to the supervisor start script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessPriority {
    Low,
    #[serde(rename = "belownormal")]
    BelowNormal,
    Normal,
    #[serde(rename = "abovenormal")]
    AboveNormal,
    High,
    Realtime,
}

impl fmt::Display for ProcessPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessPriority::Low => write!(f, "low"),
            ProcessPriority::BelowNormal => write!(f, "belownormal"),
            ProcessPriority::Normal => write!(f, "normal"),
            ProcessPriority::AboveNormal => write!(f, "abovenormal"),
            ProcessPriority::High => write!(f, "high"),
            ProcessPriority::Realtime => write!(f, "realtime"),
        }
    }
}

/// PID file path for a given action id.
///
/// Deterministic on purpose: the stop run recomputes the same path as the
/// start run without any shared in-memory state.
pub fn pid_file_path(id: ActionId) -> PathBuf {
    env::temp_dir().join(format!("{PID_FILE_PREFIX}{id}.pid"))
}

/// Start/stop a detached process through the supervisor scripts.
pub struct NativeProcessAction {
    core: ActionCore,
    executable: String,
    args: Vec<String>,
    root: PathBuf,
    working_dir: PathBuf,
    check_after: Option<u32>,
    priority: Option<ProcessPriority>,
    out_filename: Option<PathBuf>,
    family: OsFamily,
    runner: Arc<dyn CommandRunner>,
}

impl NativeProcessAction {
    pub fn new(
        ids: &IdAllocator,
        description: impl Into<String>,
        executable: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        let root = install_root();
        NativeProcessAction {
            core: ActionCore::new(ids, description, true),
            executable: executable.into(),
            args,
            working_dir: root.clone(),
            root,
            check_after: None,
            priority: None,
            out_filename: None,
            family: OsFamily::current(),
            runner: Arc::new(LocalRunner),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Liveness check delay passed to the start script.
    pub fn with_check_after(mut self, seconds: u32) -> Self {
        self.check_after = Some(seconds);
        self
    }

    pub fn with_priority(mut self, priority: ProcessPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Capture stdout/stderr of the detached process into a file.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_filename = Some(path.into());
        self
    }

    /// Override the install root (and the script location with it).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_family(mut self, family: OsFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn pid_file(&self) -> PathBuf {
        pid_file_path(self.core.id)
    }

    fn script_path(&self, name: &str) -> String {
        let script = format!("{name}{}", self.family.script_extension());
        process_script_dir(&self.root, self.family)
            .join(script)
            .display()
            .to_string()
    }

    /// Full argv for the supervisor start script.
    pub fn start_argv(&self) -> Vec<String> {
        let mut argv = vec![self.script_path("start")];

        argv.push("-i".to_string());
        argv.push(self.pid_file().display().to_string());

        if let Some(priority) = self.priority {
            argv.push("-p".to_string());
            argv.push(priority.to_string());
        }

        if let Some(seconds) = self.check_after {
            argv.push("-n".to_string());
            argv.push(seconds.to_string());
        }

        if let Some(out) = &self.out_filename {
            argv.push("-o".to_string());
            argv.push(out.display().to_string());
        }

        argv.push("-c".to_string());
        argv.push(self.working_dir.display().to_string());

        argv.push(self.executable.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Full argv for the supervisor stop script: the PID file is the only
    /// argument.
    pub fn stop_argv(&self) -> Vec<String> {
        vec![
            self.script_path("stop"),
            self.pid_file().display().to_string(),
        ]
    }
}

impl ControlAction for NativeProcessAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "NativeProcess"
    }

    fn start(&self) -> Result<bool> {
        let argv = self.start_argv();
        println!("Launching \"{}\"", argv.join(" "));
        let code = self.runner.run(&argv)?;
        Ok(code == 0)
    }

    fn stop(&self) {
        let argv = self.stop_argv();
        println!("Stopping \"{}\"", self.executable);
        if let Err(err) = self.runner.run(&argv) {
            warn!(%err, executable = %self.executable, "stop script could not be executed");
        }
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        self.variant_schema(prefix, dump);
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        self.variant_values(dump);
    }
}

impl NativeProcessAction {
    /// Process-specific schema entries, shared with the Java variant.
    pub(crate) fn variant_schema(&self, prefix: &str, dump: &mut ParamDump) {
        dump.type_item(prefix, "executable", "string");
        dump.type_item(prefix, "args", "stringList");
        dump.type_item(prefix, "workingDir", "string");
        dump.type_item(prefix, "checkAfter", "integer");
        dump.type_item(prefix, "priority", "string");
        dump.type_item(prefix, "outFilename", "string");
    }

    /// Process-specific value entries, shared with the Java variant.
    pub(crate) fn variant_values(&self, dump: &mut ParamDump) {
        let id = self.core.id;
        dump.value_item(id, "executable", &self.executable);
        dump.value_item(id, "args", self.args.join(" "));
        dump.value_item(id, "workingDir", self.working_dir.display());
        dump.value_item(id, "checkAfter", display_opt(self.check_after.as_ref()));
        dump.value_item(id, "priority", display_opt(self.priority.as_ref()));
        let out = self.out_filename.as_ref().map(|p| p.display().to_string());
        dump.value_item(id, "outFilename", display_opt(out.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;

    fn base_action(ids: &IdAllocator) -> NativeProcessAction {
        NativeProcessAction::new(ids, "server", "myserver", vec!["--port".into(), "8080".into()])
            .with_root("/opt/rig")
            .with_working_dir("/opt/rig")
            .with_family(OsFamily::Posix)
    }

    #[test]
    fn start_argv_places_flags_before_executable() {
        let ids = IdAllocator::new();
        let action = base_action(&ids)
            .with_priority(ProcessPriority::High)
            .with_check_after(5)
            .with_output_file("/tmp/server.out");

        let argv = action.start_argv();
        assert_eq!(argv[0], "/opt/rig/tools/process/posix/start.sh");
        assert_eq!(argv[1], "-i");
        assert_eq!(argv[2], action.pid_file().display().to_string());
        assert_eq!(
            &argv[3..11],
            &[
                "-p",
                "high",
                "-n",
                "5",
                "-o",
                "/tmp/server.out",
                "-c",
                "/opt/rig"
            ]
        );
        assert_eq!(&argv[11..], &["myserver", "--port", "8080"]);
    }

    #[test]
    fn optional_flags_are_omitted_when_unset() {
        let ids = IdAllocator::new();
        let argv = base_action(&ids).start_argv();
        assert!(!argv.contains(&"-p".to_string()));
        assert!(!argv.contains(&"-n".to_string()));
        assert!(!argv.contains(&"-o".to_string()));
        assert!(argv.contains(&"-c".to_string()));
    }

    #[test]
    fn stop_argv_is_script_plus_pid_file() {
        let ids = IdAllocator::new();
        let action = base_action(&ids);
        assert_eq!(
            action.stop_argv(),
            vec![
                "/opt/rig/tools/process/posix/stop.sh".to_string(),
                action.pid_file().display().to_string(),
            ]
        );
    }

    #[test]
    fn windows_family_selects_cmd_scripts() {
        let ids = IdAllocator::new();
        let action = base_action(&ids).with_family(OsFamily::Windows);
        assert!(action.start_argv()[0].ends_with("start.cmd"));
        assert!(action.start_argv()[0].contains("win32"));
    }

    #[test]
    fn same_id_across_runs_computes_same_pid_file() {
        // Two allocators simulate the separate start and stop invocations.
        let start_run = IdAllocator::new();
        let stop_run = IdAllocator::new();
        let started = base_action(&start_run);
        let stopped = base_action(&stop_run);
        assert_eq!(started.pid_file(), stopped.pid_file());
    }

    #[test]
    fn start_reports_script_exit_status() {
        let ids = IdAllocator::new();
        let ok_runner = RecordingRunner::with_exit_codes(&[0]);
        let action = base_action(&ids).with_runner(ok_runner);
        assert!(action.start().unwrap());

        let fail_runner = RecordingRunner::with_exit_codes(&[1]);
        let action = base_action(&ids).with_runner(fail_runner);
        assert!(!action.start().unwrap());
    }

    #[test]
    fn stop_ignores_script_exit_status() {
        let ids = IdAllocator::new();
        let runner = RecordingRunner::with_exit_codes(&[5]);
        let action = base_action(&ids).with_runner(runner.clone());
        action.stop();
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn priority_display_matches_script_contract() {
        assert_eq!(ProcessPriority::BelowNormal.to_string(), "belownormal");
        assert_eq!(ProcessPriority::Realtime.to_string(), "realtime");
    }
}
