//! Command actions: local, remote-exec, remote-shell, service control.
//!
//! All four run their configured command synchronously through the
//! [`CommandRunner`] seam and block until the child exits. The remote
//! variants only differ in how they wrap the argv before delegating;
//! exit-status semantics are unchanged. Service control builds its
//! family-specific start/stop argv once at construction.

use crate::action::{describe_base_schema, describe_base_values, ActionCore, ControlAction};
use crate::dump::{display_opt, ParamDump};
use crate::platform::OsFamily;
use crate::runner::{CommandRunner, CommandSpec, LocalRunner};
use rig_common::{IdAllocator, Result};
use std::sync::Arc;
use tracing::warn;

/// Print the command, execute it, report whether it exited zero.
pub(crate) fn run_command(runner: &dyn CommandRunner, argv: &[String]) -> Result<bool> {
    println!("Executing \"{}\"", argv.join(" "));
    let code = runner.run(argv)?;
    Ok(code == 0)
}

/// Best-effort stop-side execution: spawn failures are logged, not raised.
pub(crate) fn run_stop_command(runner: &dyn CommandRunner, argv: &[String]) {
    match run_command(runner, argv) {
        Ok(_) => {}
        Err(err) => warn!(%err, "stop command could not be executed"),
    }
}

/// Run a specific command on start and/or stop.
///
/// An action with neither command is legal and a no-op. An unset start
/// command counts as success so stop-only actions never halt the sequence.
pub struct CommandAction {
    core: ActionCore,
    start_command: Option<CommandSpec>,
    stop_command: Option<CommandSpec>,
    runner: Arc<dyn CommandRunner>,
}

impl CommandAction {
    pub fn new(
        ids: &IdAllocator,
        description: impl Into<String>,
        start_command: Option<CommandSpec>,
        stop_command: Option<CommandSpec>,
    ) -> Self {
        CommandAction {
            core: ActionCore::new(ids, description, true),
            start_command,
            stop_command,
            runner: Arc::new(LocalRunner),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

impl ControlAction for CommandAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Command"
    }

    fn start(&self) -> Result<bool> {
        match &self.start_command {
            Some(command) => run_command(self.runner.as_ref(), &command.tokens()),
            None => Ok(true),
        }
    }

    fn stop(&self) {
        if let Some(command) = &self.stop_command {
            run_stop_command(self.runner.as_ref(), &command.tokens());
        }
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "startCommand", "string|stringList");
        dump.type_item(prefix, "stopCommand", "string|stringList");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "startCommand", display_opt(self.start_command.as_ref()));
        dump.value_item(id, "stopCommand", display_opt(self.stop_command.as_ref()));
    }
}

/// Execute a command on a remote host through `rexec`.
pub struct RexecAction {
    core: ActionCore,
    start_command: Option<CommandSpec>,
    stop_command: Option<CommandSpec>,
    host: String,
    login: String,
    password: String,
    runner: Arc<dyn CommandRunner>,
}

impl RexecAction {
    pub fn new(
        ids: &IdAllocator,
        start_command: Option<CommandSpec>,
        stop_command: Option<CommandSpec>,
        host: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        RexecAction {
            core: ActionCore::new(ids, "Remote command execution using rexec", true),
            start_command,
            stop_command,
            host: host.into(),
            login: login.into(),
            password: password.into(),
            runner: Arc::new(LocalRunner),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Prefix the command with the fixed rexec invocation.
    fn wrap(&self, command: &CommandSpec) -> Vec<String> {
        let mut argv = vec![
            "rexec".to_string(),
            "-l".to_string(),
            self.login.clone(),
            "-p".to_string(),
            self.password.clone(),
            self.host.clone(),
        ];
        argv.extend(command.tokens());
        argv
    }

    fn execute(&self, command: &CommandSpec) -> Result<bool> {
        println!(
            "Remotely executing \"{}\" on {} using rexec",
            command.display(),
            self.host
        );
        run_command(self.runner.as_ref(), &self.wrap(command))
    }
}

impl ControlAction for RexecAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Rexec"
    }

    fn start(&self) -> Result<bool> {
        match &self.start_command {
            Some(command) => self.execute(command),
            None => Ok(true),
        }
    }

    fn stop(&self) {
        if let Some(command) = &self.stop_command {
            if let Err(err) = self.execute(command) {
                warn!(%err, host = %self.host, "remote stop command could not be executed");
            }
        }
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "startCommand", "string|stringList");
        dump.type_item(prefix, "stopCommand", "string|stringList");
        dump.type_item(prefix, "host", "string");
        dump.type_item(prefix, "login", "string");
        dump.type_item(prefix, "password", "string");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "startCommand", display_opt(self.start_command.as_ref()));
        dump.value_item(id, "stopCommand", display_opt(self.stop_command.as_ref()));
        dump.value_item(id, "host", &self.host);
        dump.value_item(id, "login", &self.login);
        dump.value_item(id, "password", &self.password);
    }
}

/// Execute a command on a remote host through `rsh`.
pub struct RshAction {
    core: ActionCore,
    start_command: Option<CommandSpec>,
    stop_command: Option<CommandSpec>,
    host: String,
    login: String,
    runner: Arc<dyn CommandRunner>,
}

impl RshAction {
    pub fn new(
        ids: &IdAllocator,
        start_command: Option<CommandSpec>,
        stop_command: Option<CommandSpec>,
        host: impl Into<String>,
        login: impl Into<String>,
    ) -> Self {
        RshAction {
            core: ActionCore::new(ids, "Remote command execution using rsh", true),
            start_command,
            stop_command,
            host: host.into(),
            login: login.into(),
            runner: Arc::new(LocalRunner),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    fn wrap(&self, command: &CommandSpec) -> Vec<String> {
        let mut argv = vec![
            "rsh".to_string(),
            "-l".to_string(),
            self.login.clone(),
            self.host.clone(),
        ];
        argv.extend(command.tokens());
        argv
    }
}

impl ControlAction for RshAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Rsh"
    }

    fn start(&self) -> Result<bool> {
        match &self.start_command {
            Some(command) => run_command(self.runner.as_ref(), &self.wrap(command)),
            None => Ok(true),
        }
    }

    fn stop(&self) {
        if let Some(command) = &self.stop_command {
            run_stop_command(self.runner.as_ref(), &self.wrap(command));
        }
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "startCommand", "string|stringList");
        dump.type_item(prefix, "stopCommand", "string|stringList");
        dump.type_item(prefix, "host", "string");
        dump.type_item(prefix, "login", "string");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "startCommand", display_opt(self.start_command.as_ref()));
        dump.value_item(id, "stopCommand", display_opt(self.stop_command.as_ref()));
        dump.value_item(id, "host", &self.host);
        dump.value_item(id, "login", &self.login);
    }
}

/// Build the service-control argv for one lifecycle operation.
pub fn service_argv(family: OsFamily, service_name: &str, operation: &str) -> Vec<String> {
    match family {
        OsFamily::Windows => vec![
            "net".to_string(),
            operation.to_string(),
            service_name.to_string(),
        ],
        OsFamily::Posix => vec![
            "service".to_string(),
            service_name.to_string(),
            operation.to_string(),
        ],
    }
}

/// Start/stop an OS service by name.
pub struct ServiceAction {
    core: ActionCore,
    service_name: String,
    start_command: CommandSpec,
    stop_command: CommandSpec,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceAction {
    pub fn new(
        ids: &IdAllocator,
        description: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self::for_family(ids, description, service_name, OsFamily::current())
    }

    /// Family-explicit constructor, used directly by tests.
    pub fn for_family(
        ids: &IdAllocator,
        description: impl Into<String>,
        service_name: impl Into<String>,
        family: OsFamily,
    ) -> Self {
        let service_name = service_name.into();
        ServiceAction {
            core: ActionCore::new(ids, description, true),
            start_command: CommandSpec::Argv(service_argv(family, &service_name, "start")),
            stop_command: CommandSpec::Argv(service_argv(family, &service_name, "stop")),
            service_name,
            runner: Arc::new(LocalRunner),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

impl ControlAction for ServiceAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Service"
    }

    fn start(&self) -> Result<bool> {
        run_command(self.runner.as_ref(), &self.start_command.tokens())
    }

    fn stop(&self) {
        run_stop_command(self.runner.as_ref(), &self.stop_command.tokens());
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "startCommand", "string|stringList");
        dump.type_item(prefix, "stopCommand", "string|stringList");
        dump.type_item(prefix, "serviceName", "string");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "startCommand", &self.start_command);
        dump.value_item(id, "stopCommand", &self.stop_command);
        dump.value_item(id, "serviceName", &self.service_name);
    }
}
