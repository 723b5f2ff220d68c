//! Remote reboot action.
//!
//! The login/reboot transport is an external capability injected behind
//! [`RemoteConsole`]; this action only sequences connect, reboot, and the
//! post-reboot wait. Library-only: it cannot be declared in a scenario
//! file because the console has to be supplied by the embedding program.

use crate::action::{describe_base_schema, describe_base_values, ActionCore, ControlAction};
use crate::dump::ParamDump;
use crate::platform::OsFamily;
use rig_common::{IdAllocator, Result};
use std::env;
use std::fmt;
use std::thread;
use std::time::Duration;

/// Remote session capability: connect to a host and ask it to reboot.
pub trait RemoteConsole: fmt::Debug + Send + Sync {
    fn connect(&self) -> bool;
    fn reboot(&self) -> bool;
}

/// Local username, from the env var the host family uses.
fn local_user(family: OsFamily) -> Option<String> {
    let var = match family {
        OsFamily::Windows => "USERNAME",
        OsFamily::Posix => "USER",
    };
    env::var(var).ok()
}

/// Reboot a remote host and wait for it to come back.
pub struct RebootAction {
    core: ActionCore,
    host: String,
    login: String,
    local_user: Option<String>,
    waiting_time: f64,
    console: Box<dyn RemoteConsole>,
}

impl RebootAction {
    pub fn new(
        ids: &IdAllocator,
        host: impl Into<String>,
        login: impl Into<String>,
        console: Box<dyn RemoteConsole>,
    ) -> Self {
        RebootAction {
            core: ActionCore::new(ids, "Remote reboot", true),
            host: host.into(),
            login: login.into(),
            local_user: local_user(OsFamily::current()),
            waiting_time: 60.0,
            console,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    /// Seconds to wait after the reboot is acknowledged.
    pub fn with_waiting_time(mut self, seconds: f64) -> Self {
        self.waiting_time = seconds;
        self
    }

    pub fn local_user(&self) -> Option<&str> {
        self.local_user.as_deref()
    }
}

impl ControlAction for RebootAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Reboot"
    }

    fn start(&self) -> Result<bool> {
        println!("Rebooting {}...", self.host);

        if self.console.connect() && self.console.reboot() {
            println!(
                "Waiting for {} seconds while {} is rebooting...",
                self.waiting_time, self.host
            );
            thread::sleep(Duration::from_secs_f64(self.waiting_time));
            return Ok(true);
        }

        Ok(false)
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "host", "string");
        dump.type_item(prefix, "login", "string");
        dump.type_item(prefix, "waitingTime", "float");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "host", &self.host);
        dump.value_item(id, "login", &self.login);
        dump.value_item(id, "waitingTime", self.waiting_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ScriptedConsole {
        connects: bool,
        reboots: bool,
    }

    impl RemoteConsole for ScriptedConsole {
        fn connect(&self) -> bool {
            self.connects
        }

        fn reboot(&self) -> bool {
            self.reboots
        }
    }

    fn reboot_with(connects: bool, reboots: bool) -> RebootAction {
        let ids = IdAllocator::new();
        RebootAction::new(
            &ids,
            "target9",
            "ops",
            Box::new(ScriptedConsole { connects, reboots }),
        )
        .with_waiting_time(0.0)
    }

    #[test]
    fn successful_reboot_returns_true() {
        assert!(reboot_with(true, true).start().unwrap());
    }

    #[test]
    fn refused_connect_returns_false() {
        assert!(!reboot_with(false, true).start().unwrap());
    }

    #[test]
    fn refused_reboot_returns_false() {
        assert!(!reboot_with(true, false).start().unwrap());
    }

    #[test]
    fn stop_is_a_noop() {
        reboot_with(true, true).stop();
    }

    #[test]
    fn local_user_env_var_follows_family() {
        // Both variables may be unset in minimal environments; only check
        // that the lookup itself is family-keyed and does not panic.
        let _ = local_user(OsFamily::Posix);
        let _ = local_user(OsFamily::Windows);
    }
}
