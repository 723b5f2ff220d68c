//! Scenario files: declarative action lists.
//!
//! A scenario is a TOML file with one `[[action]]` table per action, in
//! sequence order. The CLI builds the action list from it; library users
//! can also assemble actions directly. Reboot actions are library-only
//! because they need an injected remote console.

use crate::action::{
    CommandAction, ControlAction, JavaProcessAction, JavaProcessConfig, NativeProcessAction,
    OnStart, OnStop, ProcessPriority, ReplaceInFiles, RexecAction, RshAction, ServiceAction, Sleep,
};
use crate::runner::CommandSpec;
use rig_common::{Error, IdAllocator, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Which lifecycle half a wrapped action participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleHalf {
    Start,
    Stop,
}

/// Top-level scenario file.
#[derive(Debug, Deserialize, Default)]
pub struct Scenario {
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionConfig>,
}

/// One declared action.
#[derive(Debug, Deserialize)]
pub struct ActionConfig {
    #[serde(flatten)]
    pub kind: ActionKindConfig,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Restrict the action to one lifecycle half (OnStart/OnStop wrap).
    #[serde(default)]
    pub on: Option<LifecycleHalf>,
}

fn default_active() -> bool {
    true
}

/// Kind-specific action fields.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKindConfig {
    Command {
        description: String,
        #[serde(default)]
        start: Option<CommandSpec>,
        #[serde(default)]
        stop: Option<CommandSpec>,
    },
    Rexec {
        #[serde(default)]
        start: Option<CommandSpec>,
        #[serde(default)]
        stop: Option<CommandSpec>,
        host: String,
        login: String,
        password: String,
    },
    Rsh {
        #[serde(default)]
        start: Option<CommandSpec>,
        #[serde(default)]
        stop: Option<CommandSpec>,
        host: String,
        login: String,
    },
    Service {
        description: String,
        name: String,
    },
    Replace {
        find: String,
        replace: String,
        files: Vec<PathBuf>,
    },
    Process {
        description: String,
        executable: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_dir: Option<PathBuf>,
        #[serde(default)]
        check_after: Option<u32>,
        #[serde(default)]
        priority: Option<ProcessPriority>,
        #[serde(default)]
        out_file: Option<PathBuf>,
    },
    Java {
        description: String,
        main: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        class_path: Option<String>,
        #[serde(default)]
        vm_args: Vec<String>,
        #[serde(default)]
        jmx_port: Option<u16>,
        #[serde(default)]
        check_after: Option<u32>,
        #[serde(default)]
        priority: Option<ProcessPriority>,
        #[serde(default)]
        jacoco: bool,
        #[serde(default)]
        jacoco_includes: Option<String>,
        #[serde(default)]
        jacoco_excludes: Option<String>,
        #[serde(default)]
        javagui: bool,
        #[serde(default)]
        working_dir: Option<PathBuf>,
    },
    Sleep {
        seconds: f64,
        #[serde(default)]
        message: Option<String>,
    },
}

/// Read and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path).map_err(|err| Error::Scenario {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    toml::from_str(&content).map_err(|err| Error::Scenario {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

impl Scenario {
    /// Build the ordered action list, allocating ids in declaration order.
    pub fn build(&self, ids: &IdAllocator) -> Result<Vec<Box<dyn ControlAction>>> {
        self.actions.iter().map(|config| config.build(ids)).collect()
    }
}

impl ActionConfig {
    /// Build one action, applying the optional lifecycle-half wrap.
    pub fn build(&self, ids: &IdAllocator) -> Result<Box<dyn ControlAction>> {
        // When wrapped, the active flag belongs to the wrapper.
        let inner_active = self.on.is_some() || self.active;
        let action = self.kind.build(ids, inner_active)?;

        Ok(match self.on {
            Some(LifecycleHalf::Start) => {
                Box::new(OnStart::new(ids, action).with_active(self.active))
            }
            Some(LifecycleHalf::Stop) => {
                Box::new(OnStop::new(ids, action).with_active(self.active))
            }
            None => action,
        })
    }
}

impl ActionKindConfig {
    fn build(&self, ids: &IdAllocator, active: bool) -> Result<Box<dyn ControlAction>> {
        Ok(match self {
            ActionKindConfig::Command {
                description,
                start,
                stop,
            } => Box::new(
                CommandAction::new(ids, description.clone(), start.clone(), stop.clone())
                    .with_active(active),
            ),
            ActionKindConfig::Rexec {
                start,
                stop,
                host,
                login,
                password,
            } => Box::new(
                RexecAction::new(
                    ids,
                    start.clone(),
                    stop.clone(),
                    host.clone(),
                    login.clone(),
                    password.clone(),
                )
                    .with_active(active),
            ),
            ActionKindConfig::Rsh {
                start,
                stop,
                host,
                login,
            } => Box::new(
                RshAction::new(ids, start.clone(), stop.clone(), host.clone(), login.clone())
                    .with_active(active),
            ),
            ActionKindConfig::Service { description, name } => {
                Box::new(ServiceAction::new(ids, description.clone(), name.clone()).with_active(active))
            }
            ActionKindConfig::Replace {
                find,
                replace,
                files,
            } => Box::new(
                ReplaceInFiles::new(ids, find.clone(), replace.clone(), files.clone())?.with_active(active),
            ),
            ActionKindConfig::Process {
                description,
                executable,
                args,
                working_dir,
                check_after,
                priority,
                out_file,
            } => {
                let mut action =
                    NativeProcessAction::new(ids, description.clone(), executable.clone(), args.clone())
                        .with_active(active);
                if let Some(dir) = working_dir {
                    action = action.with_working_dir(dir);
                }
                if let Some(seconds) = check_after {
                    action = action.with_check_after(*seconds);
                }
                if let Some(priority) = priority {
                    action = action.with_priority(*priority);
                }
                if let Some(out) = out_file {
                    action = action.with_output_file(out);
                }
                Box::new(action)
            }
            ActionKindConfig::Java {
                description,
                main,
                args,
                class_path,
                vm_args,
                jmx_port,
                check_after,
                priority,
                jacoco,
                jacoco_includes,
                jacoco_excludes,
                javagui,
                working_dir,
            } => {
                let config = JavaProcessConfig {
                    args: args.clone(),
                    working_dir: working_dir.clone(),
                    class_path: class_path.clone(),
                    vm_args: vm_args.clone(),
                    jmx_port: *jmx_port,
                    check_after: *check_after,
                    priority: *priority,
                    use_jacoco: *jacoco,
                    jacoco_includes: jacoco_includes.clone(),
                    jacoco_excludes: jacoco_excludes.clone(),
                    use_javagui: *javagui,
                    active,
                };
                Box::new(JavaProcessAction::new(ids, description.clone(), main.clone(), config))
            }
            ActionKindConfig::Sleep { seconds, message } => {
                let mut action = Sleep::new(ids, *seconds).with_active(active);
                if let Some(message) = message {
                    action = action.with_message(message.clone());
                }
                Box::new(action)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_common::ActionId;

    #[test]
    fn full_scenario_builds_in_declaration_order() {
        let toml = r#"
            [[action]]
            kind = "command"
            description = "init database"
            start = "pg_ctl start"
            stop = ["pg_ctl", "stop"]

            [[action]]
            kind = "sleep"
            seconds = 0.5
            message = "settling"

            [[action]]
            kind = "process"
            description = "server"
            executable = "myserver"
            args = ["--port", "8080"]
            priority = "high"

            [[action]]
            kind = "java"
            description = "gateway"
            main = "gateway.jar"
            vm_args = ["-Xmx256m"]

            [[action]]
            kind = "service"
            description = "web server"
            name = "nginx"
            active = false
        "#;

        let scenario: Scenario = toml::from_str(toml).unwrap();
        let ids = IdAllocator::new();
        let actions = scenario.build(&ids).unwrap();

        assert_eq!(actions.len(), 5);
        let kinds: Vec<&str> = actions.iter().map(|a| a.kind()).collect();
        assert_eq!(
            kinds,
            vec!["Command", "Sleep", "NativeProcess", "JavaProcess", "Service"]
        );
        let ids: Vec<ActionId> = actions.iter().map(|a| a.id()).collect();
        assert_eq!(
            ids,
            vec![
                ActionId(1),
                ActionId(2),
                ActionId(3),
                ActionId(4),
                ActionId(5)
            ]
        );
        assert!(!actions[4].active());
    }

    #[test]
    fn on_start_wraps_and_takes_the_active_flag() {
        let toml = r#"
            [[action]]
            kind = "command"
            description = "one shot"
            start = "setup"
            on = "start"
            active = false
        "#;

        let scenario: Scenario = toml::from_str(toml).unwrap();
        let ids = IdAllocator::new();
        let actions = scenario.build(&ids).unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind(), "OnStart");
        assert_eq!(actions[0].description(), "one shot on start");
        assert!(!actions[0].active());
        // Inner action id 1, wrapper id 2.
        assert_eq!(actions[0].id(), ActionId(2));
    }

    #[test]
    fn on_stop_wraps() {
        let toml = r#"
            [[action]]
            kind = "rsh"
            stop = "svc teardown"
            host = "target9"
            login = "ops"
            on = "stop"
        "#;

        let scenario: Scenario = toml::from_str(toml).unwrap();
        let ids = IdAllocator::new();
        let actions = scenario.build(&ids).unwrap();
        assert_eq!(actions[0].kind(), "OnStop");
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let toml = r#"
            [[action]]
            kind = "teleport"
            description = "x"
        "#;
        assert!(toml::from_str::<Scenario>(toml).is_err());
    }

    #[test]
    fn invalid_replace_pattern_fails_at_build() {
        let toml = r#"
            [[action]]
            kind = "replace"
            find = "(unclosed"
            replace = "x"
            files = ["conf.ini"]
        "#;
        let scenario: Scenario = toml::from_str(toml).unwrap();
        let ids = IdAllocator::new();
        assert!(scenario.build(&ids).is_err());
    }

    #[test]
    fn missing_scenario_file_is_a_scenario_error() {
        let err = load_scenario(Path::new("/nonexistent/rig-scenario.toml")).unwrap_err();
        assert!(matches!(err, Error::Scenario { .. }));
    }

    #[test]
    fn empty_scenario_is_legal() {
        let scenario: Scenario = toml::from_str("").unwrap();
        let ids = IdAllocator::new();
        assert!(scenario.build(&ids).unwrap().is_empty());
    }
}
