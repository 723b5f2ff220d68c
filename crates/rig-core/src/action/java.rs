//! Java process action.
//!
//! A pure argument builder on top of [`NativeProcessAction`]: classpath,
//! VM arguments, optional coverage and GUI agents, and optional JMX
//! system properties are assembled into one ordered argv handed to the
//! `java` executable. No new lifecycle behavior lives here.

use crate::action::process::{NativeProcessAction, ProcessPriority};
use crate::action::{describe_base_values, ActionCore, ControlAction};
use crate::dump::{display_opt, ParamDump};
use crate::platform::{install_root, normalize_classpath, OsFamily};
use crate::runner::CommandRunner;
use rig_common::{IdAllocator, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable pointing at the jacoco installation.
pub const JACOCO_HOME_ENV_VAR: &str = "JACOCO_HOME";

/// Archive extension that switches the launch to `-jar` mode.
const JAR_EXTENSION: &str = ".jar";

/// Optional knobs for a Java process.
#[derive(Debug, Clone)]
pub struct JavaProcessConfig {
    /// Arguments passed to the main class or jar.
    pub args: Vec<String>,
    /// Working directory; defaults to the install root.
    pub working_dir: Option<PathBuf>,
    /// Classpath; normalized to the host family's separator convention.
    pub class_path: Option<String>,
    /// Additional JVM arguments.
    pub vm_args: Vec<String>,
    /// JMX port; unset disables the JMX system properties.
    pub jmx_port: Option<u16>,
    /// Liveness check delay for the supervisor start script.
    pub check_after: Option<u32>,
    pub priority: Option<ProcessPriority>,
    /// Enable coverage instrumentation via the jacoco agent.
    pub use_jacoco: bool,
    pub jacoco_includes: Option<String>,
    pub jacoco_excludes: Option<String>,
    /// Enable the GUI-accessibility agent shipped under the install root.
    pub use_javagui: bool,
    pub active: bool,
}

impl Default for JavaProcessConfig {
    fn default() -> Self {
        JavaProcessConfig {
            args: Vec::new(),
            working_dir: None,
            class_path: None,
            vm_args: Vec::new(),
            jmx_port: None,
            check_after: None,
            priority: None,
            use_jacoco: false,
            jacoco_includes: None,
            jacoco_excludes: None,
            use_javagui: false,
            active: true,
        }
    }
}

/// Assemble the ordered JVM argv.
///
/// Order: classpath, VM args, coverage agent, GUI agent, JMX properties,
/// `-jar` when the target is an archive, the target itself, then its
/// arguments.
pub fn build_jvm_arguments(
    class_path: Option<&str>,
    vm_args: &[String],
    jacoco_argument: Option<&str>,
    javagui_argument: Option<&str>,
    jmx_port: Option<u16>,
    main_class_or_jar: &str,
    main_args: &[String],
) -> Vec<String> {
    let mut argv = Vec::new();

    if let Some(cp) = class_path {
        argv.push("-cp".to_string());
        argv.push(cp.to_string());
    }

    argv.extend(vm_args.iter().cloned());

    if let Some(jacoco) = jacoco_argument {
        argv.push(jacoco.to_string());
    }

    if let Some(javagui) = javagui_argument {
        argv.push(javagui.to_string());
    }

    if let Some(port) = jmx_port {
        argv.push(format!("-Dcom.sun.management.jmxremote.port={port}"));
        argv.push("-Dcom.sun.management.jmxremote.authenticate=false".to_string());
        argv.push("-Dcom.sun.management.jmxremote.ssl=false".to_string());
    }

    if main_class_or_jar.ends_with(JAR_EXTENSION) {
        argv.push("-jar".to_string());
    }
    argv.push(main_class_or_jar.to_string());
    argv.extend(main_args.iter().cloned());

    argv
}

/// Jacoco agent argument for a given tool home and run description.
fn build_jacoco_argument(
    home: &str,
    description: &str,
    includes: Option<&str>,
    excludes: Option<&str>,
) -> String {
    let agent = Path::new(home).join("lib").join("jacocoagent.jar");
    let destfile = Path::new("reports").join(format!("{description}.jacoco"));
    let mut argument = format!(
        "-javaagent:{}=append=true,destfile={}",
        agent.display(),
        destfile.display()
    );

    if let Some(includes) = includes {
        argument.push_str(",includes=");
        argument.push_str(includes);
    }
    if let Some(excludes) = excludes {
        argument.push_str(",excludes=");
        argument.push_str(excludes);
    }

    argument
}

/// Start/stop a Java process.
pub struct JavaProcessAction {
    process: NativeProcessAction,
    main_class_or_jar: String,
    main_args: Vec<String>,
    class_path: Option<String>,
    vm_args: Vec<String>,
    jmx_port: Option<u16>,
    jacoco_argument: Option<String>,
    javagui_argument: Option<String>,
}

impl JavaProcessAction {
    pub fn new(
        ids: &IdAllocator,
        description: impl Into<String>,
        main_class_or_jar: impl Into<String>,
        config: JavaProcessConfig,
    ) -> Self {
        let description = description.into();
        let main_class_or_jar = main_class_or_jar.into();
        let family = OsFamily::current();

        let class_path = config
            .class_path
            .as_deref()
            .map(|cp| normalize_classpath(cp, family));

        let jacoco_argument = if config.use_jacoco {
            match env::var(JACOCO_HOME_ENV_VAR) {
                Ok(home) => Some(build_jacoco_argument(
                    &home,
                    &description,
                    config.jacoco_includes.as_deref(),
                    config.jacoco_excludes.as_deref(),
                )),
                Err(_) => {
                    println!(
                        "WARNING: {JACOCO_HOME_ENV_VAR} variable not defined - coverage disabled!"
                    );
                    None
                }
            }
        } else {
            None
        };

        let javagui_argument = if config.use_javagui {
            let agent = install_root().join("plugins").join("javagui-agent.jar");
            Some(format!("-javaagent:{}", agent.display()))
        } else {
            None
        };

        let arguments = build_jvm_arguments(
            class_path.as_deref(),
            &config.vm_args,
            jacoco_argument.as_deref(),
            javagui_argument.as_deref(),
            config.jmx_port,
            &main_class_or_jar,
            &config.args,
        );

        let mut process = NativeProcessAction::new(ids, description.clone(), "java", arguments)
            .with_active(config.active)
            .with_output_file(format!("{description}.out"));
        if let Some(dir) = config.working_dir {
            process = process.with_working_dir(dir);
        }
        if let Some(seconds) = config.check_after {
            process = process.with_check_after(seconds);
        }
        if let Some(priority) = config.priority {
            process = process.with_priority(priority);
        }

        JavaProcessAction {
            process,
            main_class_or_jar,
            main_args: config.args,
            class_path,
            vm_args: config.vm_args,
            jmx_port: config.jmx_port,
            jacoco_argument,
            javagui_argument,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.process = self.process.with_runner(runner);
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.process = self.process.with_root(root);
        self
    }

    /// The argv handed to the `java` executable.
    pub fn jvm_arguments(&self) -> Vec<String> {
        build_jvm_arguments(
            self.class_path.as_deref(),
            &self.vm_args,
            self.jacoco_argument.as_deref(),
            self.javagui_argument.as_deref(),
            self.jmx_port,
            &self.main_class_or_jar,
            &self.main_args,
        )
    }
}

impl ControlAction for JavaProcessAction {
    fn core(&self) -> &ActionCore {
        self.process.core()
    }

    fn kind(&self) -> &'static str {
        "JavaProcess"
    }

    fn start(&self) -> Result<bool> {
        self.process.start()
    }

    fn stop(&self) {
        self.process.stop();
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        crate::action::describe_base_schema(prefix, dump);
        self.process.variant_schema(prefix, dump);
        dump.type_item(prefix, "mainClassOrJar", "string");
        dump.type_item(prefix, "mainArgs", "stringList");
        dump.type_item(prefix, "classPath", "string");
        dump.type_item(prefix, "vmArgs", "stringList");
        dump.type_item(prefix, "jmxPort", "integer");
        dump.type_item(prefix, "jacocoArguments", "string");
        dump.type_item(prefix, "javaGuiArguments", "string");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(self.core(), self.kind(), dump);
        self.process.variant_values(dump);
        let id = self.core().id;
        dump.value_item(id, "mainClassOrJar", &self.main_class_or_jar);
        dump.value_item(id, "mainArgs", self.main_args.join(" "));
        dump.value_item(id, "classPath", display_opt(self.class_path.as_ref()));
        dump.value_item(id, "vmArgs", self.vm_args.join(" "));
        dump.value_item(id, "jmxPort", display_opt(self.jmx_port.as_ref()));
        dump.value_item(
            id,
            "jacocoArguments",
            display_opt(self.jacoco_argument.as_ref()),
        );
        dump.value_item(
            id,
            "javaGuiArguments",
            display_opt(self.javagui_argument.as_ref()),
        );
    }
}
