//! rig-core CLI: run a control scenario's start or stop half.
//!
//! Usage: `rig-core <start|stop> <scenario.toml>`. The mode word is
//! case-insensitive; anything else aborts before any action runs. The
//! start run writes `<scenario>.param` next to the scenario file.

use clap::{Args, Parser};
use rig_common::{Error, IdAllocator, StructuredError};
use rig_core::exit_codes::ExitCode;
use rig_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat};
use rig_core::scenario::load_scenario;
use rig_core::script::{ControlScript, Mode, RunOutcome};
use std::path::Path;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// rigctl control-script runner
#[derive(Parser)]
#[command(name = "rig-core")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Lifecycle mode: 'start' or 'stop' (case-insensitive)
    mode: String,

    /// Scenario file declaring the ordered action list
    scenario: PathBuf,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostics format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

fn main() {
    let cli = Cli::parse();

    let mode = match Mode::parse(&cli.mode) {
        Ok(mode) => mode,
        Err(_) => {
            eprintln!(
                "Invalid syntax: the first argument of a control script must be 'start' or 'stop'"
            );
            process::exit(ExitCode::ArgsError.as_i32());
        }
    };

    init_logging(&LogConfig::from_flags(
        cli.global.log_format,
        cli.global.verbose,
        cli.global.quiet,
    ));
    let run_id = generate_run_id();
    info!(%run_id, scenario = %cli.scenario.display(), ?mode, "control script run");

    process::exit(run(mode, &cli.scenario, cli.global.log_format).as_i32());
}

fn run(mode: Mode, scenario_path: &Path, log_format: LogFormat) -> ExitCode {
    let scenario = match load_scenario(scenario_path) {
        Ok(scenario) => scenario,
        Err(err) => {
            error!(%err, "cannot load scenario");
            report_error(&err, log_format);
            return ExitCode::from_error(&err);
        }
    };

    let ids = IdAllocator::new();
    let actions = match scenario.build(&ids) {
        Ok(actions) => actions,
        Err(err) => {
            error!(%err, "cannot build action list");
            report_error(&err, log_format);
            return ExitCode::from_error(&err);
        }
    };

    let script = ControlScript::new(actions);
    let param_path = scenario_path.with_extension("param");

    match script.run(mode, &param_path) {
        Ok(RunOutcome::Completed) => ExitCode::Clean,
        Ok(RunOutcome::Halted) => ExitCode::StartHalted,
        Err(err) => {
            error!(%err, "control script run aborted");
            report_error(&err, log_format);
            ExitCode::from_error(&err)
        }
    }
}

fn report_error(err: &Error, log_format: LogFormat) {
    match log_format {
        LogFormat::Jsonl => eprintln!("{}", StructuredError::from(err).to_json()),
        LogFormat::Human => eprintln!("{err}"),
    }
}
