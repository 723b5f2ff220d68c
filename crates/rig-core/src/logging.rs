//! Diagnostics logging for rig-core.
//!
//! Dual-mode output on stderr: human-readable for interactive use,
//! JSON lines for automation. stdout stays reserved for the progress
//! lines that are part of the run contract. Respects `RIG_LOG` and
//! `RUST_LOG` for fine-grained filtering.

use clap::ValueEnum;
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

/// Logging configuration derived from CLI flags.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Default level when no env filter is set.
    pub level: &'static str,
}

impl LogConfig {
    /// Map verbosity flags to a default level.
    pub fn from_flags(format: LogFormat, verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        LogConfig { format, level }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: "info",
        }
    }
}

/// Initialize the logging subsystem. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_env("RIG_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("rig_core={}", config.level)));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json();
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}

/// Generate a unique run id for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.to_string()[..12])
}
