//! Param dump sink.
//!
//! Every start run writes a sidecar file next to the scenario describing
//! each action twice: a type schema (`prefix.field=typeName`) and the
//! actual values (`id.field=value`). Lines appear in declaration order,
//! shared fields first, then variant fields. The file is plain `key=value`
//! text so external tooling can consume it without a parser.

use rig_common::ActionId;
use std::fmt;
use std::io::{self, Write};

/// In-memory accumulator for `.param` lines.
///
/// Actions append their schema and value lines here; the orchestrator
/// flushes the buffer to disk in one pass.
#[derive(Debug, Default)]
pub struct ParamDump {
    lines: Vec<String>,
}

impl ParamDump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a schema line: `prefix.item=type`.
    pub fn type_item(&mut self, prefix: &str, item: &str, ty: &str) {
        self.lines.push(format!("{prefix}.{item}={ty}"));
    }

    /// Append a value line: `id.item=value`.
    pub fn value_item(&mut self, id: ActionId, item: &str, value: impl fmt::Display) {
        self.lines.push(format!("{id}.{item}={value}"));
    }

    /// Append a preformatted line (used for the `processes=` chain).
    pub fn raw_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write all accumulated lines, one per line, to `writer`.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

/// Render an optional value the way the dump format expects.
///
/// Unset fields still get a line so the schema and value sections stay
/// aligned field for field.
pub fn display_opt<T: fmt::Display>(value: Option<&T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}
