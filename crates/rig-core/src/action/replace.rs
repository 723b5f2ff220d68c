//! In-place regex rewrite action.
//!
//! Start-only: every line of every target file gets regex matches replaced.
//! Backslashes in the user-supplied pattern and replacement are escaped up
//! front so literal backslashes survive, and `\1`-style capture-group
//! references in the replacement are honored. An unopenable target is
//! fatal; files are rewritten one by one with no rollback of the ones
//! already done.

use crate::action::{describe_base_schema, describe_base_values, ActionCore, ControlAction};
use crate::dump::ParamDump;
use regex::Regex;
use rig_common::{Error, IdAllocator, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Replace string(s) in file(s), only on start.
#[derive(Debug)]
pub struct ReplaceInFiles {
    core: ActionCore,
    find: String,
    replace: String,
    files: Vec<PathBuf>,
    regex: Regex,
    replacement: String,
}

impl ReplaceInFiles {
    /// Compile the pattern up front; an invalid pattern is a configuration
    /// problem, not a start-time one.
    pub fn new(
        ids: &IdAllocator,
        find: impl Into<String>,
        replace: impl Into<String>,
        files: Vec<PathBuf>,
    ) -> Result<Self> {
        let find = find.into();
        let replace = replace.into();

        let regex = Regex::new(&escape_pattern(&find))
            .map_err(|err| Error::Pattern(err.to_string()))?;
        let replacement = translate_replacement(&replace);

        Ok(ReplaceInFiles {
            core: ActionCore::new(ids, "Replace in file(s)", true),
            find,
            replace,
            files,
            regex,
            replacement,
        })
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    /// Apply the substitution to each line, keeping line terminators.
    fn rewrite_content(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        for segment in content.split_inclusive('\n') {
            let (line, terminator) = match segment.strip_suffix('\n') {
                Some(rest) => match rest.strip_suffix('\r') {
                    Some(bare) => (bare, "\r\n"),
                    None => (rest, "\n"),
                },
                None => (segment, ""),
            };
            out.push_str(&self.regex.replace_all(line, self.replacement.as_str()));
            out.push_str(terminator);
        }
        out
    }
}

/// Double backslashes so they match literally instead of starting a regex
/// escape.
fn escape_pattern(find: &str) -> String {
    find.replace('\\', "\\\\")
}

/// Convert the user replacement into the regex crate's replacement syntax:
/// `\N` becomes a capture-group reference, every other backslash and every
/// dollar sign stays literal.
fn translate_replacement(replace: &str) -> String {
    let mut out = String::with_capacity(replace.len());
    let mut chars = replace.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek() {
                Some(digit) if digit.is_ascii_digit() => {
                    let digit = chars.next().unwrap();
                    out.push_str("${");
                    out.push(digit);
                    out.push('}');
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

impl ControlAction for ReplaceInFiles {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "ReplaceInFiles"
    }

    fn start(&self) -> Result<bool> {
        for path in &self.files {
            let content = fs::read_to_string(path).map_err(|source| Error::Rewrite {
                path: path.clone(),
                source,
            })?;
            let rewritten = self.rewrite_content(&content);
            fs::write(path, rewritten).map_err(|source| Error::Rewrite {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), pattern = %self.find, "rewrote file in place");
        }
        Ok(true)
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "findString", "string");
        dump.type_item(prefix, "replaceString", "string");
        dump.type_item(prefix, "files", "stringList");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "findString", &self.find);
        dump.value_item(id, "replaceString", &self.replace);
        let files = self
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        dump.value_item(id, "files", files);
    }
}
