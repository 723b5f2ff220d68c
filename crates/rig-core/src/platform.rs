//! Host platform facts resolved once per process.
//!
//! The framework only distinguishes two OS families. The family picks the
//! supervisor script flavor (`.cmd` under `win32`, `.sh` under `posix`),
//! the service-control command shape, and classpath normalization. All
//! family-dependent helpers also take the family as a parameter so both
//! branches stay testable on any host.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

/// Environment variable naming the install root.
pub const ROOT_ENV_VAR: &str = "RIG_ROOT";

static CURRENT_FAMILY: OnceLock<OsFamily> = OnceLock::new();
static INSTALL_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// The two supported OS families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Posix,
}

impl OsFamily {
    /// Family of the running host, computed once.
    pub fn current() -> OsFamily {
        *CURRENT_FAMILY.get_or_init(|| {
            if cfg!(windows) {
                OsFamily::Windows
            } else {
                OsFamily::Posix
            }
        })
    }

    /// Extension of the supervisor start/stop scripts.
    pub fn script_extension(self) -> &'static str {
        match self {
            OsFamily::Windows => ".cmd",
            OsFamily::Posix => ".sh",
        }
    }

    /// Platform directory under `tools/process/`.
    pub fn platform_tag(self) -> &'static str {
        match self {
            OsFamily::Windows => "win32",
            OsFamily::Posix => "posix",
        }
    }

    /// Classpath entry separator.
    pub fn classpath_separator(self) -> char {
        match self {
            OsFamily::Windows => ';',
            OsFamily::Posix => ':',
        }
    }
}

/// Install root, from `RIG_ROOT` or the current directory as fallback.
///
/// Resolved once; the supervisor scripts, default working directories and
/// agent jars all hang off this path.
pub fn install_root() -> PathBuf {
    INSTALL_ROOT
        .get_or_init(|| match env::var_os(ROOT_ENV_VAR) {
            Some(root) => PathBuf::from(root),
            None => {
                warn!("{ROOT_ENV_VAR} not set, using current directory as install root");
                env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        })
        .clone()
}

/// Directory holding the supervisor start/stop scripts for `family`.
pub fn process_script_dir(root: &Path, family: OsFamily) -> PathBuf {
    root.join("tools")
        .join("process")
        .join(family.platform_tag())
}

/// Normalize a classpath to the conventions of `family`.
///
/// Windows-style targets get `;` separators and backslash path separators;
/// the other family gets `:` separators.
pub fn normalize_classpath(classpath: &str, family: OsFamily) -> String {
    match family {
        OsFamily::Windows => classpath.replace(':', ";").replace('/', "\\"),
        OsFamily::Posix => classpath.replace(';', ":"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_family_uses_cmd_and_win32() {
        assert_eq!(OsFamily::Windows.script_extension(), ".cmd");
        assert_eq!(OsFamily::Windows.platform_tag(), "win32");
        assert_eq!(OsFamily::Windows.classpath_separator(), ';');
    }

    #[test]
    fn posix_family_uses_sh_and_posix() {
        assert_eq!(OsFamily::Posix.script_extension(), ".sh");
        assert_eq!(OsFamily::Posix.platform_tag(), "posix");
        assert_eq!(OsFamily::Posix.classpath_separator(), ':');
    }

    #[test]
    fn classpath_normalizes_toward_windows() {
        assert_eq!(normalize_classpath("a:b", OsFamily::Windows), "a;b");
        assert_eq!(
            normalize_classpath("lib/a.jar:lib/b.jar", OsFamily::Windows),
            "lib\\a.jar;lib\\b.jar"
        );
    }

    #[test]
    fn classpath_normalizes_toward_posix() {
        assert_eq!(normalize_classpath("a;b", OsFamily::Posix), "a:b");
        assert_eq!(normalize_classpath("a:b", OsFamily::Posix), "a:b");
    }

    #[test]
    fn script_dir_is_under_tools_process() {
        let dir = process_script_dir(&PathBuf::from("/opt/rig"), OsFamily::Posix);
        assert_eq!(dir, PathBuf::from("/opt/rig/tools/process/posix"));
    }

    #[test]
    fn current_family_is_stable() {
        assert_eq!(OsFamily::current(), OsFamily::current());
    }
}
