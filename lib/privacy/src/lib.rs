//! Privacy predicate (spec §4.1): decide whether a package import path is
//! subject to obfuscation. Rules are evaluated in order, first match wins.

use core::{Error, Result};

/// Packages the runtime imports or reaches via linkname directives. These
/// are never obfuscated regardless of the private pattern (spec §1
/// Non-goals, §4.1 rule 3, glossary "Runtime-related set").
const RUNTIME_RELATED: &[&str] = &[
    "runtime",
    "reflect",
    "syscall",
    "unsafe",
    "internal/abi",
    "internal/bytealg",
    "internal/cpu",
    "internal/runtime",
];

fn is_runtime_related(path: &str) -> bool {
    RUNTIME_RELATED
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

fn is_synthetic_test_package(path: &str) -> bool {
    path.ends_with(".test") || path.ends_with(".test]")
}

/// A minimal module-path validity check: non-empty, no leading/trailing
/// slash, no empty segments, no control characters. Failing this indicates
/// corruption in our own internal bookkeeping, not a user error (spec §4.1
/// rule 2, §7 "Corruption errors").
pub fn validate_module_path(path: &str) -> Result<()> {
    if path.is_empty() || path.starts_with('/') || path.ends_with('/') {
        return Err(Error::internal(format!("invalid module path {:?}", path)));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == ".." ) {
        return Err(Error::internal(format!("invalid module path {:?}", path)));
    }
    if path.chars().any(|c| c.is_control()) {
        return Err(Error::internal(format!("invalid module path {:?}", path)));
    }
    Ok(())
}

/// A single `path/glob` entry from the private-packages pattern. Only the
/// `...` wildcard suffix the pattern language supports (spec §6) is
/// implemented: `foo/...` matches `foo` and everything nested under it;
/// anything else is an exact match.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("/...") {
        Some(prefix) => path == prefix || path.starts_with(&format!("{}/", prefix)),
        None => pattern == "..." || pattern == path,
    }
}

/// Does `path` match any entry of the comma-separated private-packages
/// pattern?
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    pattern
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .any(|p| pattern_matches(p, path))
}

/// The full privacy predicate, spec §4.1, rules 1-5 in order.
pub fn is_private(path: &str, pattern: &str) -> Result<bool> {
    if is_synthetic_test_package(path) {
        return Ok(false);
    }

    validate_module_path(path)?;

    if is_runtime_related(path) {
        return Ok(false);
    }

    if path == "main" || path == "command-line-arguments" || path.starts_with("plugin/unnamed") {
        return Ok(true);
    }

    Ok(matches_pattern(pattern, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_test_packages_are_never_private() {
        assert_eq!(is_private("test/main.test", "...").unwrap(), false);
        assert_eq!(is_private("test/main.test]", "...").unwrap(), false);
    }

    #[test]
    fn runtime_related_is_never_private() {
        assert_eq!(is_private("runtime", "...").unwrap(), false);
        assert_eq!(is_private("runtime/internal/sys", "...").unwrap(), false);
        assert_eq!(is_private("reflect", "...").unwrap(), false);
    }

    #[test]
    fn main_and_command_line_args_are_always_private() {
        assert_eq!(is_private("main", "").unwrap(), true);
        assert_eq!(is_private("command-line-arguments", "").unwrap(), true);
        assert_eq!(is_private("plugin/unnamed-1234", "").unwrap(), true);
    }

    #[test]
    fn pattern_dots_matches_subpackages() {
        assert!(matches_pattern("test/main/...", "test/main/imported"));
        assert!(matches_pattern("test/main/...", "test/main"));
        assert!(!matches_pattern("test/main/...", "test/other"));
    }

    #[test]
    fn exact_pattern_does_not_match_substring() {
        assert!(!matches_pattern("test/main", "test/main/imported"));
        assert!(matches_pattern("test/main", "test/main"));
    }

    #[test]
    fn invalid_module_path_is_internal_error() {
        let err = is_private("/leading/slash", "...").unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn universal_pattern_matches_everything() {
        assert!(matches_pattern("...", "fmt"));
        assert!(matches_pattern("...", "a/b/c"));
    }
}
