//! Splits a tool invocation's argv into flags and positional file/package
//! arguments (spec §2 "Flag/arg splitter", §9 Open Questions — "boolean-valued
//! flag recognition").
//!
//! The real compiler and linker accept a mix of `-flag value`, `-flag=value`
//! and bare boolean flags (`-trimpath`, `-std`) with no principled way to
//! tell them apart from the flag name alone. Spec.md's source handles this
//! with an ad-hoc scan at each call site; SPEC_FULL's Open Questions calls
//! for a single shared table instead, which is what `BoolFlags` is.

use core::{Error, Result};

/// Flags that never take a following positional value. Anything not listed
/// here and not containing `=` is assumed to consume the next argv entry as
/// its value, matching how the real compiler's flag parser behaves.
#[derive(Debug, Clone, Default)]
pub struct BoolFlags {
    names: std::collections::HashSet<&'static str>,
}

impl BoolFlags {
    pub fn new(names: &[&'static str]) -> Self {
        BoolFlags {
            names: names.iter().copied().collect(),
        }
    }

    /// The table used for compiler (`compile`) invocations.
    pub fn compiler() -> Self {
        BoolFlags::new(&[
            "-std",
            "-trimpath",
            "-shared",
            "-dynlink",
            "-nolocalimports",
            "-race",
            "-msan",
            "-asan",
            "-complete",
        ])
    }

    /// The table used for linker (`link`) invocations.
    pub fn linker() -> Self {
        BoolFlags::new(&["-s", "-w", "-linkshared", "-compressdwarf"])
    }

    pub fn is_bool(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Split {
    pub flags: Vec<String>,
    pub files: Vec<String>,
}

impl Split {
    /// Look up a single-valued flag's value, e.g. `-p`, `-importcfg`,
    /// `-buildid`. Handles both `-flag value` and `-flag=value` spellings.
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        let eq_prefix = format!("{}=", name);
        let mut iter = self.flags.iter();
        while let Some(f) = iter.next() {
            if let Some(v) = f.strip_prefix(&eq_prefix) {
                return Some(v);
            }
            if f == name {
                return iter.next().map(|s| s.as_str());
            }
        }
        None
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name || f.starts_with(&format!("{}=", name)))
    }

    /// All `-X pkg.name=value` injection flags (link-hook, spec §4.6).
    pub fn x_flags(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        let mut iter = self.flags.iter().peekable();
        while let Some(f) = iter.next() {
            if f == "-X" {
                if let Some(v) = iter.next() {
                    if let Some((k, v)) = v.split_once('=') {
                        out.push((k, v));
                    }
                }
            } else if let Some(v) = f.strip_prefix("-X=") {
                if let Some((k, v)) = v.split_once('=') {
                    out.push((k, v));
                }
            }
        }
        out
    }
}

/// Separate `args` into flags and positional file/package arguments, per
/// spec §4.5 step 1 / §4.6 step 1.
pub fn split(args: &[String], bool_flags: &BoolFlags) -> Result<Split> {
    let mut out = Split::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if !arg.starts_with('-') {
            out.files.push(arg.clone());
            continue;
        }

        out.flags.push(arg.clone());

        if arg.contains('=') {
            continue;
        }

        if arg == "-X" {
            // -X always takes a following `pkg.name=value` value.
            match iter.next() {
                Some(v) => out.flags.push(v.clone()),
                None => {
                    return Err(Error::environment(format!("flag {} missing value", arg)))
                }
            }
            continue;
        }

        if bool_flags.is_bool(arg) {
            continue;
        }

        if let Some(next) = iter.peek() {
            if !next.starts_with('-') {
                out.flags.push(iter.next().unwrap().clone());
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_flag_value_pairs_and_files() {
        let args: Vec<String> = vec![
            "-p", "test/main", "-trimpath", "-importcfg", "/tmp/importcfg", "a.go", "b.go",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let split = split(&args, &BoolFlags::compiler()).unwrap();
        assert_eq!(split.flag_value("-p"), Some("test/main"));
        assert_eq!(split.flag_value("-importcfg"), Some("/tmp/importcfg"));
        assert!(split.has_flag("-trimpath"));
        assert_eq!(split.files, vec!["a.go".to_string(), "b.go".to_string()]);
    }

    #[test]
    fn collects_x_flags() {
        let args: Vec<String> = vec!["-X", "main.version=1.2.3", "-X", "main.dirty=true"]
            .into_iter()
            .map(String::from)
            .collect();
        let split = split(&args, &BoolFlags::linker()).unwrap();
        assert_eq!(
            split.x_flags(),
            vec![("main.version", "1.2.3"), ("main.dirty", "true")]
        );
    }

    #[test]
    fn equals_form_flag_value() {
        let args: Vec<String> = vec!["-p=test/main", "x.go"]
            .into_iter()
            .map(String::from)
            .collect();
        let split = split(&args, &BoolFlags::compiler()).unwrap();
        assert_eq!(split.flag_value("-p"), Some("test/main"));
    }
}
