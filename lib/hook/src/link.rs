//! Link-hook orchestrator (spec §4.6): what runs in place of the real
//! linker for the final binary link step.

use core::{BuildInfo, Error, PackageId, Result};
use std::path::Path;

fn strip_buildid(flags: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(flags.len());
    let mut iter = flags.iter().peekable();
    while let Some(f) = iter.next() {
        if f == "-buildid" {
            iter.next();
            continue;
        }
        if f.starts_with("-buildid=") {
            continue;
        }
        out.push(f.clone());
    }
    out
}

/// For each `-X pkg.name=value` flag, look up whether `pkg` obfuscated
/// `name` away. The real name is kept (a duplicate unmatched `-X` setting
/// is ignored by the linker, not an error) and a second flag targeting the
/// renamed symbol is appended whenever the lookup succeeds, so the link
/// succeeds whether or not the dependency was actually private.
fn obfuscated_x_flags(x_flags: &[(&str, &str)], build_info: &BuildInfo) -> Vec<String> {
    let mut extra = Vec::new();
    for (key, value) in x_flags {
        let (pkg, name) = match key.rsplit_once('.') {
            Some(parts) => parts,
            None => continue,
        };
        let record = match build_info.get(&PackageId::from(pkg)) {
            Some(r) => r,
            None => continue,
        };
        let renamed = match archive::read_name_map(&record.object_file) {
            Ok(Some(map)) => map.get(name).cloned(),
            _ => None,
        };
        if let Some(renamed) = renamed {
            if renamed != name {
                extra.push("-X".to_string());
                extra.push(format!("{}.{}={}", pkg, renamed, value));
            }
        }
    }
    extra
}

/// Run the link hook: `real_tool` is the real linker binary, `tool_args`
/// the argv the build orchestrator would have given it directly.
pub fn run(real_tool: &Path, tool_args: &[String]) -> Result<()> {
    if toolchain::is_version_probe(tool_args) {
        return toolchain::run(real_tool, tool_args);
    }

    let split = argv::split(tool_args, &argv::BoolFlags::linker())?;

    if split.files.len() != 1 {
        return Err(Error::internal(format!(
            "link hook: expected exactly one input object, got {}",
            split.files.len()
        )));
    }

    let importcfg_path = split
        .flag_value("-importcfg")
        .ok_or_else(|| Error::environment("link hook: missing -importcfg"))?;
    let build_info = importcfg::parse(Path::new(importcfg_path))?;

    let extra_x = obfuscated_x_flags(&split.x_flags(), &build_info);

    let mut new_flags = strip_buildid(&split.flags);
    if !split.has_flag("-s") {
        new_flags.push("-s".to_string());
    }
    if !split.has_flag("-w") {
        new_flags.push("-w".to_string());
    }
    new_flags.push("-buildid=".to_string());
    new_flags.extend(extra_x);

    let mut new_args = new_flags;
    new_args.extend(split.files.clone());

    toolchain::run(real_tool, &new_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_buildid_removes_flag_and_value() {
        let flags = vec![
            "-o".to_string(),
            "out".to_string(),
            "-buildid".to_string(),
            "abc123".to_string(),
            "-s".to_string(),
        ];
        let stripped = strip_buildid(&flags);
        assert_eq!(stripped, vec!["-o", "out", "-s"]);
    }

    #[test]
    fn strip_buildid_handles_equals_form() {
        let flags = vec!["-buildid=abc123".to_string(), "-w".to_string()];
        assert_eq!(strip_buildid(&flags), vec!["-w".to_string()]);
    }
}
