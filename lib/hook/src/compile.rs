//! Compile-hook orchestrator (spec §4.5): what runs in place of the real
//! per-package compiler.

use ast::{patch, File as AstFile};
use core::{ActionId, Error, PackageId, Result};
use literals::NoopObfuscator;
use std::fs;
use std::path::{Path, PathBuf};

fn is_go_source(path: &str) -> bool {
    path.ends_with(".go")
}

/// Run the compile hook: `real_tool` is the real compiler binary the build
/// orchestrator would otherwise have invoked directly; `tool_args` is the
/// argv it was going to pass it.
pub fn run(real_tool: &Path, tool_args: &[String]) -> Result<()> {
    if toolchain::is_version_probe(tool_args) {
        return toolchain::run(real_tool, tool_args);
    }

    let split = argv::split(tool_args, &argv::BoolFlags::compiler())?;

    let pkg_path_str = split
        .flag_value("-p")
        .ok_or_else(|| Error::internal("compile hook: missing -p flag"))?;
    let pkg_path = PackageId::from(pkg_path_str);

    let options = shared::read_from_env()?;
    let pattern = options
        .private_pattern
        .clone()
        .unwrap_or_else(|| "...".to_string());

    let go_files: Vec<String> = split
        .files
        .iter()
        .filter(|f| is_go_source(f))
        .cloned()
        .collect();

    let private = privacy::is_private(pkg_path.as_str(), &pattern)?;
    if !private || go_files.is_empty() {
        log::debug!("{}: not obfuscating, forwarding unchanged", pkg_path);
        return toolchain::run(real_tool, tool_args);
    }

    if !split.has_flag("-trimpath") {
        return Err(Error::environment(
            "shroud requires the build to be invoked with -trimpath",
        ));
    }
    let buildid = split
        .flag_value("-buildid")
        .ok_or_else(|| Error::environment("compile hook: missing -buildid"))?;
    let action_id = ActionId::parse(buildid)?;

    let importcfg_path = split
        .flag_value("-importcfg")
        .ok_or_else(|| Error::environment("compile hook: missing -importcfg"))?;
    let _build_info = importcfg::parse(Path::new(importcfg_path))?;

    let mut files: Vec<AstFile> = Vec::with_capacity(go_files.len());
    for path in &go_files {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::environment(format!("reading {}: {}", path, e)))?;
        files.push(ast::parser::parse(path, &source)?);
    }

    let key = hash::package_key(&action_id, options.seed.as_ref());
    let obfuscator = NoopObfuscator;
    let ignore = scan::scan_package(&files, &obfuscator, &key)?;

    let result = rewrite::rewrite_package(
        &files,
        &pkg_path,
        &action_id,
        options.seed.as_ref(),
        &pattern,
        &ignore,
    )?;

    let scratch = toolchain::scratch_dir()?;
    let mut new_files = Vec::with_capacity(result.files.len());
    for (original_path, rewritten_source) in &result.files {
        let scratch_path = scratch_file_path(scratch.path(), original_path);
        if let Some(parent) = scratch_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let with_line_directive = format!("{}{}", patch::line_directive(original_path), rewritten_source);
        fs::write(&scratch_path, with_line_directive)?;
        new_files.push(scratch_path.display().to_string());
    }

    let mut new_args = split.flags.clone();
    new_args.extend(new_files);

    toolchain::run(real_tool, &new_args)?;

    let object_file = split
        .flag_value("-o")
        .ok_or_else(|| Error::internal("compile hook: missing -o"))?;
    archive::append_debug_src(Path::new(object_file), &result.files)?;
    archive::write_name_map(Path::new(object_file), &result.emitted)?;

    Ok(())
}

/// Put a rewritten file under `scratch`, mirroring its original filename
/// (not its full path) so two packages' scratch trees never collide and
/// the obfuscated path never leaks the module's real directory layout.
fn scratch_file_path(scratch: &Path, original_path: &str) -> PathBuf {
    let name = Path::new(original_path)
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_else(|| original_path.into());
    scratch.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_paths_use_bare_filenames() {
        let scratch = Path::new("/tmp/shroud-abc");
        let p = scratch_file_path(scratch, "/home/user/module/pkg/file.go");
        assert_eq!(p, Path::new("/tmp/shroud-abc/file.go"));
    }
}
