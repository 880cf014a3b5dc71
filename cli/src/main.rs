//! `shroud`: a single binary with two personalities (spec §2 glossary
//! "Hook mode / driver mode").
//!
//! Run directly (`shroud build ./...`), it is the *driver*: it resolves
//! options, stashes them in the shared blob, and re-invokes the build
//! orchestrator with itself wired in as `-toolexec`. Re-invoked *by* that
//! orchestrator in place of the real compiler or linker, it is a *hook*:
//! `argv[1]` is the real tool's path and the rest is that tool's own argv.
//!
//! The two are told apart by `GARBLE_SHARED`: the driver sets it right
//! before it execs the orchestrator, so any re-entry of this binary that
//! finds it already set is necessarily a hook invocation, never a fresh
//! top-level one.

mod driver;
mod reverse;

use core::{Error, SHARED_STATE_ENV};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            if err.should_report() {
                eprintln!("shroud: {}", err);
            }
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(args: &[String]) -> Result<i32, Error> {
    if std::env::var(SHARED_STATE_ENV).is_ok() && args.len() >= 2 {
        run_hook(args)?;
        return Ok(0);
    }

    driver::run(args)
}

/// `args[1]` is the real tool binary the orchestrator would otherwise have
/// invoked; `args[2..]` is that tool's own argv (spec §4.5 step 1 / §4.6
/// step 1). Everything that isn't recognisably a `compile` or `link`
/// invocation is handed to the real tool unchanged — `asm`, `vet`, and
/// whatever else the toolchain's build graph happens to toolexec.
fn run_hook(args: &[String]) -> Result<(), Error> {
    let real_tool = PathBuf::from(&args[1]);
    let tool_args = &args[2..];

    let name = real_tool
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.contains("compile") {
        hook::compile::run(&real_tool, tool_args)
    } else if name.contains("link") {
        hook::link::run(&real_tool, tool_args)
    } else {
        toolchain::run(&real_tool, tool_args)
    }
}
