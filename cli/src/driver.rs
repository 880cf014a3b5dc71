//! The driver side of `shroud`: resolves command-line options into an
//! `Options` blob, then re-execs the Go toolchain with itself wired in as
//! `-toolexec` so every compile and link step gets routed back through
//! this binary's hook mode (spec §4.5/§4.6 entry point, §6 flags).

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use core::{BuildMode, Error, Options, Seed};
use std::process::Command;

fn shared_flags<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("literals")
            .long("literals")
            .help("obfuscate literal values referenced from the rewritten source"),
        Arg::with_name("tiny")
            .long("tiny")
            .help("strip additional information to further shrink the binary"),
        Arg::with_name("debugdir")
            .long("debugdir")
            .takes_value(true)
            .value_name("DIR")
            .help("write the unobfuscated source tree actually compiled to DIR"),
        Arg::with_name("seed")
            .long("seed")
            .takes_value(true)
            .value_name("SEED|random")
            .help("base64 seed mixed into every package's renaming key"),
        Arg::with_name("pattern")
            .long("private-pattern")
            .takes_value(true)
            .value_name("PATTERN")
            .help("comma-separated import-path globs subject to obfuscation"),
        Arg::with_name("patterns")
            .help("packages to build, in the build orchestrator's own syntax")
            .multiple(true),
    ]
}

fn app() -> App<'static, 'static> {
    App::new("shroud")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Obfuscates Go source and symbols as part of a normal build.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("builds the given packages, obfuscated")
                .args(&shared_flags()),
        )
        .subcommand(
            SubCommand::with_name("test")
                .about("tests the given packages with obfuscation enabled")
                .args(&shared_flags()),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("runs `go list`, resolving packages the same way build/test would")
                .args(&shared_flags()),
        )
        .subcommand(
            SubCommand::with_name("reverse")
                .about("maps obfuscated names in a build output back to their originals")
                .arg(
                    Arg::with_name("archive")
                        .help("object archive produced by a previous obfuscated build")
                        .required(true),
                )
                .arg(Arg::with_name("input").help("text to de-obfuscate; reads stdin if omitted")),
        )
        .subcommand(SubCommand::with_name("version").about("prints the shroud version"))
}

fn options_from_matches(mode: BuildMode, matches: &ArgMatches) -> Result<Options, Error> {
    let mut options = Options::new(mode);
    options.literals = matches.is_present("literals");
    options.tiny = matches.is_present("tiny");
    options.debugdir = matches.value_of("debugdir").map(Into::into);
    options.private_pattern = matches.value_of("pattern").map(str::to_string);
    options.seed = match matches.value_of("seed") {
        None => None,
        Some("random") => {
            let seed = Seed::random();
            eprintln!("shroud: using -seed={}", seed.display());
            Some(seed)
        }
        Some(value) => Some(Seed::parse(value)?),
    };
    Ok(options)
}

fn patterns(matches: &ArgMatches) -> Vec<String> {
    matches
        .values_of("patterns")
        .map(|v| v.map(str::to_string).collect())
        .unwrap_or_default()
}

/// Re-exec `go <subcommand> -trimpath -toolexec=<self> <patterns...>`, with
/// the shared options blob exported so every hook invocation this spawns
/// can read it back (spec §5).
fn run_go(go_subcommand: &str, options: &Options, patterns: &[String]) -> Result<i32, Error> {
    let blob = shared::write(options)?;
    let (env_name, env_value) = shared::env_var(&blob);

    let self_exe = std::env::current_exe()
        .map_err(|e| Error::environment(format!("resolving shroud's own path: {}", e)))?;

    let mut cmd = Command::new("go");
    cmd.arg(go_subcommand)
        .arg("-trimpath")
        .arg(format!("-toolexec={}", self_exe.display()));
    if options.mode == BuildMode::Test {
        // spec §6: test builds skip `go vet` the way `go test` itself would
        // invoke it separately from the compile step this hook intercepts.
        cmd.arg("-vet=off");
    }
    cmd.args(patterns).env(env_name, env_value);

    log::debug!("{:?}", cmd);
    let status = cmd
        .status()
        .map_err(|e| Error::environment(format!("running go: {}", e)))?;
    Ok(status.code().unwrap_or(1))
}

pub fn run(args: &[String]) -> Result<i32, Error> {
    let matches = app().get_matches_from_safe(args).map_err(|e| {
        // clap already printed usage to stderr/stdout for us.
        print!("{}", e);
        Error::Configuration(String::new())
    })?;

    match matches.subcommand() {
        ("build", Some(m)) => {
            let options = options_from_matches(BuildMode::Build, m)?;
            run_go("build", &options, &patterns(m))
        }
        ("test", Some(m)) => {
            let options = options_from_matches(BuildMode::Test, m)?;
            run_go("test", &options, &patterns(m))
        }
        ("list", Some(m)) => {
            let options = options_from_matches(BuildMode::ListOnly, m)?;
            run_go("list", &options, &patterns(m))
        }
        ("reverse", Some(m)) => {
            let archive_path = m.value_of("archive").expect("required arg");
            let input = m.value_of("input");
            crate::reverse::run(archive_path, input)?;
            Ok(0)
        }
        ("version", Some(_)) => {
            println!("shroud {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        _ => Ok(1),
    }
}
