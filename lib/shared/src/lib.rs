//! The shared options blob (spec §3, §5): the driver marshals the
//! resolved `Options` to a temp file once per build and exports its path
//! under `GARBLE_SHARED`; every hook child it spawns reads the same file
//! back rather than re-parsing driver flags itself.

use core::{Error, Options, Result, SHARED_STATE_ENV};
use std::path::{Path, PathBuf};

/// Write `options` to a fresh temp file and return it. The caller is
/// responsible for exporting its path (via `env_var`) into the
/// environment of every process it spawns, and for keeping the returned
/// `NamedTempFile` alive for the build's duration — dropping it deletes
/// the file.
pub fn write(options: &Options) -> Result<tempfile::NamedTempFile> {
    let file = tempfile::Builder::new().prefix("shroud-shared-").tempfile()?;
    serde_json::to_writer(&file, options)?;
    Ok(file)
}

/// The `(name, value)` pair to set in a child process's environment so it
/// can find the blob `write` produced.
pub fn env_var(file: &tempfile::NamedTempFile) -> (&'static str, String) {
    (SHARED_STATE_ENV, file.path().display().to_string())
}

/// Locate the shared blob from this process's own environment (called by
/// a hook child, never by the driver that wrote it).
pub fn path_from_env() -> Result<PathBuf> {
    std::env::var(SHARED_STATE_ENV)
        .map(PathBuf::from)
        .map_err(|_| Error::environment(format!("{} not set; not invoked as a shroud hook", SHARED_STATE_ENV)))
}

pub fn read(path: &Path) -> Result<Options> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Convenience for hook entry points: resolve the env var and read the
/// blob in one call.
pub fn read_from_env() -> Result<Options> {
    read(&path_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::BuildMode;

    #[test]
    fn round_trips_through_a_file() {
        let mut opts = Options::new(BuildMode::Build);
        opts.literals = true;
        opts.tiny = true;
        opts.private_pattern = Some("example.com/...".to_string());

        let file = write(&opts).unwrap();
        let read_back = read(file.path()).unwrap();
        assert_eq!(read_back.literals, true);
        assert_eq!(read_back.tiny, true);
        assert_eq!(read_back.private_pattern.as_deref(), Some("example.com/..."));
    }

    #[test]
    fn env_var_name_is_the_stable_wire_constant() {
        let opts = Options::new(BuildMode::Test);
        let file = write(&opts).unwrap();
        let (name, _value) = env_var(&file);
        assert_eq!(name, "GARBLE_SHARED");
    }

    #[test]
    fn missing_env_var_is_an_environment_error() {
        std::env::remove_var(SHARED_STATE_ENV);
        let err = path_from_env().unwrap_err();
        assert!(matches!(err, Error::Environment(_)));
    }
}
