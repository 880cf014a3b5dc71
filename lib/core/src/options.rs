//! The shared options blob persisted by the driver and loaded by every
//! hook child (spec §3 "Build info", §5 "shared options blob", §6 flags).

use crate::ids::Seed;
use serde::{Deserialize, Serialize};

/// Which driver subcommand launched this build. Threaded through so the
/// compile hook can special-case test builds without re-deriving it from
/// argv deep in the call stack (SPEC_FULL §3, added).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildMode {
    Build,
    Test,
    ListOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    pub mode: BuildMode,
    pub literals: bool,
    pub tiny: bool,
    pub debugdir: Option<std::path::PathBuf>,
    pub seed: Option<Seed>,
    /// Comma-separated `path/glob` list (spec §6); `None` means "use the
    /// orchestrator's configured value, or the module-path default".
    pub private_pattern: Option<String>,
}

impl Options {
    pub fn new(mode: BuildMode) -> Self {
        Options {
            mode,
            literals: false,
            tiny: false,
            debugdir: None,
            seed: None,
            private_pattern: None,
        }
    }
}

/// Env var name the shared blob's path travels under between the parent
/// driver process and its hook children. This is a fixed wire constant
/// (spec glossary), not something a future rename should touch.
pub const SHARED_STATE_ENV: &str = "GARBLE_SHARED";
