//! The error taxonomy shared by every shroud crate.
//!
//! Mirrors the distinction the engine has to make at the process boundary:
//! an environment problem the user can fix, a configuration problem that is
//! reported with a stable greppable message, an internal invariant that
//! indicates a bug in shroud itself, and a propagated exit status from a
//! tool we merely wrapped.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or too-old toolchain, missing `-trimpath`, missing
    /// `-importcfg`, missing `-buildid`. Fatal for the current hook.
    #[error("{0}")]
    Environment(String),

    /// An invariant that the engine believes can never fail did. Indicates
    /// a bug; always process-fatal.
    #[error("internal error: {0}")]
    Internal(String),

    /// A user-facing, stable, greppable configuration error (private
    /// pattern matches nothing, public-depends-on-private).
    #[error("{0}")]
    Configuration(String),

    /// The real compiler/linker/list subprocess exited non-zero. No
    /// additional message: whatever it printed is the whole story.
    #[error("tool exited with status {status}")]
    Tool { status: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The process exit code this error should surface as, per §6/§7.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Tool { status } => *status,
            _ => 1,
        }
    }

    /// Whether the caller should print `self` to stderr before exiting.
    /// Tool errors never get extra output: the wrapped tool already spoke.
    pub fn should_report(&self) -> bool {
        !matches!(self, Error::Tool { .. })
    }

    pub fn internal<M: fmt::Display>(msg: M) -> Error {
        Error::Internal(msg.to_string())
    }

    pub fn environment<M: fmt::Display>(msg: M) -> Error {
        Error::Environment(msg.to_string())
    }

    pub fn configuration<M: fmt::Display>(msg: M) -> Error {
        Error::Configuration(msg.to_string())
    }
}
