//! Shared data model and error taxonomy for the shroud obfuscation engine.
//!
//! Every other shroud crate depends on this one for `Error`/`Result`,
//! package identity, and the process-scoped build graph view. Nothing here
//! knows how to parse source or run a subprocess; it is pure data.

pub mod build_info;
pub mod errors;
pub mod ids;
pub mod options;

pub use build_info::{BuildInfo, PackageRecord};
pub use errors::{Error, Result};
pub use ids::{ActionId, PackageId, Seed};
pub use options::{BuildMode, Options, SHARED_STATE_ENV};
