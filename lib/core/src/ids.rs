//! Small newtypes for the keying material described in spec §3.

use crate::errors::{Error, Result};
use std::fmt;

/// The canonical import path the build orchestrator uses to name a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct PackageId(pub String);

impl PackageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        PackageId(s.to_owned())
    }
}

impl From<String> for PackageId {
    fn from(s: String) -> Self {
        PackageId(s)
    }
}

/// Opaque digest extracted from a compiled object's embedded build id.
/// Uniquely identifies "this exact compilation" and is the keying material
/// for renaming (spec §3, §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ActionId(pub Vec<u8>);

impl ActionId {
    /// Build ids as emitted by the toolchain are `/`-joined base64 segments;
    /// we only need the first (content) segment as keying material.
    pub fn parse(build_id: &str) -> Result<ActionId> {
        let first = build_id
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::internal("empty build id"))?;
        let bytes = base64::decode_config(first, base64::URL_SAFE_NO_PAD)
            .map_err(|e| Error::internal(format!("malformed build id: {}", e)))?;
        Ok(ActionId(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// The optional global seed from `-seed`. When present it is mixed
/// uniformly into every package's action id before hashing (spec §3, §4.2).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Seed(pub [u8; 32]);

impl Seed {
    pub fn parse(value: &str) -> Result<Seed> {
        let bytes = base64::decode(value)
            .map_err(|e| Error::configuration(format!("invalid -seed value: {}", e)))?;
        let digest = ring::digest::digest(&ring::digest::SHA256, &bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(digest.as_ref());
        Ok(Seed(out))
    }

    /// Draw a fresh seed from the system RNG for `-seed=random`. The caller
    /// is responsible for echoing `display()` to stderr on error so the
    /// build stays reproducible (spec §7).
    pub fn random() -> Seed {
        use rand::RngCore;
        let mut out = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut out);
        Seed(out)
    }

    pub fn display(&self) -> String {
        base64::encode(&self.0)
    }
}
