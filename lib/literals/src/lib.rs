//! Literal-obfuscation primitives are an external collaborator (spec §1
//! "Deliberately out of scope"). This crate holds only the seam: a trait
//! the compile hook calls through when `-literals` is set, plus the
//! default no-op implementation used when it isn't.
//!
//! Per spec §4.3 ("Constant-literal scan"), whatever the collaborator does
//! may additionally require names to stay stable; it reports those back as
//! `keep_names` so the ignore-set scanner can fold them in.

use ast::File;
use core::Result;

pub struct Outcome {
    /// Names that must not be renamed because the literal transform
    /// emitted references to them by name.
    pub keep_names: Vec<String>,
}

pub trait Obfuscator {
    fn obfuscate(&self, file: &File, seed: &[u8]) -> Result<Outcome>;
}

/// Used whenever `-literals` is not set, or as the seam's default: changes
/// nothing, keeps nothing.
pub struct NoopObfuscator;

impl Obfuscator for NoopObfuscator {
    fn obfuscate(&self, _file: &File, _seed: &[u8]) -> Result<Outcome> {
        Ok(Outcome {
            keep_names: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_keeps_nothing() {
        let file = ast::parser::parse("x.go", "package p;\n").unwrap();
        let out = NoopObfuscator.obfuscate(&file, b"seed").unwrap();
        assert!(out.keep_names.is_empty());
    }
}
