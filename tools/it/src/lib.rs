//! End-to-end scenarios for the obfuscation pipeline, exercised in-process
//! against the engine crates rather than a real `go build` (no toolchain is
//! available in this harness). See `tests/` for the scenarios themselves.
