//! Deterministic identifier renaming (spec §4.2).
//!
//! `hash(key, name)` must be: deterministic across machines, collision
//! resistant within a package for differing names, a syntactically valid
//! identifier in the target language, and not shorter than a small minimum
//! so it can't accidentally shadow a short reserved name.

use core::{ActionId, Seed};

/// Hex digits are valid identifier characters but may start with a digit,
/// which most languages (including "the language" this spec targets)
/// disallow for identifiers. Every hashed name is prefixed with this to
/// guarantee a legal leading character.
const IDENT_PREFIX: char = '_';

/// Truncate the digest to this many bytes (32 hex characters) before
/// encoding: short enough to keep generated sources readable, long enough
/// that accidental collisions across a package's identifier set are not a
/// practical concern for a cryptographic-grade digest.
const DIGEST_BYTES: usize = 16;

/// Below this length we keep the full untruncated digest instead, so the
/// "not shorter than a minimum" invariant holds even in degenerate cases.
const MIN_LEN: usize = 1 + DIGEST_BYTES * 2;

/// Build the key material for a package: its action id, optionally mixed
/// uniformly with the global seed (spec §3 "If seed is provided, the
/// hashing function mixes seed into the action_id uniformly").
pub fn package_key(action_id: &ActionId, seed: Option<&Seed>) -> Vec<u8> {
    match seed {
        None => action_id.as_bytes().to_vec(),
        Some(seed) => {
            let mut ctx = ring::digest::Context::new(&ring::digest::SHA256);
            ctx.update(&seed.0);
            ctx.update(action_id.as_bytes());
            ctx.finish().as_ref().to_vec()
        }
    }
}

/// Deterministically rename `name` under `key`. The same `(key, name)` pair
/// always produces the same output, which is what lets a later package find
/// a field renamed by an earlier one (spec §4.2).
pub fn hash(key: &[u8], name: &str) -> String {
    let mut ctx = ring::digest::Context::new(&ring::digest::SHA256);
    ctx.update(key);
    ctx.update(&[0u8]); // separator: guards against key/name concatenation ambiguity
    ctx.update(name.as_bytes());
    let digest = ctx.finish();
    let bytes = &digest.as_ref()[..DIGEST_BYTES];

    let mut out = String::with_capacity(MIN_LEN);
    out.push(IDENT_PREFIX);
    out.push_str(&hex::encode(bytes));
    debug_assert!(out.len() >= MIN_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let key = b"action-id-bytes".to_vec();
        assert_eq!(hash(&key, "Foo"), hash(&key, "Foo"));
    }

    #[test]
    fn differing_names_do_not_collide() {
        let key = b"action-id-bytes".to_vec();
        assert_ne!(hash(&key, "Foo"), hash(&key, "Bar"));
    }

    #[test]
    fn differing_keys_do_not_collide_for_same_name() {
        assert_ne!(hash(b"key-a", "Foo"), hash(b"key-b", "Foo"));
    }

    #[test]
    fn output_is_a_valid_identifier() {
        let out = hash(b"key", "Foo");
        let mut chars = out.chars();
        let first = chars.next().unwrap();
        assert!(first == '_' || first.is_ascii_alphabetic());
        assert!(chars.all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(out.len() >= MIN_LEN);
    }

    #[test]
    fn seed_changes_the_key() {
        let action = ActionId(b"abc".to_vec());
        let unseeded = package_key(&action, None);
        let seed = Seed([7u8; 32]);
        let seeded = package_key(&action, Some(&seed));
        assert_ne!(unseeded, seeded);
        // deterministic for the same seed
        assert_eq!(seeded, package_key(&action, Some(&seed)));
    }
}
