//! `shroud reverse`: maps obfuscated identifiers in a stack trace (or any
//! other text containing them) back to the original names recorded in an
//! object archive's `shroud/names.json` member (spec §4.7).

use core::Error;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Longest-name-first so e.g. `_abc1` doesn't get partially matched and
/// left mangled by a shorter substring also present in the map.
fn ordered_by_length_desc(map: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = map.iter().map(|(k, v)| (v.as_str(), k.as_str())).collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    pairs
}

fn is_ident_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

/// Replace whole-identifier occurrences of `emitted` with `original`
/// throughout `text`, leaving any occurrence that is part of a larger
/// identifier untouched.
fn substitute_identifiers(text: &str, emitted_to_original: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    'outer: while i < chars.len() {
        for (emitted, original) in emitted_to_original {
            let candidate: String = chars[i..].iter().take(emitted.chars().count()).collect();
            if candidate == *emitted {
                let before = if i == 0 { None } else { Some(chars[i - 1]) };
                let after = chars.get(i + emitted.chars().count()).copied();
                if is_ident_boundary(before) && is_ident_boundary(after) {
                    out.push_str(original);
                    i += emitted.chars().count();
                    continue 'outer;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

pub fn run(archive_path: &str, input: Option<&str>) -> Result<(), Error> {
    let names = archive::read_name_map(Path::new(archive_path))?.ok_or_else(|| {
        Error::configuration(format!(
            "{}: no name map recorded; was this built with shroud?",
            archive_path
        ))
    })?;
    let pairs = ordered_by_length_desc(&names);

    let text = match input {
        Some(literal) => literal.to_string(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| Error::environment(format!("reading stdin: {}", e)))?;
            buf
        }
    };

    println!("{}", substitute_identifiers(&text, &pairs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_whole_identifiers_only() {
        let mut names = HashMap::new();
        names.insert("Foo".to_string(), "_a1b2".to_string());
        let pairs = ordered_by_length_desc(&names);

        let out = substitute_identifiers("panic: _a1b2 called with _a1b2x", &pairs);
        assert_eq!(out, "panic: Foo called with _a1b2x");
    }

    #[test]
    fn prefers_longest_match_first() {
        let mut names = HashMap::new();
        names.insert("Foo".to_string(), "_a1".to_string());
        names.insert("FooBar".to_string(), "_a1b2".to_string());
        let pairs = ordered_by_length_desc(&names);

        let out = substitute_identifiers("_a1b2", &pairs);
        assert_eq!(out, "FooBar");
    }

    #[test]
    fn leaves_unrelated_text_alone() {
        let names = HashMap::new();
        let pairs = ordered_by_length_desc(&names);
        let out = substitute_identifiers("goroutine 1 [running]:", &pairs);
        assert_eq!(out, "goroutine 1 [running]:");
    }
}
