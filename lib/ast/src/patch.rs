//! Applies a set of span replacements to source text (spec §4.4 "Final
//! step: Replace the identifier's name in place").

use crate::pos::Span;

/// Apply non-overlapping `(span, replacement)` edits to `source`, returning
/// the patched text. Edits may be given in any order; overlapping edits are
/// a caller bug and panic rather than silently picking one.
pub fn apply(source: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by_key(|(span, _)| span.start);
    for pair in edits.windows(2) {
        assert!(
            pair[0].0.end <= pair[1].0.start,
            "overlapping rewrite spans {:?} and {:?}",
            pair[0].0,
            pair[1].0
        );
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        out.push_str(&source[cursor..span.start]);
        out.push_str(&replacement);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// A `//line` directive pointing subsequent diagnostics at `path` from line
/// 1 (spec §4.5 step 11). Prepended to the rewritten file before it is
/// handed to the real compiler, so obfuscated temp paths don't leak into
/// error messages.
pub fn line_directive(path: &str) -> String {
    format!("//line {}:1:1\n", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_in_place() {
        let src = "func Foo() { return Bar() }";
        let edits = vec![
            (Span::new(5, 8), "Zzz".to_string()),
            (Span::new(20, 23), "Www".to_string()),
        ];
        assert_eq!(apply(src, edits), "func Zzz() { return Www() }");
    }

    #[test]
    #[should_panic(expected = "overlapping")]
    fn rejects_overlap() {
        let src = "abcdef";
        apply(
            src,
            vec![
                (Span::new(0, 3), "x".into()),
                (Span::new(2, 4), "y".into()),
            ],
        );
    }
}
