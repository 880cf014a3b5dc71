//! Ignore-set scanner (spec §4.3): walk the ASTs of every file in a package
//! and accumulate names the rewriter must leave alone because something the
//! rewriter cannot see — the `reflect` package, a linkname directive, a
//! collaborator literal transform — depends on them by their original
//! spelling.
//!
//! Three independent sub-scans feed one set: reflection, linkname, and
//! constant-literal (delegated to `shroud-literals`). None of them rename
//! anything; they only decide what the rewriter in `shroud-rewrite` must
//! leave untouched.

use ast::token::{Lexer, Token};
use ast::{Decl, File};
use core::Result;
use literals::Obfuscator;
use std::collections::HashSet;

/// Names a package must keep spelled exactly as written.
#[derive(Debug, Default, Clone)]
pub struct IgnoreSet {
    names: HashSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        IgnoreSet::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = String>) {
        self.names.extend(other);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }
}

/// The base name of a field's declared type: strips a leading pointer `*`
/// and any package qualifier (`pkg.Name` -> `Name`), since that is the name
/// `reflect` surfaces as the promoted field/type name (spec §4.4 "Embedded
/// struct field").
fn type_base_name(type_text: &str) -> &str {
    let t = type_text.trim().trim_start_matches('*');
    t.rsplit('.').next().unwrap_or(t)
}

/// Every name that must remain stable because a struct of this name may be
/// inspected through `reflect.TypeOf`/`reflect.ValueOf`: the type itself,
/// each of its named fields, and the base name of each embedded field.
fn names_of_reflected_type(file: &File, type_name: &str) -> Vec<String> {
    let mut out = Vec::new();
    for decl in &file.decls {
        if let Decl::Type(t) = decl {
            if t.name.name != type_name {
                continue;
            }
            out.push(t.name.name.clone());
            if let Some(st) = &t.struct_type {
                for field in &st.fields {
                    if field.embedded {
                        out.push(type_base_name(&field.type_text).to_string());
                    } else {
                        out.extend(field.names.iter().map(|id| id.name.clone()));
                    }
                }
            }
        }
    }
    out
}

/// Find the statically-named type operand of a `reflect.TypeOf(...)` /
/// `reflect.ValueOf(...)` call, when the argument is shaped like a
/// composite literal (`T{...}`) or a typed nil pointer (`(*T)(nil)`).
///
/// This is a narrower approximation of "compute the static type of the
/// call's argument" than a real type-checker would give: those are the two
/// shapes reflection-driven code actually uses to name a type it owns, and
/// covering the general case would need local type inference this crate's
/// AST does not model (see `ast` module docs).
fn reflected_type_names_in_body(source: &str, span: ast::Span) -> Vec<String> {
    let text = span.text(source);
    let toks: Vec<_> = Lexer::new(text)
        .tokenize()
        .into_iter()
        .filter(|t| !matches!(t.value, Token::Comment(_)))
        .collect();

    let mut found = Vec::new();
    let mut i = 0;
    while i + 3 < toks.len() {
        let is_reflect_call = matches!(&toks[i].value, Token::Ident(n) if n == "reflect")
            && matches!(toks[i + 1].value, Token::Dot)
            && matches!(&toks[i + 2].value, Token::Ident(f) if f == "TypeOf" || f == "ValueOf")
            && matches!(toks[i + 3].value, Token::LParen);

        if is_reflect_call {
            let arg_start = i + 4;
            match toks.get(arg_start).map(|t| &t.value) {
                Some(Token::Ident(name)) => {
                    if matches!(toks.get(arg_start + 1).map(|t| &t.value), Some(Token::LBrace)) {
                        found.push(name.clone());
                    }
                }
                Some(Token::LParen) => {
                    // (*T)(nil)
                    if matches!(toks.get(arg_start + 1).map(|t| &t.value), Some(Token::Star)) {
                        if let Some(Token::Ident(name)) = toks.get(arg_start + 2).map(|t| &t.value) {
                            if matches!(toks.get(arg_start + 3).map(|t| &t.value), Some(Token::RParen)) {
                                found.push(name.clone());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    found
}

fn reflection_scan(file: &File) -> HashSet<String> {
    let mut names = HashSet::new();
    for decl in &file.decls {
        let body = match decl {
            Decl::Func(f) => f.body,
            _ => None,
        };
        let span = match body {
            Some(span) => span,
            None => continue,
        };
        for type_name in reflected_type_names_in_body(&file.source, span) {
            names.extend(names_of_reflected_type(file, &type_name));
        }
    }
    names
}

/// The name carried by a linkname directive's first argument must never be
/// renamed: it is how an assembly stub or another package's `//go:linkname`
/// finds this declaration (spec glossary "Linkname directive").
fn linkname_scan(file: &File) -> HashSet<String> {
    file.directives
        .iter()
        .filter(|(_, d)| d.is_linkname())
        .filter_map(|(_, d)| d.args.first().cloned())
        .collect()
}

fn literal_scan(file: &File, obfuscator: &dyn Obfuscator, seed: &[u8]) -> Result<HashSet<String>> {
    let outcome = obfuscator.obfuscate(file, seed)?;
    Ok(outcome.keep_names.into_iter().collect())
}

/// Run all three sub-scans and fold them into one ignore set for `file`.
pub fn scan(file: &File, obfuscator: &dyn Obfuscator, seed: &[u8]) -> Result<IgnoreSet> {
    let mut set = IgnoreSet::new();
    set.extend(reflection_scan(file));
    set.extend(linkname_scan(file));
    set.extend(literal_scan(file, obfuscator, seed)?);
    Ok(set)
}

/// Same as `scan`, but across every file of a package at once: a type
/// handed to `reflect.TypeOf` in one file may be declared in another file
/// of the same package, so the reflection sub-scan has to see every
/// declaration before it can resolve any reference.
pub fn scan_package(
    files: &[File],
    obfuscator: &dyn Obfuscator,
    seed: &[u8],
) -> Result<IgnoreSet> {
    let mut type_names = HashSet::new();
    for file in files {
        for decl in &file.decls {
            let body = match decl {
                Decl::Func(f) => f.body,
                _ => None,
            };
            if let Some(span) = body {
                type_names.extend(reflected_type_names_in_body(&file.source, span));
            }
        }
    }

    let mut set = IgnoreSet::new();
    for file in files {
        for type_name in &type_names {
            set.extend(names_of_reflected_type(file, type_name));
        }
        set.extend(linkname_scan(file));
        set.extend(literal_scan(file, obfuscator, seed)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use literals::NoopObfuscator;

    #[test]
    fn reflection_on_composite_literal_keeps_type_and_fields() {
        let src = r#"package p;

type Config struct {
	Name string;
	Other;
};

func f() {
	t := reflect.TypeOf(Config{});
	_ = t;
};
"#;
        let file = ast::parser::parse("x.go", src).unwrap();
        let names = reflection_scan(&file);
        assert!(names.contains("Config"));
        assert!(names.contains("Name"));
        assert!(names.contains("Other"));
    }

    #[test]
    fn reflection_on_typed_nil_pointer_keeps_type() {
        let src = r#"package p;

type Handler struct {
	Fn string;
};

func f() {
	t := reflect.TypeOf((*Handler)(nil));
	_ = t;
};
"#;
        let file = ast::parser::parse("x.go", src).unwrap();
        let names = reflection_scan(&file);
        assert!(names.contains("Handler"));
        assert!(names.contains("Fn"));
    }

    #[test]
    fn unrelated_calls_add_nothing() {
        let src = "package p;\nfunc f() {\n\tt := other.TypeOf(Config{});\n\t_ = t;\n};\n";
        let file = ast::parser::parse("x.go", src).unwrap();
        assert!(reflection_scan(&file).is_empty());
    }

    #[test]
    fn linkname_local_name_is_kept() {
        let src = "package p;\n\n//go:linkname myFunc runtime.otherFunc\nfunc myFunc() {};\n";
        let file = ast::parser::parse("x.go", src).unwrap();
        let names = linkname_scan(&file);
        assert!(names.contains("myFunc"));
    }

    #[test]
    fn reflection_resolves_type_declared_in_a_different_file() {
        let type_file = ast::parser::parse(
            "types.go",
            "package p;\n\ntype Config struct {\n\tName string;\n};\n",
        )
        .unwrap();
        let use_file = ast::parser::parse(
            "use.go",
            "package p;\n\nfunc f() {\n\tt := reflect.TypeOf(Config{});\n\t_ = t;\n};\n",
        )
        .unwrap();
        let set = scan_package(&[type_file, use_file], &NoopObfuscator, b"seed").unwrap();
        assert!(set.contains("Config"));
        assert!(set.contains("Name"));
    }

    #[test]
    fn combined_scan_merges_all_three() {
        let src = "package p;\n\n//go:linkname myFunc runtime.otherFunc\nfunc myFunc() {};\n";
        let file = ast::parser::parse("x.go", src).unwrap();
        let set = scan(&file, &NoopObfuscator, b"seed").unwrap();
        assert!(set.contains("myFunc"));
    }
}
