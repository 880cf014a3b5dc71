//! The AST rewriter (spec §4.4): decide which package-scope declarations to
//! rename, then patch every file of the package so every reference this
//! crate can see agrees with the new spelling.
//!
//! Scope, consistent with `ast`'s shallow grammar: only package-scope
//! var/const/type/plain-function declarations are rename candidates.
//! Struct field names and methods are deliberately left alone — renaming a
//! field's declaration without also rewriting every `x.Field` selector
//! across the package (which needs `x`'s static type, and this AST does not
//! do type inference) would silently break more call sites than it hides.
//! Likewise, identifiers inside a var/const initializer expression are not
//! scanned: only function/method bodies carry a byte span for `refs::scan`
//! to walk, so a top-level initializer that references a renamed sibling
//! will not be patched consistently. Both limitations are inherited from
//! `ast`'s "no local-scope shadowing resolution" scope cut and are recorded
//! alongside it.

use ast::{patch, refs, Decl, File, Span};
use core::{ActionId, PackageId, Result, Seed};
use scan::IgnoreSet;
use std::collections::{HashMap, HashSet};

pub struct RewriteResult {
    /// `original -> emitted` for every package-scope declaration, including
    /// ones left unchanged. Handed to `shroud_core::PackageRecord::set_loaded`
    /// so a dependent package can resolve a linkname reference against this
    /// one later (spec §3 "loaded_package").
    pub emitted: HashMap<String, String>,
    pub files: Vec<(String, String)>,
}

struct Candidate {
    name: String,
    span: Span,
}

/// Functions the build relies on finding by their exact original name, so
/// renaming them would break the build rather than merely obfuscate it.
fn is_entrypoint_or_test(name: &str, param_text: &str) -> bool {
    if name == "main" || name == "init" || name == "TestMain" {
        return true;
    }
    let looks_like_test = name.starts_with("Test")
        || name.starts_with("Benchmark")
        || name.starts_with("Example")
        || name.starts_with("Fuzz");
    looks_like_test
        && (param_text.contains("testing.T")
            || param_text.contains("testing.B")
            || param_text.contains("testing.F"))
}

fn should_skip(pkg_path: &str, name: &str, ignore: &IgnoreSet) -> bool {
    ast::idents::is_placeholder(name)
        || ast::idents::is_cgo_name(name)
        || ignore.contains(name)
        // A main package's exported package-scope names are left alone:
        // `main` has no importers, but a `-buildmode=plugin` load still
        // resolves plugin symbols by their original exported spelling.
        || (pkg_path == "main" && ast::idents::is_exported(name))
}

/// Every package-scope declaration, split into rename candidates (those
/// that survive the skip rules) and the full declared-name set (needed to
/// build `RewriteResult::emitted` even for names we chose not to touch).
fn collect_candidates(
    files: &[File],
    pkg_path: &str,
    ignore: &IgnoreSet,
) -> (Vec<Candidate>, HashSet<String>) {
    let mut candidates = Vec::new();
    let mut declared = HashSet::new();

    for file in files {
        for decl in &file.decls {
            match decl {
                Decl::Var(spec) | Decl::Const(spec) => {
                    for id in &spec.names {
                        declared.insert(id.name.clone());
                        if !should_skip(pkg_path, &id.name, ignore) {
                            candidates.push(Candidate {
                                name: id.name.clone(),
                                span: id.span,
                            });
                        }
                    }
                }
                Decl::Type(t) => {
                    declared.insert(t.name.name.clone());
                    if !t.is_cgo_type && !should_skip(pkg_path, &t.name.name, ignore) {
                        candidates.push(Candidate {
                            name: t.name.name.clone(),
                            span: t.name.span,
                        });
                    }
                }
                Decl::Func(f) => {
                    if f.receiver.is_some() {
                        // Methods are dispatched through a selector, which
                        // this rewriter cannot safely rename (see module
                        // docs); their name never becomes a candidate.
                        continue;
                    }
                    declared.insert(f.name.name.clone());
                    if f.body.is_none() {
                        continue;
                    }
                    if is_entrypoint_or_test(&f.name.name, &f.param_text) {
                        continue;
                    }
                    if !should_skip(pkg_path, &f.name.name, ignore) {
                        candidates.push(Candidate {
                            name: f.name.name.clone(),
                            span: f.name.span,
                        });
                    }
                }
                Decl::Import(_) => {}
            }
        }
    }

    (candidates, declared)
}

/// Rename every package-scope declaration of `files` that passes the skip
/// rules, and patch every file so bare-identifier uses inside function
/// bodies agree with the new spelling.
pub fn rewrite_package(
    files: &[File],
    pkg_path: &PackageId,
    action_id: &ActionId,
    seed: Option<&Seed>,
    pattern: &str,
    ignore: &IgnoreSet,
) -> Result<RewriteResult> {
    if !privacy::is_private(pkg_path.as_str(), pattern)? {
        log::debug!("{}: not private, leaving untouched", pkg_path);
        let files = files
            .iter()
            .map(|f| (f.filename.clone(), f.source.clone()))
            .collect();
        return Ok(RewriteResult {
            emitted: HashMap::new(),
            files,
        });
    }

    let key = hash::package_key(action_id, seed);
    let (candidates, declared) = collect_candidates(files, pkg_path.as_str(), ignore);
    log::debug!("{}: {} rename candidates", pkg_path, candidates.len());

    let mut renames: HashMap<String, String> = HashMap::new();
    for c in &candidates {
        renames
            .entry(c.name.clone())
            .or_insert_with(|| hash::hash(&key, &c.name));
    }

    let mut outputs = Vec::with_capacity(files.len());
    for file in files {
        let mut edits: Vec<(Span, String)> = Vec::new();

        for decl in &file.decls {
            match decl {
                Decl::Var(spec) | Decl::Const(spec) => {
                    for id in &spec.names {
                        if let Some(new_name) = renames.get(&id.name) {
                            edits.push((id.span, new_name.clone()));
                        }
                    }
                }
                Decl::Type(t) => {
                    if let Some(new_name) = renames.get(&t.name.name) {
                        edits.push((t.name.span, new_name.clone()));
                    }
                }
                Decl::Func(f) => {
                    if f.receiver.is_none() {
                        if let Some(new_name) = renames.get(&f.name.name) {
                            edits.push((f.name.span, new_name.clone()));
                        }
                    }
                    if let Some(span) = f.body {
                        let refs = refs::scan(&file.source, span);
                        let field_spans: HashSet<_> =
                            refs.selectors.iter().map(|s| s.field.span).collect();
                        for ident in &refs.idents {
                            if field_spans.contains(&ident.span) {
                                continue;
                            }
                            if let Some(new_name) = renames.get(&ident.name) {
                                edits.push((ident.span, new_name.clone()));
                            }
                        }
                    }
                }
                Decl::Import(_) => {}
            }
        }

        let rewritten = patch::apply(&file.source, edits);
        outputs.push((file.filename.clone(), rewritten));
    }

    let emitted = declared
        .into_iter()
        .map(|name| {
            let out_name = renames.get(&name).cloned().unwrap_or_else(|| name.clone());
            (name, out_name)
        })
        .collect();

    Ok(RewriteResult {
        emitted,
        files: outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ActionId;
    use scan::IgnoreSet;

    fn parse_all(sources: &[(&str, &str)]) -> Vec<File> {
        sources
            .iter()
            .map(|(name, src)| ast::parser::parse(name, src).unwrap())
            .collect()
    }

    #[test]
    fn renames_package_scope_func_and_its_bare_call_sites() {
        let files = parse_all(&[(
            "a.go",
            "package p;\n\nfunc helper() int {\n\treturn 1;\n};\n\nfunc Use() int {\n\treturn helper();\n};\n",
        )]);
        let action = ActionId(b"test-action".to_vec());
        let pkg = PackageId::from("example.com/p");
        let ignore = IgnoreSet::new();
        let result =
            rewrite_package(&files, &pkg, &action, None, "...", &ignore).unwrap();

        let new_name = result.emitted.get("helper").unwrap();
        assert_ne!(new_name, "helper");
        let (_, rewritten) = &result.files[0];
        assert!(!rewritten.contains("func helper"));
        assert!(rewritten.contains(&format!("func {}", new_name)));
        assert!(rewritten.contains(&format!("{}()", new_name)));
        assert!(rewritten.contains("func Use"));
    }

    #[test]
    fn exported_main_package_names_are_left_alone() {
        let files = parse_all(&[("a.go", "package main;\n\nfunc Helper() int {\n\treturn 1;\n};\n")]);
        let action = ActionId(b"test-action".to_vec());
        let pkg = PackageId::from("main");
        let ignore = IgnoreSet::new();
        let result = rewrite_package(&files, &pkg, &action, None, "...", &ignore).unwrap();
        assert_eq!(result.emitted.get("Helper").unwrap(), "Helper");
    }

    #[test]
    fn ignored_names_are_left_alone() {
        let files = parse_all(&[(
            "a.go",
            "package p;\n\n//go:linkname keepMe runtime.somethingElse\nfunc keepMe() {};\n",
        )]);
        let action = ActionId(b"test-action".to_vec());
        let pkg = PackageId::from("example.com/p");
        let mut ignore = IgnoreSet::new();
        ignore.insert("keepMe");
        let result = rewrite_package(&files, &pkg, &action, None, "...", &ignore).unwrap();
        assert_eq!(result.emitted.get("keepMe").unwrap(), "keepMe");
    }

    #[test]
    fn non_private_package_is_returned_unchanged() {
        let files = parse_all(&[("a.go", "package p;\n\nfunc Helper() {};\n")]);
        let action = ActionId(b"test-action".to_vec());
        let pkg = PackageId::from("fmt");
        let ignore = IgnoreSet::new();
        let result = rewrite_package(&files, &pkg, &action, None, "", &ignore).unwrap();
        assert!(result.emitted.is_empty());
        assert_eq!(result.files[0].1, files[0].source);
    }

    #[test]
    fn same_package_key_is_deterministic() {
        let files = parse_all(&[("a.go", "package p;\n\nfunc helper() {};\n")]);
        let action = ActionId(b"test-action".to_vec());
        let pkg = PackageId::from("example.com/p");
        let ignore = IgnoreSet::new();
        let r1 = rewrite_package(&files, &pkg, &action, None, "...", &ignore).unwrap();
        let r2 = rewrite_package(&files, &pkg, &action, None, "...", &ignore).unwrap();
        assert_eq!(r1.emitted.get("helper"), r2.emitted.get("helper"));
    }
}
