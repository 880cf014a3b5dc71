//! Scenarios exercising the rename-and-archive pipeline end to end, without
//! a real toolchain: parse fixture sources, run the ignore-set scanner and
//! rewriter exactly as the compile hook would, then check the properties
//! the engine promises.

use ast::parser::parse;
use core::{ActionId, PackageId};
use literals::NoopObfuscator;
use scan::scan_package;
use std::collections::HashMap;

fn parse_all(sources: &[(&str, &str)]) -> Vec<ast::File> {
    sources
        .iter()
        .map(|(name, src)| parse(name, src).unwrap())
        .collect()
}

fn rewrite(
    sources: &[(&str, &str)],
    pkg: &str,
    action: &[u8],
    pattern: &str,
) -> rewrite::RewriteResult {
    let files = parse_all(sources);
    let ignore = scan_package(&files, &NoopObfuscator, action).unwrap();
    let action_id = ActionId(action.to_vec());
    let pkg = PackageId::from(pkg);
    rewrite::rewrite_package(&files, &pkg, &action_id, None, pattern, &ignore).unwrap()
}

#[test]
fn rewrite_is_deterministic_across_runs() {
    let src = [(
        "a.go",
        "package p;\n\nfunc helper() int {\n\treturn 1;\n};\n\nfunc Use() int {\n\treturn helper();\n};\n",
    )];

    let first = rewrite(&src, "example.com/p", b"fixed-action-id", "...");
    let second = rewrite(&src, "example.com/p", b"fixed-action-id", "...");

    assert_eq!(first.emitted, second.emitted);
    assert_eq!(first.files, second.files);
}

#[test]
fn differing_action_ids_produce_differing_names() {
    let src = [("a.go", "package p;\n\nfunc helper() {};\n")];

    let a = rewrite(&src, "example.com/p", b"action-one", "...");
    let b = rewrite(&src, "example.com/p", b"action-two", "...");

    assert_ne!(a.emitted.get("helper"), b.emitted.get("helper"));
}

#[test]
fn rewritten_source_never_leaks_the_original_private_name() {
    let src = [(
        "a.go",
        "package p;\n\nfunc secretHelper() int {\n\treturn 42;\n};\n\nfunc Use() int {\n\treturn secretHelper();\n};\n",
    )];
    let result = rewrite(&src, "example.com/p", b"leak-check", "...");

    let (_, rewritten) = &result.files[0];
    assert!(!rewritten.contains("secretHelper"));
    assert!(rewritten.contains("func Use"));
}

#[test]
fn reflection_protects_a_type_and_its_fields_across_files() {
    let src = [
        (
            "types.go",
            "package p;\n\ntype Config struct {\n\tName string;\n\tvalue int;\n};\n",
        ),
        (
            "use.go",
            "package p;\n\nfunc describe() string {\n\tt := reflect.TypeOf(Config{});\n\treturn t.Name();\n};\n",
        ),
    ];
    let result = rewrite(&src, "example.com/p", b"reflect-safety", "...");

    // Config and Name must survive unrenamed; the unrelated `describe`
    // function and the lowercase `value` field are still fair game.
    assert_eq!(result.emitted.get("Config").unwrap(), "Config");
    assert!(result
        .files
        .iter()
        .any(|(_, src)| src.contains("type Config struct")));
    assert_ne!(result.emitted.get("describe").unwrap(), "describe");
}

#[test]
fn linkname_directive_keeps_its_local_name_stable() {
    let src = [(
        "a.go",
        "package p;\n\n//go:linkname poke runtime.somethingElse\nfunc poke() {};\n\nfunc Use() {\n\tpoke();\n};\n",
    )];
    let result = rewrite(&src, "example.com/p", b"linkname-safety", "...");
    assert_eq!(result.emitted.get("poke").unwrap(), "poke");
}

#[test]
fn non_private_packages_are_returned_byte_for_byte() {
    let src = [("a.go", "package fmt;\n\nfunc Sprintf() {};\n")];
    let result = rewrite(&src, "fmt", b"irrelevant", "example.com/...");
    assert!(result.emitted.is_empty());
    assert_eq!(result.files[0].1, src[0].1);
}

#[test]
fn main_packages_keep_exported_names_for_plugin_loading() {
    let src = [(
        "a.go",
        "package main;\n\nfunc Init() {};\n\nfunc helper() {};\n",
    )];
    let result = rewrite(&src, "main", b"plugin-safety", "");

    assert_eq!(result.emitted.get("Init").unwrap(), "Init");
    assert_ne!(result.emitted.get("helper").unwrap(), "helper");
}

#[test]
fn name_map_archive_round_trip_resolves_a_dependents_linkname_lookup() {
    let result = rewrite(
        &[("a.go", "package p;\n\nfunc helper() {};\n")],
        "example.com/p",
        b"archive-round-trip",
        "...",
    );

    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    archive::write_name_map(tmp.path(), &result.emitted).unwrap();

    let loaded = archive::read_name_map(tmp.path()).unwrap().unwrap();
    assert_eq!(loaded.get("helper"), result.emitted.get("helper"));
}

#[test]
fn debug_src_archive_round_trip_preserves_rewritten_sources() {
    let result = rewrite(
        &[("a.go", "package p;\n\nfunc helper() {};\n")],
        "example.com/p",
        b"debug-src-round-trip",
        "...",
    );

    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    archive::append_debug_src(tmp.path(), &result.files).unwrap();

    let read_back: HashMap<String, String> = archive::read_debug_src(tmp.path())
        .unwrap()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(read_back.get("a.go"), Some(&result.files[0].1));
}
