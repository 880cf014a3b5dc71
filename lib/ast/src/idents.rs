//! Small, shared identifier predicates used by both the scanner and the
//! rewriter (spec §4.4 skip conditions).

/// cgo emits synthetic identifiers like `_Cfunc_foo`, `_Ctype_struct_bar`
/// and `_cgo_topofstack`; none of these should ever be renamed.
const CGO_PREFIXES: &[&str] = &["_Cfunc_", "_Ctype_", "_Cmacro_", "_cgo_"];
const CGO_INFIX: &str = "·"; // the historical cgo/asm symbol separator

pub fn is_cgo_name(name: &str) -> bool {
    CGO_PREFIXES.iter().any(|p| name.starts_with(p)) || name.contains(CGO_INFIX)
}

/// The universe/unnamed placeholder identifier.
pub fn is_placeholder(name: &str) -> bool {
    name == "_"
}

/// Exported-ness in the target language is spelled with the identifier's
/// leading-character case.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}
