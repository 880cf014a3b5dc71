//! Declaration-level model. Function/method bodies are not parsed into a
//! statement tree; they are kept as a byte span plus a flat list of
//! identifier/selector/call references scanned out of that span (see
//! `refs.rs`). This is deliberately shallow: spec.md's rewriter "visits
//! every identifier node", and a flat reference list gives us that without
//! needing a full expression grammar.

use crate::pos::Span;

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// One field of a struct type.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    /// Textual type, kept opaque except when it names a local type
    /// (embedded field resolution, spec §4.4 "Embedded struct field").
    pub type_text: String,
    /// True when this field has no explicit name: `type T struct { Other }`.
    pub embedded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StructType {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub struct_type: Option<StructType>,
    /// Has no body we understand (assembly, or a grammar form we don't
    /// model) — never rename, matching the "no body" skip rule for funcs
    /// and the cgo-synthesised-type-prefix carve-out for types.
    pub is_cgo_type: bool,
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub is_const: bool,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub name: Option<Ident>,
    pub type_name: Ident,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    /// `None` when the function has no body (assembly, linkname-provided).
    pub body: Option<Span>,
    /// Raw text of the parenthesized parameter list, used only to match the
    /// test-function signature `(*testing.T)` (spec §4.4).
    pub param_text: String,
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Import(ImportSpec),
    Const(ValueSpec),
    Var(ValueSpec),
    Type(TypeSpec),
    Func(FuncDecl),
}

/// A build-directive comment (spec glossary "Linkname directive"; also
/// covers the broader `//go:directive ...` family such as
/// `//go:cgo_import_dynamic`, of which only `linkname` is rewritten).
#[derive(Debug, Clone)]
pub struct Directive {
    pub span: Span,
    pub name: String,
    pub args: Vec<String>,
}

impl Directive {
    pub fn is_linkname(&self) -> bool {
        self.name == "linkname"
    }
}

#[derive(Debug, Clone)]
pub struct File {
    pub filename: String,
    pub source: String,
    pub package: Ident,
    pub decls: Vec<Decl>,
    /// Directive comment immediately preceding `decls[i]`, if any.
    pub directives: Vec<(usize, Directive)>,
}

impl File {
    pub fn text(&self, span: Span) -> &str {
        span.text(&self.source)
    }
}
