//! Minimal source model for the obfuscation engine.
//!
//! Just enough of the target language's grammar to locate declarations,
//! struct fields, directive comments and identifier references for
//! rewriting — see the module docs on `ast` and `parser` for the scope
//! this deliberately does not cover.

pub mod ast;
pub mod idents;
pub mod parser;
pub mod patch;
pub mod pos;
pub mod refs;
pub mod token;

pub use ast::{Decl, Directive, Field, File, FuncDecl, Ident, ImportSpec, Receiver, StructType, TypeSpec, ValueSpec};
pub use pos::Span;
