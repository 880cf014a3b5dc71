//! Scans a function/method body span for identifier and selector
//! references (spec §4.4 "the rewriter visits every identifier node";
//! §4.3 reflection scan needs `reflect.TypeOf(x)`-shaped call sites).
//!
//! This does not build an expression tree: it is a flat pass over the
//! token stream that records every identifier occurrence and every
//! `base.field` adjacency, which is all the ignore-set scanner and the
//! rewriter need.

use crate::pos::Span;
use crate::token::{Lexer, Token};

#[derive(Debug, Clone)]
pub struct IdentRef {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SelectorRef {
    pub base: IdentRef,
    pub field: IdentRef,
    /// `true` when immediately followed by `(`, i.e. this selector is the
    /// callee of a call expression.
    pub is_call: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BodyRefs {
    pub idents: Vec<IdentRef>,
    pub selectors: Vec<SelectorRef>,
}

pub fn scan(source: &str, span: Span) -> BodyRefs {
    let text = span.text(source);
    let toks: Vec<_> = Lexer::new(text)
        .tokenize()
        .into_iter()
        .filter(|t| !matches!(t.value, Token::Comment(_)))
        .collect();
    let offset = span.start;

    let mut idents = Vec::new();
    let mut selectors = Vec::new();

    for i in 0..toks.len() {
        let name = match &toks[i].value {
            Token::Ident(name) => name.clone(),
            _ => continue,
        };
        let ispan = Span::new(toks[i].span.start + offset, toks[i].span.end + offset);
        idents.push(IdentRef {
            name: name.clone(),
            span: ispan,
        });

        if matches!(toks.get(i + 1).map(|t| &t.value), Some(Token::Dot)) {
            if let Some(Token::Ident(field)) = toks.get(i + 2).map(|t| &t.value) {
                let fspan = Span::new(
                    toks[i + 2].span.start + offset,
                    toks[i + 2].span.end + offset,
                );
                let is_call = matches!(toks.get(i + 3).map(|t| &t.value), Some(Token::LParen));
                selectors.push(SelectorRef {
                    base: IdentRef {
                        name,
                        span: ispan,
                    },
                    field: IdentRef {
                        name: field.clone(),
                        span: fspan,
                    },
                    is_call,
                });
            }
        }
    }

    BodyRefs { idents, selectors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_selector_call() {
        let src = "{ t := reflect.TypeOf(x); _ = t }";
        let refs = scan(src, Span::new(0, src.len()));
        let hit = refs
            .selectors
            .iter()
            .find(|s| s.base.name == "reflect" && s.field.name == "TypeOf")
            .unwrap();
        assert!(hit.is_call);
    }

    #[test]
    fn collects_plain_idents() {
        let src = "{ return x + y }";
        let refs = scan(src, Span::new(0, src.len()));
        let names: Vec<_> = refs.idents.iter().map(|i| i.name.as_str()).collect();
        assert!(names.contains(&"x"));
        assert!(names.contains(&"y"));
    }
}
