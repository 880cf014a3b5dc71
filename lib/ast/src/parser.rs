//! A deliberately shallow recursive-descent parser: enough of the target
//! language's declaration grammar to build the model in `ast.rs`, nothing
//! more. Expression and statement bodies are never descended into; they
//! are captured as byte spans (see module docs on `ast.rs`) and scanned
//! separately by `refs.rs`.
//!
//! Scope limitation (documented, not hidden): this subset does not
//! implement automatic semicolon insertion. Fixtures terminate
//! declarations and struct fields with an explicit `;`, which is legal
//! syntax in the real grammar too.

use crate::ast::{
    Decl, Directive, Field, File, FuncDecl, Ident, ImportSpec, Receiver, StructType, TypeSpec,
    ValueSpec,
};
use crate::pos::Span;
use crate::token::{Lexer, Spanned, Token};
use core::{Error, Result};

pub fn parse(filename: &str, source: &str) -> Result<File> {
    let toks = Lexer::new(source).tokenize();
    let mut p = Parser {
        toks,
        idx: 0,
        filename,
        source,
    };

    p.drain_comments(); // leading file comments: irrelevant to us.
    let package = p.expect_keyword_then_ident("package")?;
    p.skip_semi();

    let mut decls = Vec::new();
    let mut directives = Vec::new();

    loop {
        let pending = p.drain_comments();
        if p.at_eof() {
            break;
        }
        let first_idx = decls.len();
        let group = p.parse_top_level_decl()?;
        if group.is_empty() {
            continue;
        }
        decls.extend(group);
        if let Some(d) = pending.into_iter().find(|d| d.is_linkname()) {
            directives.push((first_idx, d));
        }
    }

    Ok(File {
        filename: filename.to_string(),
        source: source.to_string(),
        package,
        decls,
        directives,
    })
}

struct Parser<'a> {
    toks: Vec<Spanned<Token>>,
    idx: usize,
    filename: &'a str,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn at_eof(&self) -> bool {
        self.idx >= self.toks.len()
    }

    fn peek(&self) -> &Token {
        self.toks
            .get(self.idx)
            .map(|t| &t.value)
            .unwrap_or(&Token::Eof)
    }

    fn peek_span(&self) -> Span {
        self.toks
            .get(self.idx)
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0))
    }

    fn bump(&mut self) -> Spanned<Token> {
        let t = self
            .toks
            .get(self.idx)
            .cloned()
            .unwrap_or(Spanned {
                value: Token::Eof,
                span: self.peek_span(),
                line: crate::pos::Line(0),
            });
        self.idx += 1;
        t
    }

    fn skip_semi(&mut self) {
        while matches!(self.peek(), Token::Semi) {
            self.idx += 1;
        }
    }

    /// Consume any run of comment tokens, returning the directive comments
    /// found among them (spec §4.3 "build-directive comment").
    fn drain_comments(&mut self) -> Vec<Directive> {
        let mut out = Vec::new();
        while let Token::Comment(text) = self.peek() {
            if let Some(d) = parse_directive(text, self.peek_span()) {
                out.push(d);
            }
            self.idx += 1;
        }
        out
    }

    fn error(&self, msg: impl std::fmt::Display) -> Error {
        Error::internal(format!("{}: {}", self.filename, msg))
    }

    fn expect_keyword_then_ident(&mut self, kw: &'static str) -> Result<Ident> {
        match self.peek().clone() {
            Token::Keyword(k) if k == kw => {
                self.idx += 1;
            }
            other => return Err(self.error(format!("expected `{}`, found {:?}", kw, other))),
        }
        self.expect_ident()
    }

    fn expect_ident(&mut self) -> Result<Ident> {
        let t = self.bump();
        match t.value {
            Token::Ident(name) => Ok(Ident {
                name,
                span: t.span,
            }),
            other => Err(self.error(format!("expected identifier, found {:?}", other))),
        }
    }

    fn eat_keyword(&mut self, kw: &'static str) -> bool {
        if matches!(self.peek(), Token::Keyword(k) if *k == kw) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    /// Skip tokens up to (not including) the next `Semi`/`RParen` at the
    /// current nesting depth, respecting `()[]{}` nesting so we don't stop
    /// inside e.g. a `map[string]int` type or a call expression.
    fn skip_balanced_until_semi_or(&mut self, stop_at_rparen: bool) -> Span {
        let start = self.peek_span().start;
        let mut depth: i32 = 0;
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Semi if depth == 0 => break,
                Token::RParen if depth == 0 && stop_at_rparen => break,
                Token::LParen | Token::LBrace | Token::LBracket => {
                    depth += 1;
                    self.idx += 1;
                }
                Token::RParen | Token::RBrace | Token::RBracket => {
                    depth -= 1;
                    self.idx += 1;
                }
                _ => {
                    self.idx += 1;
                }
            }
        }
        let end = self.peek_span().start;
        Span::new(start, end.max(start))
    }

    /// Skip a single bare result type (`func f() string { ... }`), stopping
    /// at the body's opening `{` rather than treating it as nesting — only
    /// `[` is ever opened and closed within a bare result type (`[]byte`,
    /// `map[string]int`), never `{`.
    fn skip_bare_result_type(&mut self) {
        let mut bracket_depth: i32 = 0;
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::LBrace if bracket_depth == 0 => break,
                Token::Semi if bracket_depth == 0 => break,
                Token::LBracket => {
                    bracket_depth += 1;
                    self.idx += 1;
                }
                Token::RBracket => {
                    bracket_depth -= 1;
                    self.idx += 1;
                }
                _ => {
                    self.idx += 1;
                }
            }
        }
    }

    fn parse_top_level_decl(&mut self) -> Result<Vec<Decl>> {
        match self.peek().clone() {
            Token::Keyword("import") => {
                self.idx += 1;
                self.parse_import_body()
            }
            Token::Keyword("const") => {
                self.idx += 1;
                self.parse_value_block(true)
            }
            Token::Keyword("var") => {
                self.idx += 1;
                self.parse_value_block(false)
            }
            Token::Keyword("type") => {
                self.idx += 1;
                self.parse_type_block()
            }
            Token::Keyword("func") => {
                self.idx += 1;
                Ok(vec![Decl::Func(self.parse_func_decl()?)])
            }
            other => Err(self.error(format!("unexpected top-level token {:?}", other))),
        }
    }

    fn parse_one_import(&mut self) -> Result<ImportSpec> {
        self.drain_comments();
        let alias = if let Token::Ident(name) = self.peek().clone() {
            self.idx += 1;
            Some(name)
        } else {
            None
        };
        let path_tok = self.bump();
        let path = match path_tok.value {
            Token::String(s) => s.trim_matches(|c| c == '"' || c == '`').to_string(),
            other => return Err(self.error(format!("expected import path, found {:?}", other))),
        };
        self.skip_semi();
        Ok(ImportSpec { alias, path })
    }

    fn parse_import_body(&mut self) -> Result<Vec<Decl>> {
        let mut out = Vec::new();
        if self.eat(&Token::LParen) {
            loop {
                self.drain_comments();
                if self.eat(&Token::RParen) {
                    break;
                }
                if self.at_eof() {
                    return Err(self.error("unterminated import block"));
                }
                out.push(Decl::Import(self.parse_one_import()?));
            }
            self.skip_semi();
        } else {
            out.push(Decl::Import(self.parse_one_import()?));
        }
        Ok(out)
    }

    fn parse_ident_list(&mut self) -> Vec<Ident> {
        let mut out = Vec::new();
        loop {
            match self.peek().clone() {
                Token::Ident(name) => {
                    let span = self.peek_span();
                    self.idx += 1;
                    out.push(Ident { name, span });
                }
                _ => break,
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        out
    }

    fn parse_value_spec(&mut self, is_const: bool) -> ValueSpec {
        let names = self.parse_ident_list();
        // skip optional type + `= exprs`
        self.skip_balanced_until_semi_or(true);
        self.skip_semi();
        ValueSpec { names, is_const }
    }

    fn parse_value_block(&mut self, is_const: bool) -> Result<Vec<Decl>> {
        let mut out = Vec::new();
        if self.eat(&Token::LParen) {
            loop {
                self.drain_comments();
                if self.eat(&Token::RParen) {
                    break;
                }
                if self.at_eof() {
                    return Err(self.error("unterminated const/var block"));
                }
                let spec = self.parse_value_spec(is_const);
                let decl = if is_const {
                    Decl::Const(spec)
                } else {
                    Decl::Var(spec)
                };
                out.push(decl);
            }
            self.skip_semi();
        } else {
            let spec = self.parse_value_spec(is_const);
            out.push(if is_const {
                Decl::Const(spec)
            } else {
                Decl::Var(spec)
            });
        }
        Ok(out)
    }

    fn parse_struct_fields(&mut self) -> Result<StructType> {
        let mut fields = Vec::new();
        loop {
            self.drain_comments();
            if self.eat(&Token::RBrace) {
                break;
            }
            if self.at_eof() {
                return Err(self.error("unterminated struct type"));
            }

            let star = self.eat(&Token::Star);
            let first = self.expect_ident()?;
            let mut names = vec![first.clone()];
            while self.eat(&Token::Comma) {
                names.push(self.expect_ident()?);
            }

            // Decide named vs. embedded: a named field is followed by at
            // least one more type token before the terminator; an embedded
            // field's identifier(s) are immediately followed by an optional
            // string tag and then the terminator.
            let embedded = names.len() == 1
                && matches!(self.peek(), Token::Semi | Token::String(_) | Token::RBrace);

            if embedded {
                if let Token::String(_) = self.peek().clone() {
                    self.idx += 1;
                }
                self.skip_semi();
                fields.push(Field {
                    names: vec![],
                    type_text: format!("{}{}", if star { "*" } else { "" }, names[0].name),
                    embedded: true,
                });
            } else {
                let type_start = self.peek_span().start;
                let mut type_end = type_start;
                // consume the type, tolerating a trailing string tag, up to `;`
                loop {
                    match self.peek().clone() {
                        Token::Semi | Token::RBrace | Token::Eof => break,
                        _ => {
                            self.idx += 1;
                            type_end = self.toks[self.idx - 1].span.end;
                        }
                    }
                }
                let type_text = self.source[type_start..type_end].trim().to_string();
                self.skip_semi();
                fields.push(Field {
                    names,
                    type_text,
                    embedded: false,
                });
            }
        }
        Ok(StructType { fields })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.expect_ident()?;
        // optional assignment form `type Alias = Underlying` — treat `=` like any other token.
        if matches!(self.peek(), Token::Keyword("struct")) {
            self.idx += 1;
            if !self.eat(&Token::LBrace) {
                return Err(self.error("expected `{` after `struct`"));
            }
            let st = self.parse_struct_fields()?;
            self.skip_semi();
            let is_cgo_type = crate::idents::is_cgo_name(&name.name);
            return Ok(TypeSpec {
                name,
                struct_type: Some(st),
                is_cgo_type,
            });
        }
        self.skip_balanced_until_semi_or(true);
        self.skip_semi();
        let is_cgo_type = crate::idents::is_cgo_name(&name.name);
        Ok(TypeSpec {
            name,
            struct_type: None,
            is_cgo_type,
        })
    }

    fn parse_type_block(&mut self) -> Result<Vec<Decl>> {
        let mut out = Vec::new();
        if self.eat(&Token::LParen) {
            loop {
                self.drain_comments();
                if self.eat(&Token::RParen) {
                    break;
                }
                if self.at_eof() {
                    return Err(self.error("unterminated type block"));
                }
                out.push(Decl::Type(self.parse_type_spec()?));
            }
            self.skip_semi();
        } else {
            out.push(Decl::Type(self.parse_type_spec()?));
        }
        Ok(out)
    }

    fn parse_receiver(&mut self) -> Result<Receiver> {
        // assumes the opening `(` has already been consumed by the caller
        let first = self.expect_ident()?;
        // could be `(name *Type)` or `(name Type)` or `(*Type)` or `(Type)`
        let (name, type_name) = if matches!(self.peek(), Token::Star) {
            self.idx += 1;
            (Some(first), self.expect_ident()?)
        } else if let Token::Ident(_) = self.peek() {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        if !self.eat(&Token::RParen) {
            return Err(self.error("expected `)` closing receiver"));
        }
        Ok(Receiver { name, type_name })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let receiver = if self.eat(&Token::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };
        let name = self.expect_ident()?;

        if !self.eat(&Token::LParen) {
            return Err(self.error("expected `(` starting parameter list"));
        }
        let param_start = self.peek_span().start;
        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                Token::Eof => return Err(self.error("unterminated parameter list")),
                Token::LParen => {
                    depth += 1;
                    self.idx += 1;
                }
                Token::RParen => {
                    depth -= 1;
                    self.idx += 1;
                }
                _ => {
                    self.idx += 1;
                }
            }
        }
        let param_end = self.toks[self.idx - 1].span.start;
        let param_text = self.source[param_start..param_end].to_string();

        // optional result type(s): a parenthesized group, a single type, or nothing.
        if self.eat(&Token::LParen) {
            let mut depth = 1;
            while depth > 0 {
                match self.peek() {
                    Token::Eof => return Err(self.error("unterminated result list")),
                    Token::LParen => {
                        depth += 1;
                        self.idx += 1;
                    }
                    Token::RParen => {
                        depth -= 1;
                        self.idx += 1;
                    }
                    _ => {
                        self.idx += 1;
                    }
                }
            }
        } else if !matches!(self.peek(), Token::LBrace | Token::Semi | Token::Eof) {
            // single bare result type: consume until `{` or `;`
            self.skip_bare_result_type();
        }

        let body = if self.eat(&Token::LBrace) {
            let start = self.peek_span().start;
            let mut depth = 1;
            while depth > 0 {
                match self.peek() {
                    Token::Eof => return Err(self.error("unterminated function body")),
                    Token::LBrace => {
                        depth += 1;
                        self.idx += 1;
                    }
                    Token::RBrace => {
                        depth -= 1;
                        self.idx += 1;
                    }
                    _ => {
                        self.idx += 1;
                    }
                }
            }
            let end = self.toks[self.idx - 1].span.start;
            self.skip_semi();
            Some(Span::new(start, end))
        } else {
            self.skip_semi();
            None
        };

        Ok(FuncDecl {
            name,
            receiver,
            body,
            param_text,
        })
    }
}

/// Parse a `//go:name arg1 arg2` directive comment. Anything else is an
/// ordinary comment and is ignored.
fn parse_directive(comment: &str, span: Span) -> Option<Directive> {
    let body = comment.strip_prefix("//go:")?;
    let mut parts = body.split_whitespace();
    let name = parts.next()?.to_string();
    let args = parts.map(str::to_string).collect();
    Some(Directive { span, name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"package main;

import "fmt";

type T string;

func (t T) String() string {
	return "String method for " + string(t);
};

func (t T) unexportedMethod() string {
	return "unexported method for " + string(t);
};

func main() {
	var t T = "foo";
	fmt.Println(t.String());
	fmt.Println(t.unexportedMethod());
};
"#;

    #[test]
    fn parses_package_clause_and_decls() {
        let file = parse("main.go", SRC).unwrap();
        assert_eq!(file.package.name, "main");
        let funcs: Vec<_> = file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Func(f) => Some(f.name.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(funcs, vec!["String", "unexportedMethod", "main"]);
    }

    #[test]
    fn receiver_is_attached_to_methods() {
        let file = parse("main.go", SRC).unwrap();
        let method = file
            .decls
            .iter()
            .find_map(|d| match d {
                Decl::Func(f) if f.name.name == "String" => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(method.receiver.as_ref().unwrap().type_name.name, "T");
    }

    #[test]
    fn linkname_directive_is_attached() {
        let src = r#"package p;

//go:linkname localName remote.Name
func localName();
"#;
        let file = parse("p.go", src).unwrap();
        assert_eq!(file.directives.len(), 1);
        assert!(file.directives[0].1.is_linkname());
        assert_eq!(file.directives[0].1.args, vec!["localName", "remote.Name"]);
    }

    #[test]
    fn struct_fields_parse_named_and_embedded() {
        let src = r#"package p;

type S struct {
	Name string;
	Other;
	count int;
};
"#;
        let file = parse("p.go", src).unwrap();
        let st = file
            .decls
            .iter()
            .find_map(|d| match d {
                Decl::Type(t) if t.name.name == "S" => t.struct_type.clone(),
                _ => None,
            })
            .unwrap();
        assert_eq!(st.fields.len(), 3);
        assert_eq!(st.fields[0].names[0].name, "Name");
        assert!(st.fields[1].embedded);
        assert_eq!(st.fields[1].type_text, "Other");
        assert_eq!(st.fields[2].names[0].name, "count");
    }
}
