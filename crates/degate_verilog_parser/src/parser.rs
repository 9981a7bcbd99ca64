//! Core parser infrastructure and top-level parsing rules.
//!
//! The [`VerilogParser`] struct provides primitive operations (advance,
//! expect, eat) and error recovery, while the top-level methods parse source
//! files, modules and port lists (ANSI and non-ANSI).

use crate::ast::*;
use crate::token::{Token, VerilogToken};
use degate_common::Span;
use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// A recursive descent parser over the token stream of one source file.
///
/// Errors are reported to the diagnostic sink and represented as `Error`
/// variants in the AST so parsing can continue past them.
pub struct VerilogParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) sink: &'src DiagnosticSink,
}

impl<'src> VerilogParser<'src> {
    /// Creates a parser from tokens lexed from `source`.
    pub fn new(tokens: Vec<Token>, source: &'src str, sink: &'src DiagnosticSink) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> VerilogToken {
        self.tokens
            .get(self.pos)
            .map_or(VerilogToken::Eof, |t| t.kind)
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(Span::default(), |t| t.span)
    }

    /// Returns the source text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.text(self.current_span())
    }

    /// Returns the source text covered by `span`.
    pub(crate) fn text(&self, span: Span) -> &'src str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: VerilogToken) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.current() == VerilogToken::Eof
    }

    /// Returns the span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Returns the kind of the token at pos+offset.
    pub(crate) fn peek_kind(&self, offset: usize) -> VerilogToken {
        self.tokens
            .get(self.pos + offset)
            .map_or(VerilogToken::Eof, |t| t.kind)
    }

    /// Advances past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches the given kind.
    pub(crate) fn eat(&mut self, kind: VerilogToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind. Emits an error if not.
    pub(crate) fn expect(&mut self, kind: VerilogToken) {
        if !self.eat(kind) {
            self.expected(&format!("{kind:?}"));
        }
    }

    /// Expects and returns an identifier. Emits an error and returns a
    /// placeholder if there is none.
    pub(crate) fn expect_ident(&mut self) -> String {
        if self.at(VerilogToken::Identifier) {
            let text = self.current_text().to_string();
            self.advance();
            text
        } else {
            self.expected("identifier");
            "<missing>".to_string()
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Emits an error diagnostic at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.sink.emit(
            Diagnostic::error(DiagnosticCode::SYNTAX, msg).with_span(self.current_span()),
        );
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let actual = match self.current() {
            VerilogToken::Eof => "end of file".to_string(),
            _ => format!("'{}'", self.current_text()),
        };
        self.error(&format!("expected {what}, found {actual}"));
    }

    /// Recovers to a semicolon, consuming everything up to and including it.
    pub(crate) fn recover_to_semicolon(&mut self) {
        while !self.at_eof() && !self.at(VerilogToken::Semicolon) {
            self.advance();
        }
        self.eat(VerilogToken::Semicolon);
    }

    /// Skips to the `;` ending the current construct, stepping over
    /// bracketed groups so a `;` inside them does not end it early.
    pub(crate) fn skip_to_semicolon(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current() {
                VerilogToken::LeftParen | VerilogToken::LeftBracket | VerilogToken::LeftBrace => {
                    depth += 1
                }
                VerilogToken::RightParen
                | VerilogToken::RightBracket
                | VerilogToken::RightBrace => depth = depth.saturating_sub(1),
                VerilogToken::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a region opened by the current keyword up to its matching
    /// closing keyword, honoring nesting of the same pair.
    pub(crate) fn skip_region(&mut self) {
        let open = self.current();
        let Some(close) = open.closing_keyword() else {
            self.skip_to_semicolon();
            return;
        };
        let mut depth = 0usize;
        while !self.at_eof() {
            let kind = self.current();
            self.advance();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
        self.error(&format!("missing {close:?}"));
    }

    /// Identifiers among the tokens in `from..to`, in order, without repeats.
    pub(crate) fn identifiers_between(&self, from: usize, to: usize) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for token in &self.tokens[from..to.min(self.tokens.len())] {
            if token.kind == VerilogToken::Identifier {
                let name = self.text(token.span);
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete source file.
    pub fn parse_source_file(&mut self) -> VerilogSourceFile {
        let start = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            match self.current() {
                VerilogToken::Module => {
                    items.push(VerilogItem::Module(self.parse_module()));
                }
                // attributes on the module itself carry nothing we use
                VerilogToken::Attribute => self.advance(),
                _ => {
                    let span = self.current_span();
                    self.error("expected 'module'");
                    self.advance();
                    items.push(VerilogItem::Error(span));
                }
            }
        }

        let span = if items.is_empty() {
            start
        } else {
            start.merge(self.prev_span())
        };
        VerilogSourceFile { items, span }
    }

    /// Parses a module declaration.
    fn parse_module(&mut self) -> ModuleDecl {
        let start = self.current_span();
        self.expect(VerilogToken::Module);
        let name = self.expect_ident();

        // parameter port list: #(...)
        if self.eat(VerilogToken::Hash) {
            if self.at(VerilogToken::LeftParen) {
                self.skip_parens();
            } else {
                self.expected("'('");
            }
        }

        let (ports, port_names) = if self.at(VerilogToken::LeftParen) {
            self.parse_port_list()
        } else {
            (Vec::new(), Vec::new())
        };

        self.expect(VerilogToken::Semicolon);
        let items = self.parse_module_items();
        self.expect(VerilogToken::Endmodule);
        let span = start.merge(self.prev_span());

        ModuleDecl {
            name,
            ports,
            port_names,
            items,
            span,
        }
    }

    /// Skips a balanced parenthesized group starting at the current `(`.
    pub(crate) fn skip_parens(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current() {
                VerilogToken::LeftParen => depth += 1,
                VerilogToken::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        self.error("unbalanced parentheses");
    }

    /// Parses a port list, detecting ANSI (`input a`) or non-ANSI (`a`) style.
    fn parse_port_list(&mut self) -> (Vec<PortDecl>, Vec<String>) {
        self.expect(VerilogToken::LeftParen);

        if self.eat(VerilogToken::RightParen) {
            return (Vec::new(), Vec::new());
        }

        if self.current().is_direction() {
            let ports = self.parse_ansi_port_list();
            self.expect(VerilogToken::RightParen);
            (ports, Vec::new())
        } else {
            let mut names = vec![self.expect_ident()];
            while self.eat(VerilogToken::Comma) {
                names.push(self.expect_ident());
            }
            self.expect(VerilogToken::RightParen);
            (Vec::new(), names)
        }
    }

    /// Parses ANSI-style port declarations: `dir [type] [range] name {, name}`.
    fn parse_ansi_port_list(&mut self) -> Vec<PortDecl> {
        let mut ports = Vec::new();
        let mut direction = Direction::Input;

        loop {
            let start = self.current_span();
            if let Some(dir) = self.eat_direction() {
                direction = dir;
            }
            let net_type = self.eat_net_type();
            self.eat(VerilogToken::Signed);
            let range = self.parse_optional_range();

            let mut names = vec![self.expect_ident()];
            // a comma followed by a direction starts the next declaration
            while self.at(VerilogToken::Comma) && self.peek_kind(1) == VerilogToken::Identifier {
                self.advance();
                names.push(self.expect_ident());
            }

            ports.push(PortDecl {
                direction,
                net_type,
                range,
                names,
                span: start.merge(self.prev_span()),
            });

            if !self.eat(VerilogToken::Comma) {
                break;
            }
        }

        ports
    }

    /// Consumes a direction keyword if present.
    pub(crate) fn eat_direction(&mut self) -> Option<Direction> {
        let dir = match self.current() {
            VerilogToken::Input => Direction::Input,
            VerilogToken::Output => Direction::Output,
            VerilogToken::Inout => Direction::Inout,
            _ => return None,
        };
        self.advance();
        Some(dir)
    }

    /// Consumes a net type keyword if present.
    pub(crate) fn eat_net_type(&mut self) -> Option<NetType> {
        let net_type = match self.current() {
            VerilogToken::Wire
            | VerilogToken::Tri
            | VerilogToken::Supply0
            | VerilogToken::Supply1 => NetType::Wire,
            VerilogToken::Reg => NetType::Reg,
            _ => return None,
        };
        self.advance();
        Some(net_type)
    }

    /// Parses `[msb:lsb]` if the current token opens one.
    pub(crate) fn parse_optional_range(&mut self) -> Option<Range> {
        if !self.at(VerilogToken::LeftBracket) {
            return None;
        }
        let start = self.current_span();
        self.advance();
        let msb = self.parse_expr();
        self.expect(VerilogToken::Colon);
        let lsb = self.parse_expr();
        self.expect(VerilogToken::RightBracket);
        Some(Range {
            msb,
            lsb,
            span: start.merge(self.prev_span()),
        })
    }
}
