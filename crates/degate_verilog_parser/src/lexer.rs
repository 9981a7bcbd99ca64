//! Lexical analyzer for netlist source text.
//!
//! Converts source text into [`Token`]s, handling case-sensitive keywords,
//! sized/based literals (`1'b0`), attribute instances (`(* CARRY *)`), line
//! and block comments. Compiler directives are skipped to the end of their
//! line. Errors are reported to the [`DiagnosticSink`] and produce
//! [`VerilogToken::Error`] tokens.

use crate::token::{lookup_keyword, Token, VerilogToken};
use degate_common::Span;
use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Lexes `source` into a vector of tokens ending with [`VerilogToken::Eof`].
pub fn lex(source: &str, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: VerilogToken::Eof,
                    span: Span::new(self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn token(&self, kind: VerilogToken, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink
            .emit(Diagnostic::error(DiagnosticCode::LEX, msg).with_span(span));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            // `//` comment, and compiler directives such as `timescale
            if (self.peek() == b'/' && self.peek_at(1) == b'/') || self.peek() == b'`' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                if !self.skip_past(b"*/") {
                    self.error("unterminated block comment", self.span_from(start));
                }
                continue;
            }
            break;
        }
    }

    /// Advances past the next occurrence of `terminator`; at end of input
    /// returns `false`.
    fn skip_past(&mut self, terminator: &[u8]) -> bool {
        while self.pos < self.source.len() {
            if self.source[self.pos..].starts_with(terminator) {
                self.pos += terminator.len();
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }
        if b == b'$' {
            return self.lex_system_identifier(start);
        }
        if b == b'\\' {
            while self.pos < self.source.len() && !self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            self.error("escaped identifiers are not supported", self.span_from(start));
            return self.token(VerilogToken::Error, start);
        }
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }
        if b == b'\'' && matches!(self.peek_at(1).to_ascii_lowercase(), b'b' | b'o' | b'd' | b'h' | b's') {
            self.pos += 1;
            return self.lex_based_tail(start);
        }
        if b == b'"' {
            return self.lex_string(start);
        }
        // `(*` opens an attribute unless it is the `@(*)` sensitivity list
        if b == b'(' && self.peek_at(1) == b'*' && self.peek_at(2) != b')' {
            self.pos += 2;
            if !self.skip_past(b"*)") {
                self.error("unterminated attribute", self.span_from(start));
                return self.token(VerilogToken::Error, start);
            }
            return self.token(VerilogToken::Attribute, start);
        }
        self.lex_operator(start)
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = lookup_keyword(text).unwrap_or(VerilogToken::Identifier);
        self.token(kind, start)
    }

    fn lex_system_identifier(&mut self, start: usize) -> Token {
        self.pos += 1;
        if !is_ident_start(self.peek()) {
            self.error("expected identifier after '$'", self.span_from(start));
            return self.token(VerilogToken::Error, start);
        }
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }
        self.token(VerilogToken::SystemIdentifier, start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        self.eat_digits(b'd');
        if self.peek() == b'\''
            && matches!(self.peek_at(1).to_ascii_lowercase(), b'b' | b'o' | b'd' | b'h' | b's')
        {
            self.pos += 1;
            return self.lex_based_tail(start);
        }
        self.token(VerilogToken::IntLiteral, start)
    }

    /// Lexes the part of a based literal after the tick: `[s]base digits`.
    fn lex_based_tail(&mut self, start: usize) -> Token {
        if self.peek().to_ascii_lowercase() == b's' {
            self.pos += 1;
        }
        let base = self.peek().to_ascii_lowercase();
        if !matches!(base, b'b' | b'o' | b'd' | b'h') {
            self.error("expected base after signed marker", self.span_from(start));
            return self.token(VerilogToken::Error, start);
        }
        self.pos += 1;
        let digits_start = self.pos;
        self.eat_digits(base);
        if self.pos == digits_start {
            self.error("based literal has no digits", self.span_from(start));
            return self.token(VerilogToken::Error, start);
        }
        self.token(VerilogToken::SizedLiteral, start)
    }

    fn eat_digits(&mut self, base: u8) {
        while self.pos < self.source.len() {
            let ch = self.source[self.pos].to_ascii_lowercase();
            let valid = match base {
                b'b' => matches!(ch, b'0' | b'1' | b'x' | b'z' | b'?' | b'_'),
                b'o' => matches!(ch, b'0'..=b'7' | b'x' | b'z' | b'?' | b'_'),
                b'h' => ch.is_ascii_hexdigit() || matches!(ch, b'x' | b'z' | b'?' | b'_'),
                _ => ch.is_ascii_digit() || ch == b'_',
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1;
        loop {
            match self.source.get(self.pos) {
                None | Some(b'\n') => {
                    self.error("unterminated string literal", self.span_from(start));
                    return self.token(VerilogToken::Error, start);
                }
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return self.token(VerilogToken::StringLiteral, start);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Consumes `next` if it follows, returning whether it did.
    fn follow(&mut self, next: u8) -> bool {
        if self.peek() == next {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.source[self.pos];
        self.pos += 1;
        let kind = match b {
            b'(' => VerilogToken::LeftParen,
            b')' => VerilogToken::RightParen,
            b'[' => VerilogToken::LeftBracket,
            b']' => VerilogToken::RightBracket,
            b'{' => VerilogToken::LeftBrace,
            b'}' => VerilogToken::RightBrace,
            b',' => VerilogToken::Comma,
            b';' => VerilogToken::Semicolon,
            b':' => VerilogToken::Colon,
            b'.' => VerilogToken::Dot,
            b'#' => VerilogToken::Hash,
            b'@' => VerilogToken::At,
            b'?' => VerilogToken::Question,
            b'+' => VerilogToken::Plus,
            b'-' => VerilogToken::Minus,
            b'/' => VerilogToken::Slash,
            b'%' => VerilogToken::Percent,
            b'=' if self.follow(b'=') => {
                if self.follow(b'=') {
                    VerilogToken::TripleEquals
                } else {
                    VerilogToken::DoubleEquals
                }
            }
            b'=' => VerilogToken::Equals,
            b'!' if self.follow(b'=') => {
                if self.follow(b'=') {
                    VerilogToken::BangDoubleEquals
                } else {
                    VerilogToken::BangEquals
                }
            }
            b'!' => VerilogToken::Bang,
            b'<' if self.follow(b'=') => VerilogToken::LessEquals,
            b'<' if self.follow(b'<') => {
                if self.follow(b'<') {
                    VerilogToken::TripleLess
                } else {
                    VerilogToken::DoubleLess
                }
            }
            b'<' => VerilogToken::LessThan,
            b'>' if self.follow(b'=') => VerilogToken::GreaterEquals,
            b'>' if self.follow(b'>') => {
                if self.follow(b'>') {
                    VerilogToken::TripleGreater
                } else {
                    VerilogToken::DoubleGreater
                }
            }
            b'>' => VerilogToken::GreaterThan,
            b'*' if self.follow(b'*') => VerilogToken::DoubleStar,
            b'*' => VerilogToken::Star,
            b'&' if self.follow(b'&') => VerilogToken::DoubleAmpersand,
            b'&' => VerilogToken::Ampersand,
            b'|' if self.follow(b'|') => VerilogToken::DoublePipe,
            b'|' => VerilogToken::Pipe,
            b'^' if self.follow(b'~') => VerilogToken::TildeCaret,
            b'^' => VerilogToken::Caret,
            b'~' if self.follow(b'^') => VerilogToken::TildeCaret,
            b'~' if self.follow(b'&') => VerilogToken::TildeAmpersand,
            b'~' if self.follow(b'|') => VerilogToken::TildePipe,
            b'~' => VerilogToken::Tilde,
            _ => {
                self.error(
                    &format!("unrecognized character '{}'", b as char),
                    self.span_from(start),
                );
                VerilogToken::Error
            }
        };
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
