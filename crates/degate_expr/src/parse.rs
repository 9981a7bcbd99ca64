//! Parser for the infix expression syntax.
//!
//! Precedence, loosest first: `?:`, `|`, `^`, `&`, then the prefix
//! operators. A chain of the same operator (`a&b&c`) becomes one n-ary
//! node; parentheses always produce a nested node, so that everything the
//! printer emits parses back to the identical tree.

use crate::expr::{Expr, NaryOp, UnaryOp};
use degate_common::Logic;

/// A parse failure with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ExprParseError {
    /// What was expected or found.
    pub message: String,
    /// Byte offset into the parsed text.
    pub offset: usize,
}

/// Parses `text` into an expression.
pub fn parse_expr(text: &str) -> Result<Expr, ExprParseError> {
    let mut parser = ExprParser {
        src: text.as_bytes(),
        pos: 0,
    };
    let expr = parser.parse_cond()?;
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct ExprParser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn error(&self, message: impl Into<String>) -> ExprParseError {
        ExprParseError {
            message: message.into(),
            offset: self.pos,
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn peek(&mut self) -> Option<u8> {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        self.src.get(self.pos).copied()
    }

    fn peek_second(&mut self) -> Option<u8> {
        self.peek()?;
        self.src.get(self.pos + 1).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ExprParseError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn parse_cond(&mut self) -> Result<Expr, ExprParseError> {
        let cond = self.parse_nary(NaryOp::Or)?;
        if !self.eat(b'?') {
            return Ok(cond);
        }
        let then = self.parse_cond()?;
        self.expect(b':')?;
        let otherwise = self.parse_cond()?;
        Ok(Expr::cond(cond, then, otherwise))
    }

    fn parse_nary(&mut self, op: NaryOp) -> Result<Expr, ExprParseError> {
        let (separator, tighter) = match op {
            NaryOp::Or => (b'|', Some(NaryOp::Xor)),
            NaryOp::Xor => (b'^', Some(NaryOp::And)),
            NaryOp::And => (b'&', None),
        };
        let mut operands = vec![self.parse_operand(tighter)?];
        while self.eat(separator) {
            operands.push(self.parse_operand(tighter)?);
        }
        if operands.len() == 1 {
            Ok(operands.remove(0))
        } else {
            Ok(Expr::nary(op, operands))
        }
    }

    fn parse_operand(&mut self, tighter: Option<NaryOp>) -> Result<Expr, ExprParseError> {
        match tighter {
            Some(op) => self.parse_nary(op),
            None => self.parse_unary(),
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprParseError> {
        let op = match (self.peek(), self.peek_second()) {
            (Some(b'~'), Some(b'&')) => Some((UnaryOp::ReduceNand, 2)),
            (Some(b'~'), Some(b'|')) => Some((UnaryOp::ReduceNor, 2)),
            (Some(b'~'), Some(b'^')) | (Some(b'^'), Some(b'~')) => Some((UnaryOp::ReduceXnor, 2)),
            (Some(b'!' | b'~'), _) => Some((UnaryOp::Not, 1)),
            (Some(b'-'), _) => Some((UnaryOp::Minus, 1)),
            (Some(b'+'), _) => Some((UnaryOp::Plus, 1)),
            (Some(b'&'), _) => Some((UnaryOp::ReduceAnd, 1)),
            (Some(b'|'), _) => Some((UnaryOp::ReduceOr, 1)),
            (Some(b'^'), _) => Some((UnaryOp::ReduceXor, 1)),
            _ => None,
        };
        match op {
            Some((op, width)) => {
                self.pos += width;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary(op, Box::new(operand)))
            }
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprParseError> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_cond()?;
                self.expect(b')')?;
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == b'\'' => self.parse_literal(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.parse_ident_or_call(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c as char))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_literal(&mut self) -> Result<Expr, ExprParseError> {
        let start = self.pos;
        let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'\'' || c == b'_');
        match Logic::from_literal(text) {
            Some(value) => Ok(Expr::Const(value)),
            None => Err(ExprParseError {
                message: format!("'{text}' is not a single-bit constant"),
                offset: start,
            }),
        }
    }

    fn parse_ident_or_call(&mut self) -> Result<Expr, ExprParseError> {
        let start = self.pos;
        let name = self
            .take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
            .to_string();
        if self.peek() != Some(b'(') {
            return Ok(Expr::Net(name));
        }
        let build: fn(Expr, Expr, Expr) -> Expr = match name.as_str() {
            "carry" => Expr::carry,
            "fa" => Expr::full_adder,
            _ => {
                return Err(ExprParseError {
                    message: format!("unknown function '{name}'"),
                    offset: start,
                })
            }
        };
        self.pos += 1;
        let a = self.parse_cond()?;
        self.expect(b',')?;
        let b = self.parse_cond()?;
        self.expect(b',')?;
        let c = self.parse_cond()?;
        self.expect(b')')?;
        Ok(build(a, b, c))
    }

    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let src: &'a [u8] = self.src;
        let start = self.pos;
        while src.get(self.pos).is_some_and(|c| accept(*c)) {
            self.pos += 1;
        }
        // Only ASCII bytes are accepted, so the slice is valid UTF-8.
        std::str::from_utf8(&src[start..self.pos]).unwrap_or_default()
    }
}
