//! Pratt expression parser.
//!
//! Operator precedence follows IEEE 1364-2005 Table 5-4:
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `||` |
//! | (3,4)    | `&&` |
//! | (5,6)    | `|` |
//! | (7,8)    | `^` `~^` `^~` |
//! | (9,10)   | `&` |
//! | (11,12)  | `==` `!=` `===` `!==` |
//! | (13,14)  | `<` `<=` `>` `>=` |
//! | (15,16)  | `<<` `>>` `<<<` `>>>` |
//! | (17,18)  | `+` `-` |
//! | (19,20)  | `*` `/` `%` |
//! | (22,21)  | `**` (right-assoc) |
//! | prefix 23 | `+` `-` `!` `~` `&` `~&` `|` `~|` `^` `~^` |
//!
//! Ternary `? :` binds loosest and is right-associative.

use crate::ast::*;
use crate::parser::VerilogParser;
use crate::token::VerilogToken;

const PREFIX_BP: u8 = 23;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::LogOr => (1, 2),
        BinaryOp::LogAnd => (3, 4),
        BinaryOp::BitOr => (5, 6),
        BinaryOp::BitXor | BinaryOp::BitXnor => (7, 8),
        BinaryOp::BitAnd => (9, 10),
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::CaseEq | BinaryOp::CaseNeq => (11, 12),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => (13, 14),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::AShl | BinaryOp::AShr => (15, 16),
        BinaryOp::Add | BinaryOp::Sub => (17, 18),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (19, 20),
        BinaryOp::Pow => (22, 21),
    }
}

fn binary_op(token: VerilogToken) -> Option<BinaryOp> {
    Some(match token {
        VerilogToken::Plus => BinaryOp::Add,
        VerilogToken::Minus => BinaryOp::Sub,
        VerilogToken::Star => BinaryOp::Mul,
        VerilogToken::Slash => BinaryOp::Div,
        VerilogToken::Percent => BinaryOp::Mod,
        VerilogToken::DoubleStar => BinaryOp::Pow,
        VerilogToken::DoubleEquals => BinaryOp::Eq,
        VerilogToken::BangEquals => BinaryOp::Neq,
        VerilogToken::TripleEquals => BinaryOp::CaseEq,
        VerilogToken::BangDoubleEquals => BinaryOp::CaseNeq,
        VerilogToken::LessThan => BinaryOp::Lt,
        VerilogToken::LessEquals => BinaryOp::Le,
        VerilogToken::GreaterThan => BinaryOp::Gt,
        VerilogToken::GreaterEquals => BinaryOp::Ge,
        VerilogToken::DoubleAmpersand => BinaryOp::LogAnd,
        VerilogToken::DoublePipe => BinaryOp::LogOr,
        VerilogToken::Ampersand => BinaryOp::BitAnd,
        VerilogToken::Pipe => BinaryOp::BitOr,
        VerilogToken::Caret => BinaryOp::BitXor,
        VerilogToken::TildeCaret => BinaryOp::BitXnor,
        VerilogToken::DoubleLess => BinaryOp::Shl,
        VerilogToken::DoubleGreater => BinaryOp::Shr,
        VerilogToken::TripleLess => BinaryOp::AShl,
        VerilogToken::TripleGreater => BinaryOp::AShr,
        _ => return None,
    })
}

fn unary_op(token: VerilogToken) -> Option<UnaryOp> {
    Some(match token {
        VerilogToken::Plus => UnaryOp::Plus,
        VerilogToken::Minus => UnaryOp::Minus,
        VerilogToken::Bang => UnaryOp::LogNot,
        VerilogToken::Tilde => UnaryOp::BitNot,
        VerilogToken::Ampersand => UnaryOp::RedAnd,
        VerilogToken::TildeAmpersand => UnaryOp::RedNand,
        VerilogToken::Pipe => UnaryOp::RedOr,
        VerilogToken::TildePipe => UnaryOp::RedNor,
        VerilogToken::Caret => UnaryOp::RedXor,
        VerilogToken::TildeCaret => UnaryOp::RedXnor,
        _ => return None,
    })
}

impl VerilogParser<'_> {
    /// Parses an expression.
    pub fn parse_expr(&mut self) -> Expr {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix_expr();

        loop {
            if self.at(VerilogToken::Question) && min_bp == 0 {
                self.advance();
                let then_expr = self.parse_expr_bp(0);
                self.expect(VerilogToken::Colon);
                let else_expr = self.parse_expr_bp(0);
                let span = lhs.span().merge(else_expr.span());
                lhs = Expr::Ternary {
                    condition: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                    span,
                };
                continue;
            }

            if self.at(VerilogToken::LeftBracket) {
                lhs = self.parse_postfix_index(lhs);
                continue;
            }

            let Some(op) = binary_op(self.current()) else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.parse_expr_bp(r_bp);
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            };
        }

        lhs
    }

    fn parse_prefix_expr(&mut self) -> Expr {
        let start = self.current_span();

        if let Some(op) = unary_op(self.current()) {
            self.advance();
            let operand = self.parse_expr_bp(PREFIX_BP);
            let span = start.merge(operand.span());
            return Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            };
        }

        match self.current() {
            VerilogToken::IntLiteral | VerilogToken::SizedLiteral => {
                let text = self.current_text().to_string();
                self.advance();
                Expr::Literal { text, span: start }
            }
            VerilogToken::StringLiteral => {
                self.advance();
                Expr::StringLiteral { span: start }
            }
            VerilogToken::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(VerilogToken::RightParen);
                Expr::Paren {
                    inner: Box::new(inner),
                    span: start.merge(self.prev_span()),
                }
            }
            VerilogToken::LeftBrace => self.parse_concat_or_repeat(),
            VerilogToken::Identifier | VerilogToken::SystemIdentifier => {
                let name = self.current_text().to_string();
                self.advance();
                if self.at(VerilogToken::LeftParen) {
                    let args = self.parse_call_args();
                    Expr::FuncCall {
                        name,
                        args,
                        span: start.merge(self.prev_span()),
                    }
                } else {
                    Expr::Identifier { name, span: start }
                }
            }
            _ => {
                self.expected("expression");
                self.advance();
                Expr::Error(start)
            }
        }
    }

    /// Parses an assignment target: a name with optional selects, or a
    /// concatenation.
    pub(crate) fn parse_lvalue(&mut self) -> Expr {
        if self.at(VerilogToken::LeftBrace) {
            return self.parse_concat_or_repeat();
        }
        let start = self.current_span();
        let name = self.expect_ident();
        let mut expr = Expr::Identifier { name, span: start };
        while self.at(VerilogToken::LeftBracket) {
            expr = self.parse_postfix_index(expr);
        }
        expr
    }

    /// Parses `{a, b}` or `{n{a, b}}`.
    fn parse_concat_or_repeat(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(VerilogToken::LeftBrace);

        if self.at(VerilogToken::RightBrace) {
            self.error("empty concatenation");
            self.advance();
            return Expr::Error(start.merge(self.prev_span()));
        }

        let first = self.parse_expr();

        if self.eat(VerilogToken::LeftBrace) {
            let mut elements = vec![self.parse_expr()];
            while self.eat(VerilogToken::Comma) {
                elements.push(self.parse_expr());
            }
            self.expect(VerilogToken::RightBrace);
            self.expect(VerilogToken::RightBrace);
            return Expr::Repeat {
                count: Box::new(first),
                elements,
                span: start.merge(self.prev_span()),
            };
        }

        let mut elements = vec![first];
        while self.eat(VerilogToken::Comma) {
            elements.push(self.parse_expr());
        }
        self.expect(VerilogToken::RightBrace);
        Expr::Concat {
            elements,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `[i]` or `[msb:lsb]` after `base`.
    fn parse_postfix_index(&mut self, base: Expr) -> Expr {
        let start = base.span();
        self.expect(VerilogToken::LeftBracket);
        let first = self.parse_expr();
        if self.eat(VerilogToken::Colon) {
            let lsb = self.parse_expr();
            self.expect(VerilogToken::RightBracket);
            Expr::RangeSelect {
                base: Box::new(base),
                msb: Box::new(first),
                lsb: Box::new(lsb),
                span: start.merge(self.prev_span()),
            }
        } else {
            self.expect(VerilogToken::RightBracket);
            Expr::Index {
                base: Box::new(base),
                index: Box::new(first),
                span: start.merge(self.prev_span()),
            }
        }
    }

    /// Parses call arguments: `( [expr {, expr}] )`.
    fn parse_call_args(&mut self) -> Vec<Expr> {
        self.expect(VerilogToken::LeftParen);
        let mut args = Vec::new();
        if !self.at(VerilogToken::RightParen) {
            args.push(self.parse_expr());
            while self.eat(VerilogToken::Comma) {
                args.push(self.parse_expr());
            }
        }
        self.expect(VerilogToken::RightParen);
        args
    }
}
