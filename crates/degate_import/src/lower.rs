//! Lowering of parsed Verilog expressions onto the single-bit algebra.

use crate::error::ImportError;
use degate_common::Logic;
use degate_expr::{Expr, UnaryOp};
use degate_verilog_parser::ast::{self, BinaryOp};

/// Translates a parsed expression over 1-bit nets.
///
/// Logical and bitwise connectives coincide on single bits, so `&&`/`||`
/// lower like `&`/`|`; equality becomes XNOR and inequality XOR. Reduction
/// operators and unary `+`/`-` are kept opaque. Anything multi-bit is
/// rejected.
pub fn lower_expr(expr: &ast::Expr) -> Result<Expr, ImportError> {
    match expr {
        ast::Expr::Identifier { name, .. } => Ok(Expr::net(name.as_str())),
        ast::Expr::Literal { text, span } => Logic::from_literal(text)
            .map(Expr::Const)
            .ok_or_else(|| ImportError::unsupported(format!("multi-bit literal {text}"), *span)),
        ast::Expr::Paren { inner, .. } => lower_expr(inner),
        ast::Expr::Unary { op, operand, .. } => {
            let inner = lower_expr(operand)?;
            Ok(match op {
                ast::UnaryOp::LogNot | ast::UnaryOp::BitNot => Expr::not(inner),
                ast::UnaryOp::Plus => Expr::Unary(UnaryOp::Plus, Box::new(inner)),
                ast::UnaryOp::Minus => Expr::Unary(UnaryOp::Minus, Box::new(inner)),
                ast::UnaryOp::RedAnd => Expr::Unary(UnaryOp::ReduceAnd, Box::new(inner)),
                ast::UnaryOp::RedNand => Expr::Unary(UnaryOp::ReduceNand, Box::new(inner)),
                ast::UnaryOp::RedOr => Expr::Unary(UnaryOp::ReduceOr, Box::new(inner)),
                ast::UnaryOp::RedNor => Expr::Unary(UnaryOp::ReduceNor, Box::new(inner)),
                ast::UnaryOp::RedXor => Expr::Unary(UnaryOp::ReduceXor, Box::new(inner)),
                ast::UnaryOp::RedXnor => Expr::Unary(UnaryOp::ReduceXnor, Box::new(inner)),
            })
        }
        ast::Expr::Binary {
            left,
            op,
            right,
            span,
        } => {
            let pair = || -> Result<Vec<Expr>, ImportError> {
                Ok(vec![lower_expr(left)?, lower_expr(right)?])
            };
            match op {
                BinaryOp::BitAnd | BinaryOp::LogAnd => Ok(Expr::and(pair()?)),
                BinaryOp::BitOr | BinaryOp::LogOr => Ok(Expr::or(pair()?)),
                BinaryOp::BitXor | BinaryOp::Neq => Ok(Expr::xor(pair()?)),
                BinaryOp::BitXnor | BinaryOp::Eq => Ok(Expr::not(Expr::xor(pair()?))),
                other => Err(ImportError::unsupported(
                    format!("operator {}", other.symbol()),
                    *span,
                )),
            }
        }
        ast::Expr::Ternary {
            condition,
            then_expr,
            else_expr,
            ..
        } => Ok(Expr::cond(
            lower_expr(condition)?,
            lower_expr(then_expr)?,
            lower_expr(else_expr)?,
        )),
        // the helper functions every cleaned module declares
        ast::Expr::FuncCall { name, args, span } => match (name.as_str(), args.as_slice()) {
            ("carry", [a, b, c]) => Ok(Expr::carry(lower_expr(a)?, lower_expr(b)?, lower_expr(c)?)),
            ("fa", [a, b, c]) => Ok(Expr::full_adder(
                lower_expr(a)?,
                lower_expr(b)?,
                lower_expr(c)?,
            )),
            _ => Err(ImportError::unsupported(format!("call of {name}"), *span)),
        },
        ast::Expr::Index { span, .. } | ast::Expr::RangeSelect { span, .. } => {
            Err(ImportError::unsupported("bit select", *span))
        }
        ast::Expr::Concat { span, .. } | ast::Expr::Repeat { span, .. } => {
            Err(ImportError::unsupported("concatenation", *span))
        }
        ast::Expr::StringLiteral { span } => Err(ImportError::unsupported("string literal", *span)),
        ast::Expr::Error(span) => Err(ImportError::unsupported("malformed expression", *span)),
    }
}

/// Lowers the right-hand side of an assignment marked as a carry.
///
/// The synthesized shape is `(a & b) | ((a | b) & c)`: the inputs are the
/// two operands of the left term and the right operand of the right term.
pub fn lower_carry(expr: &ast::Expr) -> Result<Expr, ImportError> {
    let not_carry = || ImportError::unsupported("carry pragma on a non-carry expression", expr.span());
    let ast::Expr::Binary { left, right, .. } = expr.unparen() else {
        return Err(not_carry());
    };
    let ast::Expr::Binary { left: a, right: b, .. } = left.unparen() else {
        return Err(not_carry());
    };
    let ast::Expr::Binary { right: c, .. } = right.unparen() else {
        return Err(not_carry());
    };
    Ok(Expr::carry(lower_expr(a)?, lower_expr(b)?, lower_expr(c)?))
}
