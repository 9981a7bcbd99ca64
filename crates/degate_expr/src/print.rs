//! Infix rendering of expressions.
//!
//! N-ary operands are joined by the bare operator symbol (`a&b|c`). An
//! operand is parenthesized when it binds no tighter than its parent, and a
//! nested conditional is always parenthesized, so the output re-parses to
//! the same tree.

use crate::expr::{Expr, UnaryOp};
use std::fmt;

const COND: u8 = 0;
const NOT: u8 = 4;
const ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Cond(..) => COND,
        Expr::Nary(op, _) => match op {
            crate::NaryOp::Or => 1,
            crate::NaryOp::Xor => 2,
            crate::NaryOp::And => 3,
        },
        Expr::Unary(..) => NOT,
        Expr::Const(_) | Expr::Net(_) | Expr::Carry(_) | Expr::FullAdder(_) => ATOM,
    }
}

struct Grouped<'a>(&'a Expr, bool);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn nested_cond(expr: &Expr) -> Grouped<'_> {
    Grouped(expr, matches!(expr, Expr::Cond(..)))
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, ops: &[Expr; 3]) -> fmt::Result {
    write!(
        f,
        "{name}({}, {}, {})",
        nested_cond(&ops[0]),
        nested_cond(&ops[1]),
        nested_cond(&ops[2])
    )
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => f.write_str(value.verilog()),
            Expr::Net(name) => f.write_str(name),
            Expr::Unary(op, inner) => {
                write!(f, "{}{}", op.symbol(), Grouped(inner, precedence(inner) < NOT))
            }
            Expr::Nary(op, operands) => {
                let prec = precedence(self);
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(op.symbol())?;
                    }
                    let opaque = matches!(operand, Expr::Unary(u, _) if *u != UnaryOp::Not);
                    write!(f, "{}", Grouped(operand, opaque || precedence(operand) <= prec))?;
                }
                Ok(())
            }
            Expr::Cond(c, t, e) => write!(
                f,
                "{} ? {} : {}",
                nested_cond(c),
                nested_cond(t),
                nested_cond(e)
            ),
            Expr::Carry(ops) => write_call(f, "carry", ops),
            Expr::FullAdder(ops) => write_call(f, "fa", ops),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::{Expr, UnaryOp};
    use crate::parse::parse_expr;

    fn n(name: &str) -> Expr {
        Expr::net(name)
    }

    fn roundtrip(text: &str) {
        let e = parse_expr(text).unwrap();
        assert_eq!(e.to_string(), text);
        assert_eq!(parse_expr(&e.to_string()).unwrap(), e);
    }

    #[test]
    fn and_inside_or_needs_no_parens() {
        let e = Expr::or(vec![Expr::and(vec![n("a"), n("b")]), n("c")]);
        assert_eq!(e.to_string(), "a&b|c");
    }

    #[test]
    fn or_inside_and_is_grouped() {
        let e = Expr::and(vec![Expr::or(vec![n("a"), n("b")]), n("c")]);
        assert_eq!(e.to_string(), "(a|b)&c");
    }

    #[test]
    fn same_operator_nesting_is_grouped() {
        let e = Expr::xor(vec![n("a"), Expr::xor(vec![n("b"), n("c")])]);
        assert_eq!(e.to_string(), "a^(b^c)");
    }

    #[test]
    fn negation() {
        assert_eq!(Expr::not(n("a")).to_string(), "!a");
        assert_eq!(Expr::not(Expr::not(n("a"))).to_string(), "!!a");
        assert_eq!(
            Expr::not(Expr::and(vec![n("a"), n("b")])).to_string(),
            "!(a&b)"
        );
    }

    #[test]
    fn conditional_and_calls() {
        let e = Expr::cond(n("s"), Expr::or(vec![n("a"), n("b")]), Expr::ZERO);
        assert_eq!(e.to_string(), "s ? a|b : 0");
        let e = Expr::cond(Expr::cond(n("p"), n("q"), n("r")), n("a"), n("b"));
        assert_eq!(e.to_string(), "(p ? q : r) ? a : b");
        let e = Expr::carry(Expr::not(n("a")), n("b"), Expr::ONE);
        assert_eq!(e.to_string(), "carry(!a, b, 1)");
        let e = Expr::and(vec![n("x"), Expr::full_adder(n("a"), n("b"), n("c"))]);
        assert_eq!(e.to_string(), "x&fa(a, b, c)");
    }

    #[test]
    fn opaque_unary_inside_nary_is_grouped() {
        let e = Expr::and(vec![n("x"), Expr::Unary(UnaryOp::ReduceAnd, Box::new(n("y")))]);
        assert_eq!(e.to_string(), "x&(&y)");
        assert_eq!(parse_expr(&e.to_string()).unwrap(), e);
    }

    #[test]
    fn unknown_constant() {
        assert_eq!(Expr::X.to_string(), "1'bx");
    }

    #[test]
    fn printed_forms_roundtrip() {
        roundtrip("a&b|c");
        roundtrip("!(a|b)&c");
        roundtrip("a^b^!c");
        roundtrip("s ? !a : b&c");
        roundtrip("carry(a, !b, 0)|fa(a, b, (c ? d : e))");
    }
}
