//! Three-valued evaluation.

use crate::expr::{Expr, NaryOp, UnaryOp};
use degate_common::Logic;

impl Expr {
    /// Evaluates the expression with net values supplied by `lookup`.
    ///
    /// `carry` is the majority function and `fa` the three-input XOR.
    /// Opaque unary operators evaluate to `X`, as does anything an `X`
    /// operand can influence.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Logic) -> Logic {
        match self {
            Expr::Const(value) => *value,
            Expr::Net(name) => lookup(name),
            Expr::Unary(UnaryOp::Not, inner) => !inner.eval(lookup),
            Expr::Unary(..) => Logic::X,
            Expr::Nary(op, operands) => {
                let values = operands.iter().map(|op| op.eval(lookup));
                match op {
                    NaryOp::And => values.fold(Logic::One, |acc, v| acc & v),
                    NaryOp::Or => values.fold(Logic::Zero, |acc, v| acc | v),
                    NaryOp::Xor => values.fold(Logic::Zero, |acc, v| acc ^ v),
                }
            }
            Expr::Cond(c, t, f) => match c.eval(lookup) {
                Logic::One => t.eval(lookup),
                Logic::Zero => f.eval(lookup),
                Logic::X => {
                    let (t, f) = (t.eval(lookup), f.eval(lookup));
                    if t == f {
                        t
                    } else {
                        Logic::X
                    }
                }
            },
            Expr::Carry(ops) => {
                let [a, b, c] = [ops[0].eval(lookup), ops[1].eval(lookup), ops[2].eval(lookup)];
                (a & b) | ((a | b) & c)
            }
            Expr::FullAdder(ops) => {
                ops[0].eval(lookup) ^ ops[1].eval(lookup) ^ ops[2].eval(lookup)
            }
        }
    }

    /// Evaluates under a two-valued assignment; `None` if the result is `X`.
    pub fn eval_bool(&self, lookup: &dyn Fn(&str) -> bool) -> Option<bool> {
        self.eval(&|name| Logic::from_bool(lookup(name))).to_bool()
    }
}
