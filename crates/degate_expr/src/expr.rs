//! The expression tree and its structural queries.

use degate_common::Logic;
use serde::{Deserialize, Serialize};

/// A unary operator.
///
/// Only [`Not`](UnaryOp::Not) takes part in rewriting. The others are kept
/// as opaque nodes so that a netlist using them still prints back unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation (`!`, also written `~` on single bits).
    Not,
    /// Unary plus (`+`).
    Plus,
    /// Unary minus (`-`).
    Minus,
    /// Reduction AND (`&`).
    ReduceAnd,
    /// Reduction NAND (`~&`).
    ReduceNand,
    /// Reduction OR (`|`).
    ReduceOr,
    /// Reduction NOR (`~|`).
    ReduceNor,
    /// Reduction XOR (`^`).
    ReduceXor,
    /// Reduction XNOR (`~^`).
    ReduceXnor,
}

impl UnaryOp {
    /// Returns the prefix symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::ReduceAnd => "&",
            UnaryOp::ReduceNand => "~&",
            UnaryOp::ReduceOr => "|",
            UnaryOp::ReduceNor => "~|",
            UnaryOp::ReduceXor => "^",
            UnaryOp::ReduceXnor => "~^",
        }
    }
}

/// An associative operator with any number of operands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NaryOp {
    /// Conjunction (`&`).
    And,
    /// Disjunction (`|`).
    Or,
    /// Exclusive or (`^`).
    Xor,
}

impl NaryOp {
    /// Returns the infix symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            NaryOp::And => "&",
            NaryOp::Or => "|",
            NaryOp::Xor => "^",
        }
    }
}

/// A symbolic single-bit expression.
///
/// Expressions are immutable values: every rewrite builds a new tree.
/// Equality is structural, so `a&b` and `b&a` are different expressions.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Expr {
    /// A constant bit.
    Const(Logic),
    /// A reference to a named net or register.
    Net(String),
    /// A unary operator applied to one operand.
    Unary(UnaryOp, Box<Expr>),
    /// An associative operator over an ordered operand list.
    Nary(NaryOp, Vec<Expr>),
    /// `cond ? then : else`.
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Unresolved 3-input majority pattern, `carry(a, b, c)`.
    Carry(Box<[Expr; 3]>),
    /// Recognised full-adder sum, `fa(a, b, c)`.
    FullAdder(Box<[Expr; 3]>),
}

impl Expr {
    /// The constant `0`.
    pub const ZERO: Expr = Expr::Const(Logic::Zero);
    /// The constant `1`.
    pub const ONE: Expr = Expr::Const(Logic::One);
    /// The unknown constant.
    pub const X: Expr = Expr::Const(Logic::X);

    /// Creates a net reference.
    pub fn net(name: impl Into<String>) -> Self {
        Expr::Net(name.into())
    }

    /// Creates `!inner`.
    pub fn not(inner: Expr) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(inner))
    }

    /// Creates an n-ary node.
    pub fn nary(op: NaryOp, operands: Vec<Expr>) -> Self {
        Expr::Nary(op, operands)
    }

    /// Creates an AND over `operands`.
    pub fn and(operands: Vec<Expr>) -> Self {
        Expr::Nary(NaryOp::And, operands)
    }

    /// Creates an OR over `operands`.
    pub fn or(operands: Vec<Expr>) -> Self {
        Expr::Nary(NaryOp::Or, operands)
    }

    /// Creates an XOR over `operands`.
    pub fn xor(operands: Vec<Expr>) -> Self {
        Expr::Nary(NaryOp::Xor, operands)
    }

    /// Creates `cond ? then : otherwise`.
    pub fn cond(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    /// Creates `carry(a, b, c)`.
    pub fn carry(a: Expr, b: Expr, c: Expr) -> Self {
        Expr::Carry(Box::new([a, b, c]))
    }

    /// Creates `fa(a, b, c)`.
    pub fn full_adder(a: Expr, b: Expr, c: Expr) -> Self {
        Expr::FullAdder(Box::new([a, b, c]))
    }

    /// Returns the constant value, if this is a constant.
    pub fn as_const(&self) -> Option<Logic> {
        match self {
            Expr::Const(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` if this is the constant `value`.
    pub fn is_const(&self, value: Logic) -> bool {
        self.as_const() == Some(value)
    }

    /// Returns the net name, if this is a net reference.
    pub fn as_net(&self) -> Option<&str> {
        match self {
            Expr::Net(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the operand of a negation.
    pub fn as_not(&self) -> Option<&Expr> {
        match self {
            Expr::Unary(UnaryOp::Not, inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Returns the operand list if this is an n-ary node with operator `op`.
    pub fn as_nary(&self, op: NaryOp) -> Option<&[Expr]> {
        match self {
            Expr::Nary(o, operands) if *o == op => Some(operands),
            _ => None,
        }
    }

    /// Returns `true` for constants and net references.
    pub fn is_atom(&self) -> bool {
        matches!(self, Expr::Const(_) | Expr::Net(_))
    }

    /// Returns `true` for an atom or a single negation of an atom.
    ///
    /// Wire forwarding only substitutes simple definitions, which bounds
    /// expression growth.
    pub fn is_simple(&self) -> bool {
        match self {
            Expr::Unary(_, inner) => inner.is_atom(),
            other => other.is_atom(),
        }
    }

    /// Returns the direct operands of this node.
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Net(_) => Vec::new(),
            Expr::Unary(_, inner) => vec![inner.as_ref()],
            Expr::Nary(_, operands) => operands.iter().collect(),
            Expr::Cond(c, t, f) => vec![c.as_ref(), t.as_ref(), f.as_ref()],
            Expr::Carry(ops) | Expr::FullAdder(ops) => ops.iter().collect(),
        }
    }

    /// Returns `true` if `atom` is one of the direct operands.
    ///
    /// This is not a deep search; see [`references`](Expr::references).
    pub fn contains(&self, atom: &Expr) -> bool {
        self.operands().into_iter().any(|op| op == atom)
    }

    /// Returns `true` if `net` appears anywhere in the tree.
    pub fn references(&self, net: &str) -> bool {
        match self {
            Expr::Net(name) => name == net,
            other => other.operands().into_iter().any(|op| op.references(net)),
        }
    }

    /// Returns every referenced net name, in first-occurrence order.
    pub fn referenced_nets(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_nets(&mut out);
        out
    }

    fn collect_nets<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Net(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            other => {
                for op in other.operands() {
                    op.collect_nets(out);
                }
            }
        }
    }

    /// Replaces every reference to `net` with `with`.
    ///
    /// Single pass: the inserted copies of `with` are not searched again, so
    /// replacing `x` with `!x` terminates. Returns `None` if `net` does not
    /// occur.
    pub fn replace(&self, net: &str, with: &Expr) -> Option<Expr> {
        match self {
            Expr::Const(_) => None,
            Expr::Net(name) => (name == net).then(|| with.clone()),
            Expr::Unary(op, inner) => inner
                .replace(net, with)
                .map(|inner| Expr::Unary(*op, Box::new(inner))),
            Expr::Nary(op, operands) => {
                replace_all(operands.iter(), net, with).map(|ops| Expr::Nary(*op, ops))
            }
            Expr::Cond(c, t, f) => {
                let [c, t, f] = replace_three([c.as_ref(), t.as_ref(), f.as_ref()], net, with)?;
                Some(Expr::cond(c, t, f))
            }
            Expr::Carry(ops) => {
                let [a, b, c] = replace_three([&ops[0], &ops[1], &ops[2]], net, with)?;
                Some(Expr::carry(a, b, c))
            }
            Expr::FullAdder(ops) => {
                let [a, b, c] = replace_three([&ops[0], &ops[1], &ops[2]], net, with)?;
                Some(Expr::full_adder(a, b, c))
            }
        }
    }

    /// Returns the same n-ary node with every operand equal to `atom` removed.
    ///
    /// Other node kinds are returned unchanged.
    pub fn without(&self, atom: &Expr) -> Expr {
        match self {
            Expr::Nary(op, operands) => Expr::Nary(
                *op,
                operands.iter().filter(|o| *o != atom).cloned().collect(),
            ),
            other => other.clone(),
        }
    }
}

fn replace_all<'a>(
    operands: impl Iterator<Item = &'a Expr>,
    net: &str,
    with: &Expr,
) -> Option<Vec<Expr>> {
    let mut changed = false;
    let replaced = operands
        .map(|op| match op.replace(net, with) {
            Some(new) => {
                changed = true;
                new
            }
            None => op.clone(),
        })
        .collect();
    changed.then_some(replaced)
}

fn replace_three(operands: [&Expr; 3], net: &str, with: &Expr) -> Option<[Expr; 3]> {
    let replaced = replace_all(operands.into_iter(), net, with)?;
    let mut it = replaced.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(a), Some(b), Some(c)) => Some([a, b, c]),
        _ => None,
    }
}

impl From<Logic> for Expr {
    fn from(value: Logic) -> Self {
        Expr::Const(value)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::net(name)
    }
}
