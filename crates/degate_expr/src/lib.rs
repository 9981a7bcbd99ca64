//! Symbolic Boolean expressions over single-bit nets.
//!
//! [`Expr`] is the value every recovered assignment is expressed in:
//! constants, net references, negation, associative AND/OR/XOR, the
//! conditional operator and the two circuit-pattern markers `carry` and
//! `fa`. The crate provides
//!
//! - a textual surface syntax ([`parse_expr`] and the [`Display`](std::fmt::Display)
//!   impl, which round-trip),
//! - the rewrite engine ([`normalize`]) that brings expressions into the
//!   canonical shapes the cleanup passes pattern-match on,
//! - a three-valued evaluator used to check that rewrites preserve function.

#![warn(missing_docs)]

pub mod eval;
pub mod expr;
pub mod normalize;
pub mod parse;
pub mod print;

pub use expr::{Expr, NaryOp, UnaryOp};
pub use normalize::normalize;
pub use parse::{parse_expr, ExprParseError};
