//! The rewrite engine.
//!
//! [`normalize`] makes one bottom-up pass: operands are normalized first,
//! then the first rule matching the current node fires. A rule whose result
//! is a new tree re-normalizes that tree; there is no fixed-point loop at
//! the top level. Callers reach deeper fixed points by running the cleanup
//! cycle again.
//!
//! The rules keep AND as the canonical connective: `!(a|b)` becomes
//! `!a&!b`, while `!(a&b)` is left alone.

use crate::expr::{Expr, NaryOp, UnaryOp};
use degate_common::{DegateResult, InternalError, Logic};

/// Rewrites `expr` into its canonical shape.
///
/// Fails only on an XOR left without operands (for example `1^1` after
/// constant folding), which no well-formed netlist produces.
pub fn normalize(expr: &Expr) -> DegateResult<Expr> {
    match expr {
        Expr::Const(_) | Expr::Net(_) => Ok(expr.clone()),
        Expr::Unary(op, inner) => {
            let inner = normalize(inner)?;
            match op {
                UnaryOp::Not => normalize_not(inner),
                _ => Ok(Expr::Unary(*op, Box::new(inner))),
            }
        }
        Expr::Nary(op, operands) => {
            let operands = operands.iter().map(normalize).collect::<DegateResult<Vec<_>>>()?;
            match op {
                NaryOp::And => normalize_and(operands, true),
                NaryOp::Or => normalize_or(operands),
                NaryOp::Xor => normalize_xor(operands),
            }
        }
        Expr::Cond(c, t, f) => normalize_cond(normalize(c)?, normalize(t)?, normalize(f)?),
        Expr::Carry(ops) => {
            let [a, b, c] = normalize_three(ops)?;
            // Swap a constant first operand into the second slot, unless that
            // slot already holds one.
            if a.as_const().is_some_and(Logic::is_known) && b.as_const().is_none() {
                Ok(Expr::carry(b, a, c))
            } else {
                Ok(Expr::carry(a, b, c))
            }
        }
        Expr::FullAdder(ops) => {
            let [a, b, c] = normalize_three(ops)?;
            Ok(Expr::full_adder(a, b, c))
        }
    }
}

fn normalize_three(ops: &[Expr; 3]) -> DegateResult<[Expr; 3]> {
    Ok([normalize(&ops[0])?, normalize(&ops[1])?, normalize(&ops[2])?])
}

fn normalize_cond(c: Expr, t: Expr, f: Expr) -> DegateResult<Expr> {
    // c ? t : 0  ->  c & t
    if f.is_const(Logic::Zero) {
        return normalize(&Expr::and(vec![c, t]));
    }
    // c ? 0 : f  ->  !c & f
    if t.is_const(Logic::Zero) {
        return normalize(&Expr::and(vec![Expr::not(c), f]));
    }
    // c ? t : 1  ->  !c | t
    if f.is_const(Logic::One) {
        return normalize(&Expr::or(vec![Expr::not(c), t]));
    }
    // c ? 1 : f  ->  c | f
    if t.is_const(Logic::One) {
        return normalize(&Expr::or(vec![c, f]));
    }
    // c ? t : !t  ->  !(c ^ t)
    if f.as_not() == Some(&t) {
        return normalize(&Expr::not(Expr::xor(vec![c, t])));
    }
    // c ? !f : f  ->  c ^ f
    if t.as_not() == Some(&f) {
        return normalize(&Expr::xor(vec![c, f]));
    }
    // c ? !x : !y  ->  !(c ? x : y)
    if let (Some(x), Some(y)) = (t.as_not(), f.as_not()) {
        return normalize(&Expr::not(Expr::cond(c, x.clone(), y.clone())));
    }
    // c ? t : (t & z)  ->  t & (c ? 1 : z)
    if t.is_atom() && f.as_nary(NaryOp::And).is_some() && f.contains(&t) {
        let rest = f.without(&t);
        return normalize(&Expr::and(vec![t, Expr::cond(c, Expr::ONE, rest)]));
    }
    // c ? (f & z) : f  ->  f & (c ? z : 1)
    if f.is_atom() && t.as_nary(NaryOp::And).is_some() && t.contains(&f) {
        let rest = t.without(&f);
        return normalize(&Expr::and(vec![f, Expr::cond(c, rest, Expr::ONE)]));
    }
    factor_shared_and(c, t, f)
}

/// `c ? (s & x) : (s & y)  ->  s & (c ? x : y)` for the first net `s` the
/// two AND branches share.
fn factor_shared_and(c: Expr, t: Expr, f: Expr) -> DegateResult<Expr> {
    let shared = match (t.as_nary(NaryOp::And), f.as_nary(NaryOp::And)) {
        (Some(left), Some(right)) => left
            .iter()
            .find(|op| matches!(op, Expr::Net(_)) && right.contains(op))
            .cloned(),
        _ => None,
    };
    match shared {
        Some(s) => {
            let branch = Expr::cond(c, t.without(&s), f.without(&s));
            normalize(&Expr::and(vec![s, branch]))
        }
        None => Ok(Expr::cond(c, t, f)),
    }
}

fn normalize_not(inner: Expr) -> DegateResult<Expr> {
    match inner {
        Expr::Unary(UnaryOp::Not, x) => normalize(&x),
        Expr::Const(Logic::Zero) => Ok(Expr::ONE),
        Expr::Const(Logic::One) => Ok(Expr::ZERO),
        Expr::Nary(NaryOp::Or, operands) => {
            // De Morgan towards AND. The result is not turned back into a
            // negated OR, which would undo this rule.
            let negated = operands
                .into_iter()
                .map(normalize_not)
                .collect::<DegateResult<Vec<_>>>()?;
            normalize_and(negated, false)
        }
        other => Ok(Expr::not(other)),
    }
}

fn normalize_and(operands: Vec<Expr>, de_morgan: bool) -> DegateResult<Expr> {
    if operands.is_empty() {
        return Ok(Expr::ONE);
    }
    if operands.iter().any(|op| op.is_const(Logic::Zero)) {
        return Ok(Expr::ZERO);
    }
    if operands.iter().any(|op| op.is_const(Logic::One)) {
        return normalize(&Expr::and(operands).without(&Expr::ONE));
    }
    if operands.len() == 1 {
        return Ok(operands.into_iter().next().unwrap_or(Expr::ONE));
    }
    if let Some(flat) = flatten_trailing(NaryOp::And, &operands) {
        return normalize(&flat);
    }
    if de_morgan && operands.iter().all(|op| op.as_not().is_some()) {
        let inner = operands
            .iter()
            .filter_map(|op| op.as_not().cloned())
            .collect();
        return normalize(&Expr::not(Expr::or(inner)));
    }
    Ok(Expr::and(operands))
}

fn normalize_or(operands: Vec<Expr>) -> DegateResult<Expr> {
    if operands.is_empty() {
        return Ok(Expr::ZERO);
    }
    if operands.len() == 1 {
        return Ok(operands.into_iter().next().unwrap_or(Expr::ZERO));
    }
    if let Some(flat) = flatten_trailing(NaryOp::Or, &operands) {
        return normalize(&flat);
    }
    if operands.iter().all(|op| op.as_not().is_some()) {
        let inner = operands
            .iter()
            .filter_map(|op| op.as_not().cloned())
            .collect();
        return normalize(&Expr::not(Expr::and(inner)));
    }
    Ok(Expr::or(operands))
}

fn normalize_xor(mut operands: Vec<Expr>) -> DegateResult<Expr> {
    if operands.is_empty() {
        return Err(InternalError::new("xor left without operands"));
    }
    if operands.len() == 1 {
        return Ok(operands.remove(0));
    }

    // Pull negations out, tracking parity.
    let mut negated = 0usize;
    let operands: Vec<Expr> = operands
        .into_iter()
        .map(|op| match op {
            Expr::Unary(UnaryOp::Not, inner) => {
                negated += 1;
                *inner
            }
            other => other,
        })
        .collect();
    if negated % 2 == 1 {
        return normalize(&Expr::not(Expr::xor(operands)));
    }
    if negated > 0 {
        return normalize(&Expr::xor(operands));
    }

    // Fold constant ones, tracking parity.
    let ones = operands.iter().filter(|op| op.is_const(Logic::One)).count();
    if ones > 0 {
        let rest = Expr::xor(operands).without(&Expr::ONE);
        return if ones % 2 == 1 {
            normalize(&Expr::not(rest))
        } else {
            normalize(&rest)
        };
    }

    if let Some(flat) = flatten_trailing(NaryOp::Xor, &operands) {
        return normalize(&flat);
    }
    Ok(Expr::xor(operands))
}

/// Splices a trailing operand with the same operator into its parent. The
/// nested operands come first.
fn flatten_trailing(op: NaryOp, operands: &[Expr]) -> Option<Expr> {
    let (last, init) = operands.split_last()?;
    let nested = last.as_nary(op)?;
    let merged = nested.iter().chain(init.iter()).cloned().collect();
    Some(Expr::nary(op, merged))
}

impl Expr {
    /// Shorthand for [`normalize`].
    pub fn normalize(&self) -> DegateResult<Expr> {
        normalize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expr;

    fn norm(text: &str) -> String {
        normalize(&parse_expr(text).unwrap()).unwrap().to_string()
    }

    #[test]
    fn conditional_with_zero_else() {
        let e = Expr::cond(Expr::net("cond"), Expr::net("t"), Expr::ZERO);
        assert_eq!(
            normalize(&e).unwrap(),
            Expr::and(vec![Expr::net("cond"), Expr::net("t")])
        );
    }

    #[test]
    fn conditional_constant_branches() {
        assert_eq!(norm("c ? 0 : f"), "!c&f");
        assert_eq!(norm("c ? t : 1"), "!c|t");
        assert_eq!(norm("c ? 1 : f"), "c|f");
    }

    #[test]
    fn conditional_complementary_branches() {
        assert_eq!(norm("c ? t : !t"), "!(c^t)");
        assert_eq!(norm("c ? !f : f"), "c^f");
    }

    #[test]
    fn conditional_both_negated() {
        assert_eq!(norm("c ? !x : !y"), "!(c ? x : y)");
    }

    #[test]
    fn conditional_factors_branch_atom() {
        assert_eq!(norm("c ? y : y&z"), "y&(c|z)");
        assert_eq!(norm("c ? y&z : y"), "y&(!c|z)");
    }

    #[test]
    fn conditional_factors_shared_and_operand() {
        assert_eq!(norm("c ? s&x : s&y"), "s&(c ? x : y)");
        assert_eq!(norm("c ? s&x : y"), "c ? s&x : y");
    }

    #[test]
    fn double_negation_and_constants() {
        assert_eq!(norm("!!a"), "a");
        assert_eq!(norm("!1"), "0");
        assert_eq!(norm("!0"), "1");
    }

    #[test]
    fn de_morgan_prefers_and() {
        assert_eq!(norm("!(a|b)"), "!a&!b");
        assert_eq!(norm("!(a&b)"), "!(a&b)");
        assert_eq!(norm("!(!a|b)"), "a&!b");
    }

    #[test]
    fn and_rules() {
        assert_eq!(norm("a&0&b"), "0");
        assert_eq!(norm("a&1&b"), "a&b");
        assert_eq!(norm("1&a"), "a");
        assert_eq!(norm("a&(b&c)"), "b&c&a");
        assert_eq!(norm("!a&!b"), "!a&!b");
    }

    #[test]
    fn or_rules() {
        assert_eq!(norm("a|(b|c)"), "b|c|a");
        assert_eq!(norm("!a|!b"), "!(a&b)");
        assert_eq!(norm("a|1"), "a|1");
    }

    #[test]
    fn xor_negation_parity() {
        assert_eq!(norm("!a^b"), "!(a^b)");
        assert_eq!(norm("!a^!b"), "a^b");
        assert_eq!(norm("!a^!b^!c"), "!(a^b^c)");
    }

    #[test]
    fn xor_constant_parity() {
        assert_eq!(norm("a^1"), "!a");
        assert_eq!(norm("a^1^b^1"), "a^b");
        assert_eq!(norm("a^(b^c)"), "b^c^a");
    }

    #[test]
    fn xor_without_operands_is_internal_error() {
        let e = parse_expr("1^1").unwrap();
        assert!(normalize(&e).is_err());
    }

    #[test]
    fn carry_moves_constant_to_second_slot() {
        assert_eq!(norm("carry(1, a, b)"), "carry(a, 1, b)");
        assert_eq!(norm("carry(a, 0, b)"), "carry(a, 0, b)");
        assert_eq!(norm("carry(0, 1, b)"), "carry(0, 1, b)");
    }

    #[test]
    fn unknown_constant_is_left_alone() {
        assert_eq!(norm("a&1'bx"), "a&1'bx");
        assert_eq!(norm("!1'bx"), "!1'bx");
    }

    #[test]
    fn normal_forms_are_stable() {
        for text in [
            "!(a|b|c)",
            "c ? s&x : s&y",
            "!a^b^1",
            "a&(b|!(c|d))",
            "s ? !x : !y",
            "!(a|0)&b",
        ] {
            let once = normalize(&parse_expr(text).unwrap()).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "not stable for {text}");
        }
    }
}
