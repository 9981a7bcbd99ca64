//! Adder recovery.
//!
//! A ripple adder bit is a `carry(a, b, c)` majority feeding the next bit
//! plus a three-input XOR producing the sum. Once the carry is known, the
//! matching XOR among the consumers of its inputs is rewritten to
//! `fa(a, b, c)` so the pair reads as one full adder.

use crate::error::CleanError;
use crate::pass::{Pass, PassContext};
use degate_common::Logic;
use degate_diagnostics::{Diagnostic, DiagnosticCode};
use degate_expr::{Expr, NaryOp};
use degate_netlist::Netlist;
use tracing::debug;

/// The signal behind one carry operand: a net, or the inner expression of a
/// single negation. Constants and other shapes have none.
fn carry_target(operand: &Expr) -> Option<&Expr> {
    match operand.as_not() {
        Some(inner) => Some(inner),
        None => operand.as_net().map(|_| operand),
    }
}

/// Returns `true` if `expr` is an XOR over exactly `targets`, negated when
/// `negated` is set.
fn is_sum(expr: &Expr, targets: &[&Expr], negated: bool) -> bool {
    let xor = if negated {
        match expr.as_not() {
            Some(inner) => inner,
            None => return false,
        }
    } else {
        expr
    };
    match xor.as_nary(NaryOp::Xor) {
        Some(operands) => {
            operands.len() == targets.len() && targets.iter().all(|target| xor.contains(target))
        }
        None => false,
    }
}

/// Rewrites the sum XOR paired with each carry into a full adder.
///
/// Normalization pulls operand negations and constant ones out of an XOR,
/// so the sum of `carry(!a, b, c)` reads `!(a^b^c)` and the sum of
/// `carry(a, b, 1)` reads `!(a^b)`. The expected outer negation is
/// therefore the parity of a negated first operand and a constant-one
/// operand.
pub struct CarryFullAdderPass;

impl Pass for CarryFullAdderPass {
    fn name(&self) -> &'static str {
        "carry_full_adder"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let carries: Vec<(String, [Expr; 3])> = netlist
            .comb
            .iter()
            .filter_map(|(net, expr)| match expr {
                Expr::Carry(ops) => Some((net.clone(), (**ops).clone())),
                _ => None,
            })
            .collect();

        let mut recognised = 0;
        for (carry_net, ops) in carries {
            let targets: Vec<&Expr> = ops.iter().filter_map(carry_target).collect();
            let inverted_first = ops[0].as_not().is_some();
            let constant_one = ops.iter().any(|op| op.is_const(Logic::One));
            let negated = inverted_first != constant_one;

            let target_nets: Vec<&str> = targets
                .iter()
                .flat_map(|target| target.referenced_nets())
                .collect();
            let consumers = netlist.find_consumers(&target_nets);
            let Some(sum_net) = consumers
                .into_iter()
                .find(|net| is_sum(&netlist.comb[net.as_str()], &targets, negated))
            else {
                debug!(carry = %carry_net, "no matching sum");
                continue;
            };

            let [a, b, c] = ops.clone();
            netlist.define_comb(sum_net.as_str(), Expr::full_adder(a, b, c));
            ctx.sink.emit(
                Diagnostic::note(
                    DiagnosticCode::FULL_ADDER,
                    format!("`{sum_net}` is the sum of full adder with carry `{carry_net}`"),
                )
                .with_note(format!("operands: {}, {}, {}", ops[0], ops[1], ops[2])),
            );
            recognised += 1;
        }
        Ok(recognised)
    }
}

/// Inverts registers that only ever reach a carry through a negation in its
/// first operand, so the adder reads with positive operands.
///
/// Candidates are collected before any inversion; a register named by
/// several carries is inverted once.
pub struct AlignCarrysPass;

impl Pass for AlignCarrysPass {
    fn name(&self) -> &'static str {
        "align_carrys"
    }

    fn run(&self, netlist: &mut Netlist, _ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut registers: Vec<String> = Vec::new();
        for expr in netlist.comb.values() {
            let Expr::Carry(ops) = expr else {
                continue;
            };
            let Some(name) = ops[0].as_not().and_then(Expr::as_net) else {
                continue;
            };
            if netlist.find_clocked(name).is_some() && !registers.iter().any(|r| r == name) {
                registers.push(name.to_string());
            }
        }
        let mut inverted = 0;
        for name in &registers {
            if netlist.invert_register(name)? {
                inverted += 1;
            } else {
                debug!(net = %name, "carry operand drives a port or clock, left negated");
            }
        }
        Ok(inverted)
    }
}
