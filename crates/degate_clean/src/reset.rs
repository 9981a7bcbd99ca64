//! Recovery of synchronous resets from AND-gated logic.
//!
//! Gate-level netlists implement an active-low synchronous reset as an AND
//! with the reset net somewhere upstream of each register input. The two
//! passes here first move that AND term out of combinational definitions to
//! their uses, then lift it out of register next-state expressions into
//! the register's reset fields.

use crate::error::CleanError;
use crate::pass::{Pass, PassContext};
use degate_common::Logic;
use degate_config::validate_rules;
use degate_expr::{normalize, Expr, NaryOp};
use degate_netlist::Netlist;

/// Returns `true` if `expr` is an AND with `reset` as a direct operand.
fn gated_by(expr: &Expr, reset: &Expr) -> bool {
    expr.as_nary(NaryOp::And).is_some() && expr.contains(reset)
}

/// For each reset, rewrites `n = rst & f` into `n = f` and every use of
/// `n` into `n & rst`. Output ports and clock nets keep their definition.
pub struct ResetPropagatePass;

impl Pass for ResetPropagatePass {
    fn name(&self) -> &'static str {
        "reset_propagate"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        validate_rules(ctx.rules)?;
        let mut moved = 0;
        for reset in ctx.rules.resets.keys() {
            let reset = Expr::net(reset.as_str());
            // Uses rewritten earlier in the sweep may themselves qualify.
            for index in 0..netlist.comb.len() {
                let Some((net, expr)) = netlist.comb.get_index(index) else {
                    continue;
                };
                // Ports and clocks have no expression use to take the term.
                if !gated_by(expr, &reset) || netlist.drives_port_or_clock(net) {
                    continue;
                }
                let (net, stripped) = (net.clone(), normalize(&expr.without(&reset))?);
                netlist.comb[index] = stripped;
                netlist.replace_net(&net, &Expr::and(vec![Expr::net(net.as_str()), reset.clone()]));
                moved += 1;
            }
        }
        Ok(moved)
    }
}

/// Lifts a reset term out of a register's next-state AND.
///
/// Only registers without a reset are touched. The reset becomes
/// unconditional for a register loaded every cycle and enable-gated
/// otherwise; either way it loads `0`, the value the AND produced.
pub struct PromotePass;

impl Pass for PromotePass {
    fn name(&self) -> &'static str {
        "promote"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        validate_rules(ctx.rules)?;
        let mut promoted = 0;
        for reset in ctx.rules.resets.keys() {
            let reset = Expr::net(reset.as_str());
            for ff in &mut netlist.clocked {
                if ff.has_reset() || !gated_by(&ff.value, &reset) {
                    continue;
                }
                ff.value = normalize(&ff.value.without(&reset))?;
                let active = Expr::not(reset.clone());
                if ff.ce.is_const(Logic::One) {
                    ff.reset = active;
                } else {
                    ff.ce_reset = active;
                }
                ff.reset_value = Logic::Zero;
                promoted += 1;
            }
        }
        Ok(promoted)
    }
}
