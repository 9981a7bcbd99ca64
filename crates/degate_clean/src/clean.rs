//! The clean cycle: wire forwarding, normalization and dead-net removal.
//!
//! Forwarding a trivial definition into its consumers exposes new rewrite
//! opportunities and leaves the forwarded net unreferenced, so the three
//! passes always run together and in this order.

use crate::error::CleanError;
use crate::pass::{Pass, PassContext};
use degate_expr::{normalize, Expr};
use degate_netlist::Netlist;

/// Substitutes every simple combinational definition (a constant, a net or
/// a single negation of one) into all of its consumers.
pub struct ForwardPass;

impl Pass for ForwardPass {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn run(&self, netlist: &mut Netlist, _ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut forwarded = 0;
        // Definitions are read back after every substitution, so a chain of
        // aliases collapses in a single sweep.
        for index in 0..netlist.comb.len() {
            let Some((net, expr)) = netlist.comb.get_index(index) else {
                continue;
            };
            if !expr.is_simple() || expr.references(net) {
                continue;
            }
            let (net, expr) = (net.clone(), expr.clone());
            if netlist.replace_net(&net, &expr) {
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }
}

/// Normalizes every combinational and clocked expression.
pub struct OptimizePass;

impl Pass for OptimizePass {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn run(&self, netlist: &mut Netlist, _ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut changed = 0;
        for expr in netlist.comb.values_mut() {
            changed += usize::from(normalize_in_place(expr)?);
        }
        for ff in &mut netlist.clocked {
            for expr in [&mut ff.ce, &mut ff.value, &mut ff.reset, &mut ff.ce_reset] {
                changed += usize::from(normalize_in_place(expr)?);
            }
        }
        Ok(changed)
    }
}

fn normalize_in_place(expr: &mut Expr) -> Result<bool, CleanError> {
    let normalized = normalize(expr)?;
    if normalized == *expr {
        return Ok(false);
    }
    *expr = normalized;
    Ok(true)
}

/// Deletes combinational nets that are neither outputs nor referenced.
///
/// One sweep in definition order; a net that only becomes dead because a
/// later net was removed goes on the next clean cycle.
pub struct UnusedPass;

impl Pass for UnusedPass {
    fn name(&self) -> &'static str {
        "unused"
    }

    fn run(&self, netlist: &mut Netlist, _ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let names: Vec<String> = netlist.comb.keys().cloned().collect();
        let mut removed = 0;
        for name in names {
            if !netlist.is_used(&name) {
                netlist.comb.shift_remove(&name);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Appends one clean cycle to `passes`.
pub fn push_clean(passes: &mut Vec<Box<dyn Pass>>) {
    passes.push(Box::new(ForwardPass));
    passes.push(Box::new(OptimizePass));
    passes.push(Box::new(UnusedPass));
}
