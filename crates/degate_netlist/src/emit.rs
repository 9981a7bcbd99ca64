//! Verilog serialization of a [`Netlist`].
//!
//! Layout: module header, the two helper functions, declarations, continuous
//! assignments, then one `always @(posedge clk)` block per clock grouping
//! its elements into an unconditional list, clock-enable blocks, reset
//! blocks and enable-gated reset blocks, in that order.

use crate::netlist::Netlist;
use degate_common::Logic;
use degate_expr::Expr;
use indexmap::IndexMap;

/// Helper implementing the `carry` pattern marker.
pub const CARRY_FUNCTION: &str =
    "function carry(input a, input b, input c); carry = (a&b) | ((a|b) & c); endfunction";

/// Helper implementing the `fa` pattern marker.
pub const FA_FUNCTION: &str = "function fa(input a, input b, input c); fa = a^b^c; endfunction";

#[derive(Default)]
struct ClockBlock {
    unconditional: Vec<String>,
    enabled: IndexMap<String, Vec<String>>,
    reset: IndexMap<String, Vec<String>>,
    enabled_reset: IndexMap<String, Vec<String>>,
}

/// Renders `netlist` as a self-contained Verilog module.
pub fn emit_verilog(netlist: &Netlist) -> String {
    let mut out: Vec<String> = Vec::new();

    let ports: Vec<String> = netlist
        .inputs
        .iter()
        .map(|i| format!("input {i}"))
        .chain(netlist.outputs.iter().map(|o| format!("output {o}")))
        .collect();
    let name = if netlist.name.is_empty() { "top" } else { netlist.name.as_str() };
    out.push(format!("module {name}({});", ports.join(", ")));
    out.push(CARRY_FUNCTION.to_string());
    out.push(FA_FUNCTION.to_string());

    for net in netlist.comb.keys() {
        out.push(format!("wire {net};"));
    }
    for ff in &netlist.clocked {
        out.push(format!("reg {} = {};", ff.dest, ff.init.verilog()));
    }
    for (name, nets) in &netlist.bundles {
        out.push(format!(
            "wire [{}-1:0] {name} = {{{}}};",
            nets.len(),
            nets.join(",")
        ));
    }
    for (net, expr) in &netlist.comb {
        out.push(format!("assign {net} = {expr};"));
    }

    let mut clocks: IndexMap<&str, ClockBlock> = IndexMap::new();
    for ff in &netlist.clocked {
        let block = clocks.entry(ff.clock.as_str()).or_default();
        if ff.ce.is_const(Logic::One) {
            block
                .unconditional
                .push(format!("    {} <= {};", ff.dest, ff.value));
        } else {
            block
                .enabled
                .entry(ff.ce.to_string())
                .or_default()
                .push(format!("        {} <= {};", ff.dest, ff.value));
        }
        let reset_line = format!("        {} <= {};", ff.dest, ff.reset_value.verilog());
        if !ff.reset.is_const(Logic::Zero) {
            block
                .reset
                .entry(ff.reset.to_string())
                .or_default()
                .push(reset_line.clone());
        }
        if !ff.ce_reset.is_const(Logic::Zero) {
            let cond = Expr::and(vec![ff.ce.clone(), ff.ce_reset.clone()]);
            block
                .enabled_reset
                .entry(cond.to_string())
                .or_default()
                .push(reset_line);
        }
    }

    for (clock, block) in &clocks {
        out.push(format!("always @(posedge {clock})"));
        out.push("begin".to_string());
        out.extend(block.unconditional.iter().cloned());
        for group in [&block.enabled, &block.reset, &block.enabled_reset] {
            for (cond, lines) in group {
                out.push(format!("    if ({cond})"));
                out.push("    begin".to_string());
                out.extend(lines.iter().cloned());
                out.push("    end".to_string());
            }
        }
        out.push("end".to_string());
    }

    out.push("endmodule".to_string());
    out.join("\n")
}
