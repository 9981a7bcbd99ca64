//! Passes that apply the rule set directly: renames, extra outputs,
//! polarity inversion and bundles.

use crate::error::CleanError;
use crate::pass::{Pass, PassContext};
use degate_netlist::Netlist;
use tracing::debug;

/// Renames nets per `rename`, in rule order.
pub struct RenamePass;

impl Pass for RenamePass {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut renamed = 0;
        for (prev, new) in ctx.rules.rename.iter() {
            if !knows(netlist, prev) {
                debug!(net = %prev, "rename rule for unknown net");
                continue;
            }
            netlist.rename_net(prev, new);
            renamed += 1;
        }
        Ok(renamed)
    }
}

fn knows(netlist: &Netlist, net: &str) -> bool {
    netlist.inputs.iter().any(|i| i == net)
        || netlist.comb.contains_key(net)
        || netlist.registers.contains_key(net)
        || netlist.is_used(net)
}

/// Appends the `output` nets to the output ports.
pub struct OutputPass;

impl Pass for OutputPass {
    fn name(&self) -> &'static str {
        "output"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut added = 0;
        for net in &ctx.rules.output {
            if !netlist.outputs.contains(net) {
                netlist.add_output(net.as_str());
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Flips the stored polarity of every `invert_ff` register.
pub struct InvertFfsPass;

impl Pass for InvertFfsPass {
    fn name(&self) -> &'static str {
        "invert_ffs"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        let mut inverted = 0;
        for net in &ctx.rules.invert_ff {
            if netlist.invert_register(net)? {
                inverted += 1;
            } else {
                debug!(net = %net, "not an invertible register");
            }
        }
        Ok(inverted)
    }
}

/// Declares the `bundle_wires` groupings.
pub struct BundlePass;

impl Pass for BundlePass {
    fn name(&self) -> &'static str {
        "bundle"
    }

    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError> {
        for (name, nets) in &ctx.rules.bundle_wires {
            netlist.bundles.insert(name.clone(), nets.clone());
        }
        Ok(ctx.rules.bundle_wires.len())
    }
}
