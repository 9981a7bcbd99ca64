//! Pass trait and runner.
//!
//! Provides the [`Pass`] trait implemented by every cleanup pass and the
//! [`run_passes`] function that applies a list of them in order, recording
//! what each one changed.

use crate::error::CleanError;
use crate::pipeline::StageReport;
use degate_config::RuleSet;
use degate_diagnostics::DiagnosticSink;
use degate_netlist::Netlist;
use tracing::debug;

/// Shared state handed to every pass of a stage.
pub struct PassContext<'a> {
    /// Rules driving the rule-based passes.
    pub rules: &'a RuleSet,
    /// Receives pipeline notes.
    pub sink: &'a DiagnosticSink,
    /// What the stage has changed so far.
    pub report: StageReport,
}

impl<'a> PassContext<'a> {
    /// Creates a context with an empty report for `stage`.
    pub fn new(stage: u8, rules: &'a RuleSet, sink: &'a DiagnosticSink) -> Self {
        Self {
            rules,
            sink,
            report: StageReport::new(stage),
        }
    }
}

/// A single cleanup pass.
///
/// Each pass edits the netlist in place and returns how many edits it made;
/// zero means the netlist is unchanged.
pub trait Pass {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Runs the pass on the netlist.
    fn run(&self, netlist: &mut Netlist, ctx: &mut PassContext<'_>) -> Result<usize, CleanError>;
}

/// Runs `passes` in order, stopping at the first error.
///
/// Returns the total number of edits.
pub fn run_passes(
    passes: &[Box<dyn Pass>],
    netlist: &mut Netlist,
    ctx: &mut PassContext<'_>,
) -> Result<usize, CleanError> {
    let mut total = 0;
    for pass in passes {
        let edits = pass.run(netlist, ctx)?;
        debug!(pass = pass.name(), edits, "pass finished");
        ctx.report.record(pass.name(), edits);
        total += edits;
    }
    Ok(total)
}
