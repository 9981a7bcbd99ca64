//! The three cleanup stages.
//!
//! Stage 1 only cleans. Stage 2 applies the rule set, recovers resets and
//! adders, and aligns shift chains. Stage 3 aligns carries and declares
//! bundles. Each stage ends with a combinational-loop check and yields a
//! printed snapshot.

use crate::carry::{AlignCarrysPass, CarryFullAdderPass};
use crate::clean::push_clean;
use crate::error::CleanError;
use crate::pass::{run_passes, Pass, PassContext};
use crate::reset::{PromotePass, ResetPropagatePass};
use crate::rules::{BundlePass, InvertFfsPass, OutputPass, RenamePass};
use crate::shift::{AlignShiftsPass, ShiftTrace, TraceShiftsPass};
use degate_config::RuleSet;
use degate_diagnostics::DiagnosticSink;
use degate_netlist::{emit_verilog, Netlist};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What one stage changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage number, 1 to 3.
    pub stage: u8,
    /// Edits per pass name, summed over repeated runs of the same pass.
    pub edits: IndexMap<String, usize>,
    /// Shift chains walked during the stage.
    pub traces: Vec<ShiftTrace>,
}

impl StageReport {
    /// Creates an empty report for `stage`.
    pub fn new(stage: u8) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    /// Adds `edits` to the count for `pass`.
    pub fn record(&mut self, pass: &str, edits: usize) {
        *self.edits.entry(pass.to_string()).or_default() += edits;
    }

    /// Total number of edits across all passes.
    pub fn total_edits(&self) -> usize {
        self.edits.values().sum()
    }
}

/// The netlist as it stood after one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stage number, 1 to 3.
    pub stage: u8,
    /// The printed module.
    pub verilog: String,
    /// The netlist itself.
    pub netlist: Netlist,
    /// What the stage changed.
    pub report: StageReport,
}

/// Drives the stages over an owned netlist.
pub struct Pipeline<'a> {
    netlist: Netlist,
    rules: &'a RuleSet,
    sink: &'a DiagnosticSink,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over `netlist`.
    pub fn new(netlist: Netlist, rules: &'a RuleSet, sink: &'a DiagnosticSink) -> Self {
        Self {
            netlist,
            rules,
            sink,
        }
    }

    /// The netlist in its current state.
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Consumes the pipeline, returning the netlist.
    pub fn into_netlist(self) -> Netlist {
        self.netlist
    }

    /// Stage 1: two clean cycles.
    pub fn stage1(&mut self) -> Result<StageReport, CleanError> {
        let mut passes: Vec<Box<dyn Pass>> = Vec::new();
        push_clean(&mut passes);
        push_clean(&mut passes);
        self.run_stage(1, &passes)
    }

    /// Stage 2: rules, reset recovery, adders, inversion and shift chains.
    pub fn stage2(&mut self) -> Result<StageReport, CleanError> {
        let mut passes: Vec<Box<dyn Pass>> = vec![
            Box::new(RenamePass),
            Box::new(OutputPass),
            Box::new(ResetPropagatePass),
            Box::new(PromotePass),
        ];
        push_clean(&mut passes);
        passes.push(Box::new(CarryFullAdderPass));
        passes.push(Box::new(InvertFfsPass));
        push_clean(&mut passes);
        passes.push(Box::new(AlignShiftsPass));
        push_clean(&mut passes);
        passes.push(Box::new(TraceShiftsPass));
        self.run_stage(2, &passes)
    }

    /// Stage 3: carry alignment and bundles.
    pub fn stage3(&mut self) -> Result<StageReport, CleanError> {
        let mut passes: Vec<Box<dyn Pass>> = vec![Box::new(AlignCarrysPass)];
        push_clean(&mut passes);
        passes.push(Box::new(BundlePass));
        push_clean(&mut passes);
        self.run_stage(3, &passes)
    }

    /// Runs all three stages, snapshotting after each.
    pub fn run(&mut self) -> Result<Vec<Snapshot>, CleanError> {
        let mut snapshots = Vec::with_capacity(3);
        for stage in 1..=3u8 {
            let report = match stage {
                1 => self.stage1()?,
                2 => self.stage2()?,
                _ => self.stage3()?,
            };
            snapshots.push(Snapshot {
                stage,
                verilog: emit_verilog(&self.netlist),
                netlist: self.netlist.clone(),
                report,
            });
        }
        Ok(snapshots)
    }

    fn run_stage(&mut self, stage: u8, passes: &[Box<dyn Pass>]) -> Result<StageReport, CleanError> {
        let mut ctx = PassContext::new(stage, self.rules, self.sink);
        run_passes(passes, &mut self.netlist, &mut ctx)?;
        self.netlist.check_acyclic()?;
        info!(
            stage,
            edits = ctx.report.total_edits(),
            comb = self.netlist.comb.len(),
            clocked = self.netlist.clocked.len(),
            "stage complete"
        );
        Ok(ctx.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use degate_common::Logic;
    use degate_expr::{parse_expr, Expr};

    fn n(name: &str) -> Expr {
        Expr::net(name)
    }

    fn sample() -> Netlist {
        let mut nl = Netlist::new("top");
        for input in ["n1", "n2", "n9"] {
            nl.add_input(input);
        }
        nl.add_output("y");
        nl.declare_register("q", Logic::One);
        nl.define_comb("w", Expr::not(n("n2")));
        nl.define_comb("g", parse_expr("n9&w").unwrap());
        nl.define_comb("y", parse_expr("q ? g : 0").unwrap());
        nl.define_clocked("n1", Expr::ONE, "q", n("g")).unwrap();
        nl
    }

    #[test]
    fn stage1_cleans_twice() {
        let rules = RuleSet::default();
        let sink = DiagnosticSink::new();
        let mut pipeline = Pipeline::new(sample(), &rules, &sink);
        let report = pipeline.stage1().unwrap();
        assert_eq!(report.stage, 1);
        assert!(report.edits["forward"] >= 1);
        let nl = pipeline.netlist();
        assert!(!nl.comb.contains_key("w"));
        assert_eq!(nl.comb["g"].to_string(), "n9&!n2");
        assert_eq!(nl.comb["y"].to_string(), "q&g");
    }

    #[test]
    fn stage2_applies_rules_and_promotes_reset() {
        let mut rules = RuleSet::default();
        rules.rename.insert("n1".into(), "clk".into());
        rules.rename.insert("n9".into(), "rst_n".into());
        rules.resets.insert("rst_n".into(), "0".into());
        rules.output.push("q".into());
        let sink = DiagnosticSink::new();
        let mut pipeline = Pipeline::new(sample(), &rules, &sink);
        pipeline.stage1().unwrap();
        let report = pipeline.stage2().unwrap();
        assert_eq!(report.edits["rename"], 2);
        assert_eq!(report.edits["promote"], 1);
        let nl = pipeline.netlist();
        assert_eq!(nl.outputs, vec!["y", "q"]);
        let ff = &nl.clocked[0];
        assert_eq!(ff.clock, "clk");
        assert_eq!(ff.value.to_string(), "!n2");
        assert_eq!(ff.reset.to_string(), "!rst_n");
        assert_eq!(ff.reset_value, Logic::Zero);
    }

    #[test]
    fn run_returns_three_snapshots() {
        let mut rules = RuleSet::default();
        rules.bundle_wires.insert("bus".into(), vec!["n1".into(), "n2".into()]);
        let sink = DiagnosticSink::new();
        let mut pipeline = Pipeline::new(sample(), &rules, &sink);
        let snapshots = pipeline.run().unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(
            snapshots.iter().map(|s| s.stage).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(!snapshots[1].verilog.contains("wire [2-1:0] bus"));
        assert!(snapshots[2].verilog.contains("wire [2-1:0] bus = {n1,n2};"));
        assert!(snapshots.iter().all(|s| s.verilog.ends_with("endmodule")));
        assert_eq!(snapshots[2].netlist, *pipeline.netlist());
    }

    #[test]
    fn run_is_deterministic() {
        let rules = RuleSet::default();
        let sink = DiagnosticSink::new();
        let first = Pipeline::new(sample(), &rules, &sink).run().unwrap();
        let second = Pipeline::new(sample(), &rules, &sink).run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn loop_is_reported_after_stage() {
        let rules = RuleSet::default();
        let sink = DiagnosticSink::new();
        let mut nl = Netlist::new("top");
        nl.add_output("a");
        nl.define_comb("a", parse_expr("b&c").unwrap());
        nl.define_comb("b", parse_expr("a|d").unwrap());
        let err = Pipeline::new(nl, &rules, &sink).stage1().unwrap_err();
        assert!(matches!(err, CleanError::Internal(_)));
    }

    #[test]
    fn report_serializes() {
        let mut report = StageReport::new(2);
        report.record("forward", 3);
        report.record("forward", 2);
        report.record("unused", 1);
        assert_eq!(report.total_edits(), 6);
        let json = serde_json::to_string(&report).unwrap();
        let back: StageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
