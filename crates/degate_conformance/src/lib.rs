//! Conformance test helpers for degate.
//!
//! Provides the full import → clean pipeline as one call, truth-table
//! helpers for checking that a transformation preserves behavior, and
//! `quickcheck` generators for expressions and small synthetic circuits.

#![warn(missing_docs)]

use degate_clean::{CleanError, Pipeline, Snapshot};
use degate_common::Logic;
use degate_config::{load_rules_from_str, ConfigError, RuleFormat, RuleSet};
use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use degate_expr::Expr;
use degate_import::{import_source, ImportError};
use degate_netlist::Netlist;
use quickcheck::{Arbitrary, Gen};

/// Why a pipeline run did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    /// The rules did not load.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The source did not import.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// A cleanup stage failed.
    #[error(transparent)]
    Clean(#[from] CleanError),
}

/// Result of running import and all three cleanup stages.
pub struct PipelineResult {
    /// The netlist as imported, before any stage.
    pub imported: Netlist,
    /// One snapshot per stage.
    pub snapshots: Vec<Snapshot>,
    /// All diagnostics emitted during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineResult {
    /// The netlist after the last stage.
    pub fn last(&self) -> Option<&Netlist> {
        self.snapshots.last().map(|s| &s.netlist)
    }

    /// Printed module after `stage` (1 to 3).
    pub fn verilog(&self, stage: u8) -> Option<&str> {
        self.snapshots
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.verilog.as_str())
    }

    /// Diagnostics carrying `code`, in emission order.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// Number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Parses a JSON rule file.
pub fn rules_from_json(json: &str) -> Result<RuleSet, ConfigError> {
    load_rules_from_str(json, RuleFormat::Json)
}

/// Imports `source` and returns the netlist with the diagnostics emitted.
pub fn import_verilog(source: &str) -> (Result<Netlist, ImportError>, Vec<Diagnostic>) {
    let sink = DiagnosticSink::new();
    let result = import_source(source, &sink);
    (result, sink.take_all())
}

/// Runs import and the three cleanup stages on `source`.
pub fn full_pipeline(source: &str, rules: &RuleSet) -> Result<PipelineResult, ConformanceError> {
    let sink = DiagnosticSink::new();
    let imported = import_source(source, &sink)?;
    let snapshots = Pipeline::new(imported.clone(), rules, &sink).run()?;
    Ok(PipelineResult {
        imported,
        snapshots,
        diagnostics: sink.take_all(),
    })
}

/// Runs the full pipeline with rules given as JSON.
pub fn full_pipeline_json(source: &str, rules_json: &str) -> Result<PipelineResult, ConformanceError> {
    let rules = rules_from_json(rules_json)?;
    full_pipeline(source, &rules)
}

/// Nets a combinational definition may read without defining them: inputs
/// and registers, in that order, without duplicates.
pub fn free_nets(netlist: &Netlist) -> Vec<String> {
    let mut nets: Vec<String> = netlist.inputs.clone();
    let registers = netlist
        .registers
        .keys()
        .chain(netlist.clocked.iter().map(|ff| &ff.dest));
    for name in registers {
        if !nets.contains(name) {
            nets.push(name.clone());
        }
    }
    nets
}

/// Value of `net` under every two-valued assignment of `free`.
///
/// Assignment `i` gives `free[k]` the value of bit `k` of `i`; `flip`
/// lists free nets whose assigned value is complemented before evaluation.
/// Nets outside `free` read as `X`.
pub fn truth_table(netlist: &Netlist, net: &str, free: &[String], flip: &[&str]) -> Vec<Logic> {
    (0..1u32 << free.len())
        .map(|bits| {
            let lookup = |name: &str| match free.iter().position(|f| f == name) {
                Some(k) => {
                    let value = Logic::from_bool(bits >> k & 1 == 1);
                    if flip.contains(&name) {
                        !value
                    } else {
                        value
                    }
                }
                None => Logic::X,
            };
            netlist.eval_net(net, &lookup)
        })
        .collect()
}

/// Next value of register `dest` under every assignment of `free`, with the
/// same numbering and `flip` handling as [`truth_table`]. Combinational nets
/// read by the register are evaluated through the netlist.
///
/// Empty if `dest` has no clocked element.
pub fn next_state_table(netlist: &Netlist, dest: &str, free: &[String], flip: &[&str]) -> Vec<Logic> {
    let Some(ff) = netlist.find_clocked(dest) else {
        return Vec::new();
    };
    (0..1u32 << free.len())
        .map(|bits| {
            let base = |name: &str| match free.iter().position(|f| f == name) {
                Some(k) => {
                    let value = Logic::from_bool(bits >> k & 1 == 1);
                    if flip.contains(&name) {
                        !value
                    } else {
                        value
                    }
                }
                None => Logic::X,
            };
            let lookup = |name: &str| {
                if netlist.comb.contains_key(name) {
                    netlist.eval_net(name, &base)
                } else {
                    base(name)
                }
            };
            ff.next_state(&lookup, base(dest))
        })
        .collect()
}

/// Builds a random expression over `nets` with at most `depth` levels of
/// operators. Constants are `0` and `1` only.
pub fn gen_expr(g: &mut Gen, nets: &[String], depth: usize) -> Expr {
    if depth == 0 {
        return gen_leaf(g, nets);
    }
    let mut sub = |g: &mut Gen| {
        let depth = usize::arbitrary(g) % depth;
        gen_expr(g, nets, depth)
    };
    match u8::arbitrary(g) % 9 {
        0 => Expr::not(sub(g)),
        1 => Expr::and(gen_operands(g, &mut sub)),
        2 => Expr::or(gen_operands(g, &mut sub)),
        3 => Expr::xor(gen_operands(g, &mut sub)),
        4 => Expr::cond(sub(g), sub(g), sub(g)),
        5 => Expr::carry(sub(g), sub(g), sub(g)),
        6 => Expr::full_adder(sub(g), sub(g), sub(g)),
        _ => gen_leaf(g, nets),
    }
}

fn gen_operands(g: &mut Gen, sub: &mut impl FnMut(&mut Gen) -> Expr) -> Vec<Expr> {
    let count = 2 + usize::arbitrary(g) % 2;
    (0..count).map(|_| sub(g)).collect()
}

fn gen_leaf(g: &mut Gen, nets: &[String]) -> Expr {
    match u8::arbitrary(g) % 8 {
        0 => Expr::ZERO,
        1 => Expr::ONE,
        _ if nets.is_empty() => Expr::ZERO,
        _ => Expr::net(nets[usize::arbitrary(g) % nets.len()].as_str()),
    }
}

fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

/// An expression over the nets `a` to `d`.
#[derive(Clone, Debug)]
pub struct ArbitraryExpr(pub Expr);

impl Arbitrary for ArbitraryExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let nets: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let depth = 1 + usize::arbitrary(g) % 4;
        Self(gen_expr(g, &nets, depth))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let operands: Vec<Self> = self.0.operands().into_iter().cloned().map(Self).collect();
        Box::new(operands.into_iter())
    }
}

/// A small acyclic combinational circuit.
///
/// Inputs `i0`..`i3`; nets `n0`.. each read inputs and earlier nets only.
/// The last net is always an output, the others sometimes.
#[derive(Clone, Debug)]
pub struct ArbitraryCircuit(pub Netlist);

impl Arbitrary for ArbitraryCircuit {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut netlist = Netlist::new("top");
        let mut readable = names("i", 4);
        for input in &readable {
            netlist.add_input(input.as_str());
        }
        let count = 1 + usize::arbitrary(g) % 5;
        for (k, net) in names("n", count).into_iter().enumerate() {
            let depth = 1 + usize::arbitrary(g) % 3;
            netlist.define_comb(net.as_str(), gen_expr(g, &readable, depth));
            if k + 1 == count || u8::arbitrary(g) % 3 == 0 {
                netlist.add_output(net.as_str());
            }
            readable.push(net);
        }
        Self(netlist)
    }
}

/// A circuit around one register `r`, clocked by `clk`, whose value fans
/// out to every combinational net.
///
/// Inputs `i0`..`i2`; nets `n0`.. read inputs, `r` and earlier nets and are
/// all outputs.
#[derive(Clone, Debug)]
pub struct ArbitraryRegisterCircuit(pub Netlist);

impl Arbitrary for ArbitraryRegisterCircuit {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut netlist = Netlist::new("top");
        netlist.add_input("clk");
        let mut readable = names("i", 3);
        for input in &readable {
            netlist.add_input(input.as_str());
        }
        readable.push("r".to_string());
        netlist.declare_register("r", Logic::from_bool(bool::arbitrary(g)));

        let count = 1 + usize::arbitrary(g) % 4;
        for net in names("n", count) {
            let expr = Expr::and(vec![Expr::net("r"), gen_expr(g, &readable, 2)]);
            let expr = if bool::arbitrary(g) { Expr::not(expr) } else { expr };
            netlist.define_comb(net.as_str(), expr);
            netlist.add_output(net.as_str());
            readable.push(net);
        }

        let ce = if bool::arbitrary(g) { Expr::ONE } else { Expr::net("i0") };
        let value = gen_expr(g, &readable, 2);
        // The register was declared just above.
        let _ = netlist.define_clocked("clk", ce, "r", value);
        Self(netlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_nets_lists_inputs_then_registers() {
        let mut nl = Netlist::new("top");
        nl.add_input("a");
        nl.declare_register("q", Logic::Zero);
        nl.define_clocked("a", Expr::ONE, "q", Expr::net("a")).unwrap();
        assert_eq!(free_nets(&nl), vec!["a", "q"]);
    }

    #[test]
    fn truth_table_enumerates_assignments() {
        let mut nl = Netlist::new("top");
        nl.add_input("a");
        nl.add_input("b");
        nl.define_comb("y", Expr::and(vec![Expr::net("a"), Expr::not(Expr::net("b"))]));
        let free = free_nets(&nl);
        let table = truth_table(&nl, "y", &free, &[]);
        assert_eq!(table, vec![Logic::Zero, Logic::One, Logic::Zero, Logic::Zero]);
        let flipped = truth_table(&nl, "y", &free, &["b"]);
        assert_eq!(flipped, vec![Logic::Zero, Logic::Zero, Logic::Zero, Logic::One]);
    }

    #[test]
    fn generated_circuits_are_acyclic() {
        let mut g = Gen::new(8);
        for _ in 0..50 {
            let ArbitraryCircuit(nl) = ArbitraryCircuit::arbitrary(&mut g);
            assert!(nl.check_acyclic().is_ok());
            assert!(!nl.outputs.is_empty());
            let ArbitraryRegisterCircuit(nl) = ArbitraryRegisterCircuit::arbitrary(&mut g);
            assert!(nl.check_acyclic().is_ok());
            assert_eq!(nl.clocked.len(), 1);
        }
    }

    #[test]
    fn pipeline_on_minimal_module() {
        let result = full_pipeline(
            "module top(input a, output y);\nwire y;\nassign y = a;\nendmodule\n",
            &RuleSet::default(),
        )
        .unwrap();
        assert_eq!(result.snapshots.len(), 3);
        assert!(result.verilog(3).unwrap().contains("assign y = a;"));
        assert_eq!(result.warning_count(), 0);
        assert_eq!(result.last().unwrap().outputs, vec!["y"]);
    }
}
