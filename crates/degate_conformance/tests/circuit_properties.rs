//! Behavior-preservation properties of netlist edits and cleanup stages on
//! random circuits.

use degate_common::Logic;
use degate_config::RuleSet;
use degate_conformance::{
    free_nets, next_state_table, truth_table, ArbitraryCircuit, ArbitraryRegisterCircuit,
};
use degate_clean::Pipeline;
use degate_diagnostics::DiagnosticSink;
use degate_netlist::Netlist;
use quickcheck::{quickcheck, TestResult};

fn output_tables(netlist: &Netlist, free: &[String], flip: &[&str]) -> Vec<Vec<Logic>> {
    netlist
        .outputs
        .iter()
        .map(|output| truth_table(netlist, output, free, flip))
        .collect()
}

quickcheck! {
    fn prop_substitution_keeps_other_nets(c: ArbitraryCircuit, pick: usize) -> bool {
        let mut nl = c.0;
        let names: Vec<String> = nl.comb.keys().cloned().collect();
        let target = names[pick % names.len()].clone();
        let free = free_nets(&nl);
        let before: Vec<(String, Vec<Logic>)> = names
            .iter()
            .filter(|name| **name != target)
            .map(|name| (name.clone(), truth_table(&nl, name, &free, &[])))
            .collect();

        let definition = nl.comb[target.as_str()].clone();
        nl.replace_net(&target, &definition);
        nl.comb.shift_remove(target.as_str());

        before
            .iter()
            .all(|(name, table)| truth_table(&nl, name, &free, &[]) == *table)
    }

    fn prop_stage1_keeps_outputs(c: ArbitraryCircuit) -> TestResult {
        let free = free_nets(&c.0);
        let before = output_tables(&c.0, &free, &[]);
        let rules = RuleSet::default();
        let sink = DiagnosticSink::new();
        let mut pipeline = Pipeline::new(c.0.clone(), &rules, &sink);
        if pipeline.stage1().is_err() {
            return TestResult::discard();
        }
        let after = pipeline.netlist();
        TestResult::from_bool(
            after.outputs == c.0.outputs && output_tables(after, &free, &[]) == before,
        )
    }

    fn prop_inversion_is_invisible(c: ArbitraryRegisterCircuit) -> TestResult {
        let mut nl = c.0;
        let free = free_nets(&nl);
        let outputs = output_tables(&nl, &free, &[]);
        let next: Vec<Logic> = next_state_table(&nl, "r", &free, &[]);

        match nl.invert_register("r") {
            Ok(true) => {}
            Ok(false) => return TestResult::failed(),
            Err(_) => return TestResult::discard(),
        }

        // The stored bit is now the complement of the logical value.
        let flipped_next: Vec<Logic> = next_state_table(&nl, "r", &free, &["r"])
            .into_iter()
            .map(|bit| !bit)
            .collect();
        TestResult::from_bool(output_tables(&nl, &free, &["r"]) == outputs && flipped_next == next)
    }

    fn prop_double_inversion_restores_behavior(c: ArbitraryRegisterCircuit) -> TestResult {
        let mut nl = c.0;
        let free = free_nets(&nl);
        let outputs = output_tables(&nl, &free, &[]);
        let next = next_state_table(&nl, "r", &free, &[]);
        let init = nl.clocked[0].init;
        if nl.invert_register("r").is_err() || nl.invert_register("r").is_err() {
            return TestResult::discard();
        }
        TestResult::from_bool(
            nl.clocked[0].init == init
                && output_tables(&nl, &free, &[]) == outputs
                && next_state_table(&nl, "r", &free, &[]) == next,
        )
    }
}
