//! Structural checks over the net dependency graph.

use crate::netlist::Netlist;
use degate_common::{DegateResult, InternalError};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

impl Netlist {
    /// Builds the combinational dependency graph: one node per
    /// combinational net, an edge from each referenced combinational net to
    /// the net whose definition references it.
    pub fn comb_graph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::new();
        let nodes: HashMap<&str, NodeIndex> = self
            .comb
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();
        for (name, expr) in &self.comb {
            let target = nodes[name.as_str()];
            for dep in expr.referenced_nets() {
                if let Some(&source) = nodes.get(dep) {
                    graph.add_edge(source, target, ());
                }
            }
        }
        graph
    }

    /// Fails if combinational definitions reference each other in a loop.
    ///
    /// Substitution must never create one; a loop means a pass broke that
    /// invariant.
    pub fn check_acyclic(&self) -> DegateResult<()> {
        let graph = self.comb_graph();
        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            InternalError::new(format!(
                "combinational loop through '{}'",
                graph[cycle.node_id()]
            ))
        })
    }

    /// Nets referenced by some expression but declared nowhere: not an
    /// input, combinational net, register or clocked destination.
    pub fn undeclared_references(&self) -> Vec<String> {
        let declared = |net: &str| {
            self.inputs.iter().any(|i| i == net)
                || self.comb.contains_key(net)
                || self.registers.contains_key(net)
                || self.clocked.iter().any(|ff| ff.dest == net)
        };
        let exprs = self.comb.values().chain(
            self.clocked
                .iter()
                .flat_map(|ff| [&ff.ce, &ff.value, &ff.reset, &ff.ce_reset]),
        );
        let mut missing: Vec<String> = Vec::new();
        for expr in exprs {
            for net in expr.referenced_nets() {
                if !declared(net) && !missing.iter().any(|m| m == net) {
                    missing.push(net.to_string());
                }
            }
        }
        for ff in &self.clocked {
            if !declared(&ff.clock) && !missing.contains(&ff.clock) {
                missing.push(ff.clock.clone());
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use degate_common::Logic;
    use degate_expr::Expr;

    fn n(name: &str) -> Expr {
        Expr::net(name)
    }

    #[test]
    fn acyclic_netlist_passes() {
        let mut nl = Netlist::new("top");
        nl.add_input("a");
        nl.define_comb("x", Expr::not(n("a")));
        nl.define_comb("y", Expr::and(vec![n("x"), n("a")]));
        assert!(nl.check_acyclic().is_ok());
        assert_eq!(nl.comb_graph().edge_count(), 1);
    }

    #[test]
    fn loop_is_internal_error() {
        let mut nl = Netlist::new("top");
        nl.define_comb("x", Expr::not(n("y")));
        nl.define_comb("y", Expr::and(vec![n("x"), n("a")]));
        let err = nl.check_acyclic().unwrap_err();
        assert!(err.message.contains("combinational loop"));
    }

    #[test]
    fn self_reference_is_a_loop() {
        let mut nl = Netlist::new("top");
        nl.define_comb("x", Expr::xor(vec![n("x"), n("a")]));
        assert!(nl.check_acyclic().is_err());
    }

    #[test]
    fn register_feedback_is_not_a_loop() {
        let mut nl = Netlist::new("top");
        nl.declare_register("q", Logic::Zero);
        nl.define_comb("d", Expr::not(n("q")));
        nl.define_clocked("clk", Expr::ONE, "q", n("d")).unwrap();
        assert!(nl.check_acyclic().is_ok());
    }

    #[test]
    fn undeclared_references_are_listed_once() {
        let mut nl = Netlist::new("top");
        nl.add_input("a");
        nl.declare_register("q", Logic::Zero);
        nl.define_comb("x", Expr::and(vec![n("a"), n("ghost"), n("q")]));
        nl.define_comb("y", Expr::or(vec![n("ghost"), n("x")]));
        nl.define_clocked("clk", n("en"), "q", n("y")).unwrap();
        assert_eq!(nl.undeclared_references(), vec!["ghost", "en", "clk"]);
    }
}
