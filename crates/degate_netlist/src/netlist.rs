//! The circuit graph and its graph-wide operations.

use crate::clocked::ClockedDef;
use crate::error::NetlistError;
use degate_common::{DegateResult, Logic};
use degate_expr::{normalize, parse_expr, Expr};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The recovered design: ports, combinational and clocked definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    /// Module name.
    pub name: String,
    /// Input ports in declaration order.
    pub inputs: Vec<String>,
    /// Output ports in declaration order.
    pub outputs: Vec<String>,
    /// Declared registers and their initial values.
    pub registers: IndexMap<String, Logic>,
    /// Combinational definitions, one per net.
    pub comb: IndexMap<String, Expr>,
    /// Clocked storage elements.
    pub clocked: Vec<ClockedDef>,
    /// Named multi-bit groupings of single-bit nets.
    pub bundles: IndexMap<String, Vec<String>>,
}

impl Netlist {
    /// Creates an empty netlist for module `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends an input port.
    pub fn add_input(&mut self, name: impl Into<String>) {
        self.inputs.push(name.into());
    }

    /// Appends an output port.
    pub fn add_output(&mut self, name: impl Into<String>) {
        self.outputs.push(name.into());
    }

    /// Declares (or re-declares) a register's initial value.
    pub fn declare_register(&mut self, name: impl Into<String>, init: Logic) {
        self.registers.insert(name.into(), init);
    }

    /// Stores the combinational definition of `name`, replacing any previous one.
    pub fn define_comb(&mut self, name: impl Into<String>, expr: Expr) {
        self.comb.insert(name.into(), expr);
    }

    /// Parses `text` and stores it as the definition of `name`.
    pub fn define_comb_text(&mut self, name: &str, text: &str) -> Result<(), NetlistError> {
        let expr = parse_expr(text).map_err(|source| NetlistError::InvalidExpression {
            net: name.to_string(),
            source,
        })?;
        self.define_comb(name, expr);
        Ok(())
    }

    /// Adds a clocked element for `dest`, which must have a declared initial
    /// value. Its reset value starts out equal to that initial value.
    pub fn define_clocked(
        &mut self,
        clock: impl Into<String>,
        ce: Expr,
        dest: &str,
        value: Expr,
    ) -> Result<(), NetlistError> {
        let init = *self
            .registers
            .get(dest)
            .ok_or_else(|| NetlistError::MissingInitialValue(dest.to_string()))?;
        self.clocked.push(ClockedDef::new(clock, ce, dest, value, init));
        Ok(())
    }

    /// Replaces every reference to `net` in every combinational and clocked
    /// expression with `with`. Returns `true` if anything changed.
    ///
    /// The caller is responsible for not creating a reference cycle.
    pub fn replace_net(&mut self, net: &str, with: &Expr) -> bool {
        let mut changed = false;
        for expr in self.comb.values_mut() {
            changed |= replace_in(expr, net, with);
        }
        for ff in &mut self.clocked {
            changed |= replace_in(&mut ff.ce, net, with);
            changed |= replace_in(&mut ff.value, net, with);
            changed |= replace_in(&mut ff.reset, net, with);
            changed |= replace_in(&mut ff.ce_reset, net, with);
        }
        changed
    }

    /// Returns `true` if `net` is an output, clocks an element, or is
    /// referenced by any combinational or clocked expression.
    pub fn is_used(&self, net: &str) -> bool {
        self.outputs.iter().any(|o| o == net)
            || self.comb.values().any(|e| e.references(net))
            || self.clocked.iter().any(|ff| {
                ff.clock == net
                    || ff.ce.references(net)
                    || ff.value.references(net)
                    || ff.reset.references(net)
                    || ff.ce_reset.references(net)
            })
    }

    /// Position of the clocked element driving `dest`.
    pub fn clocked_index(&self, dest: &str) -> Option<usize> {
        self.clocked.iter().position(|ff| ff.dest == dest)
    }

    /// The clocked element driving `dest`.
    pub fn find_clocked(&self, dest: &str) -> Option<&ClockedDef> {
        self.clocked.iter().find(|ff| ff.dest == dest)
    }

    /// Position of the unique clocked element whose value is exactly `name`
    /// or `!name`.
    ///
    /// Returns `None` when no element or more than one element qualifies, so
    /// that a fan-out point is never mistaken for a link in a shift chain.
    pub fn loader_index(&self, name: &str) -> Option<usize> {
        let mut found = self.clocked.iter().enumerate().filter(|(_, ff)| {
            let value = ff.value.as_not().unwrap_or(&ff.value);
            value.as_net() == Some(name)
        });
        match (found.next(), found.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }

    /// The unique clocked element loading `name` or `!name`; see
    /// [`loader_index`](Netlist::loader_index).
    pub fn find_loader(&self, name: &str) -> Option<&ClockedDef> {
        self.loader_index(name).map(|index| &self.clocked[index])
    }

    /// Combinational nets whose definition references any of `nets`, in
    /// definition order. Constants are ignored.
    pub fn find_consumers(&self, nets: &[&str]) -> Vec<String> {
        self.comb
            .iter()
            .filter(|(_, expr)| nets.iter().any(|net| expr.references(net)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Renames `prev` to `new` everywhere: references, ports, the
    /// combinational table key, clocks and the clocked destination.
    pub fn rename_net(&mut self, prev: &str, new: &str) {
        self.replace_net(prev, &Expr::net(new));
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            if port == prev {
                *port = new.to_string();
            }
        }
        if let Some(index) = self.comb.get_index_of(prev) {
            if let Some((_, expr)) = self.comb.shift_remove_index(index) {
                self.comb.shift_insert(index, new.to_string(), expr);
            }
        }
        if let Some(index) = self.registers.get_index_of(prev) {
            if let Some((_, init)) = self.registers.shift_remove_index(index) {
                self.registers.shift_insert(index, new.to_string(), init);
            }
        }
        for ff in &mut self.clocked {
            if ff.clock == prev {
                ff.clock = new.to_string();
            }
            if ff.dest == prev {
                ff.dest = new.to_string();
            }
        }
    }

    /// Returns `true` if `name` is an output port or the clock of a clocked
    /// element. Such a net cannot be replaced by an expression over itself.
    pub fn drives_port_or_clock(&self, name: &str) -> bool {
        self.outputs.iter().any(|output| output == name)
            || self.clocked.iter().any(|ff| ff.clock == name)
    }

    /// Flips the stored polarity of the register `name`.
    ///
    /// Initial and reset values are inverted (`X` stays `X`), every reference
    /// to `name` becomes `!name` and the next-state expression is negated.
    /// Observable behavior is unchanged. Returns `false` and leaves the
    /// netlist untouched if `name` is not a clocked destination or if it
    /// [drives a port or clock](Self::drives_port_or_clock).
    pub fn invert_register(&mut self, name: &str) -> DegateResult<bool> {
        let Some(index) = self.clocked_index(name) else {
            return Ok(false);
        };
        if self.drives_port_or_clock(name) {
            return Ok(false);
        }
        {
            let ff = &mut self.clocked[index];
            ff.init = !ff.init;
            ff.reset_value = !ff.reset_value;
        }
        self.replace_net(name, &Expr::not(Expr::net(name)));
        let ff = &mut self.clocked[index];
        ff.value = normalize(&Expr::not(ff.value.clone()))?;
        Ok(true)
    }

    /// Evaluates combinational net `name`, recursing through other
    /// combinational definitions. Inputs and registers are read from `lookup`.
    /// A combinational loop evaluates to `X`.
    pub fn eval_net(&self, name: &str, lookup: &dyn Fn(&str) -> Logic) -> Logic {
        let mut stack = Vec::new();
        self.eval_inner(name, lookup, &mut stack)
    }

    fn eval_inner<'a>(&'a self, name: &'a str, lookup: &dyn Fn(&str) -> Logic, stack: &mut Vec<&'a str>) -> Logic {
        let Some(expr) = self.comb.get(name) else {
            return lookup(name);
        };
        if stack.contains(&name) {
            return Logic::X;
        }
        stack.push(name);
        let value = eval_expr(self, expr, lookup, stack);
        stack.pop();
        value
    }
}

fn eval_expr<'a>(
    netlist: &'a Netlist,
    expr: &'a Expr,
    lookup: &dyn Fn(&str) -> Logic,
    stack: &mut Vec<&'a str>,
) -> Logic {
    // Resolve every referenced combinational net first, then evaluate the
    // expression against the resolved values.
    let resolved: Vec<(&str, Logic)> = expr
        .referenced_nets()
        .into_iter()
        .map(|net| (net, netlist.eval_inner(net, lookup, stack)))
        .collect();
    expr.eval(&|net| {
        resolved
            .iter()
            .find(|(name, _)| *name == net)
            .map_or(Logic::X, |(_, value)| *value)
    })
}

fn replace_in(expr: &mut Expr, net: &str, with: &Expr) -> bool {
    match expr.replace(net, with) {
        Some(new) => {
            *expr = new;
            true
        }
        None => false,
    }
}
