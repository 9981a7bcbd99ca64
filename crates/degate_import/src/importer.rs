//! Translation of a parsed module into a [`Netlist`].
//!
//! Items are visited in source order by an [`ImportContext`] that carries
//! the partially built netlist, the kinds of declared nets and the pragma
//! waiting for the next assignment.

use crate::error::ImportError;
use crate::lower::{lower_carry, lower_expr};
use crate::preprocess::CARRY_PRAGMA;
use degate_common::{Logic, Span};
use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use degate_expr::Expr;
use degate_netlist::Netlist;
use degate_verilog_parser::ast::{
    self, AlwaysBlock, ContinuousAssign, Direction, EdgeKind, ModuleDecl, ModuleItem, NetDecl,
    NetType, PortDecl, Pragma, SensitivityList, Statement,
};
use std::collections::HashSet;

/// Import-time cursor over one module.
pub struct ImportContext<'a> {
    netlist: Netlist,
    wires: HashSet<String>,
    regs: HashSet<String>,
    /// Attribute items since the last assignment, consumed by the next one.
    pending_pragmas: Vec<Pragma>,
    sink: &'a DiagnosticSink,
}

impl<'a> ImportContext<'a> {
    /// Starts an import of module `name`.
    pub fn new(name: &str, sink: &'a DiagnosticSink) -> Self {
        Self {
            netlist: Netlist::new(name),
            wires: HashSet::new(),
            regs: HashSet::new(),
            pending_pragmas: Vec::new(),
            sink,
        }
    }

    /// Visits every port and item of `module`, then reports references to
    /// nets that were never declared.
    pub fn import_module(mut self, module: &ModuleDecl) -> Result<Netlist, ImportError> {
        for port in &module.ports {
            self.visit_port(port);
        }
        for item in &module.items {
            self.visit_item(item)?;
        }
        for net in self.netlist.undeclared_references() {
            self.sink.emit(Diagnostic::warning(
                DiagnosticCode::UNDECLARED_NET,
                format!("'{net}' is referenced but never declared"),
            ));
        }
        tracing::debug!(
            inputs = self.netlist.inputs.len(),
            outputs = self.netlist.outputs.len(),
            comb = self.netlist.comb.len(),
            clocked = self.netlist.clocked.len(),
            "imported module {}",
            self.netlist.name
        );
        Ok(self.netlist)
    }

    fn visit_item(&mut self, item: &ModuleItem) -> Result<(), ImportError> {
        match item {
            ModuleItem::PortDecl(port) => self.visit_port(port),
            ModuleItem::NetDecl(decl) => self.visit_net_decl(decl)?,
            ModuleItem::ContinuousAssign(assign) => self.visit_assign(assign)?,
            ModuleItem::AlwaysBlock(always) => self.visit_always(always)?,
            ModuleItem::Pragma(pragma) => self.pending_pragmas.push(pragma.clone()),
            ModuleItem::Other(other) => self.sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::UNRECOGNIZED_NODE,
                    format!("{} [{}]", other.kind, other.attributes.join(", ")),
                )
                .with_span(other.span),
            ),
            ModuleItem::Error(span) => {
                return Err(ImportError::unsupported("malformed module item", *span))
            }
        }
        Ok(())
    }

    fn visit_port(&mut self, port: &PortDecl) {
        for name in &port.names {
            match port.direction {
                Direction::Input => self.netlist.add_input(name.as_str()),
                Direction::Output => self.netlist.add_output(name.as_str()),
                Direction::Inout => {
                    self.sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::UNRECOGNIZED_NODE,
                            format!("inout [{name}]"),
                        )
                        .with_span(port.span),
                    );
                    continue;
                }
            }
            match port.net_type {
                Some(NetType::Reg) => self.declare_reg(name),
                Some(NetType::Wire) => {
                    self.wires.insert(name.clone());
                }
                None => {}
            }
        }
    }

    fn declare_reg(&mut self, name: &str) {
        self.regs.insert(name.to_string());
        if !self.netlist.registers.contains_key(name) {
            self.netlist.declare_register(name, Logic::X);
        }
    }

    fn visit_net_decl(&mut self, decl: &NetDecl) -> Result<(), ImportError> {
        for entry in &decl.names {
            match decl.net_type {
                NetType::Reg => {
                    self.declare_reg(&entry.name);
                    if let Some(init) = &entry.init {
                        self.assign(&entry.name, init, entry.span)?;
                    }
                }
                NetType::Wire => {
                    self.wires.insert(entry.name.clone());
                    if let Some(init) = &entry.init {
                        self.assign(&entry.name, init, entry.span)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_assign(&mut self, assign: &ContinuousAssign) -> Result<(), ImportError> {
        let Some(target) = assign.target.as_identifier() else {
            return Err(ImportError::unsupported(
                "assignment to a bit select or concatenation",
                assign.target.span(),
            ));
        };
        self.assign(target, &assign.value, assign.span)
    }

    /// Binds `value` to `target`: a combinational definition for a net, the
    /// initial value for a register.
    fn assign(&mut self, target: &str, value: &ast::Expr, span: Span) -> Result<(), ImportError> {
        let pragmas = std::mem::take(&mut self.pending_pragmas);
        let expr = if pragmas.iter().any(|pragma| pragma.has(CARRY_PRAGMA)) {
            lower_carry(value)?
        } else {
            lower_expr(value)?
        };
        if self.regs.contains(target) && !self.wires.contains(target) {
            let Some(init) = expr.as_const() else {
                return Err(ImportError::unsupported(
                    format!("non-constant initial value for register '{target}'"),
                    span,
                ));
            };
            self.netlist.declare_register(target, init);
        } else {
            self.netlist.define_comb(target, expr);
        }
        Ok(())
    }

    fn visit_always(&mut self, always: &AlwaysBlock) -> Result<(), ImportError> {
        let Statement::EventControl {
            sensitivity, body, ..
        } = &always.body
        else {
            return Err(ImportError::unsupported(
                format!("always block without event control ({})", always.body.kind_name()),
                always.body.span(),
            ));
        };
        let item = match sensitivity {
            SensitivityList::List(items) if items.len() == 1 => &items[0],
            _ => {
                return Err(ImportError::unsupported(
                    "sensitivity list other than a single clock edge",
                    always.span,
                ))
            }
        };
        match item.edge {
            Some(EdgeKind::Posedge) => {}
            Some(EdgeKind::Negedge) => {
                return Err(ImportError::unsupported("negedge clock", item.span))
            }
            None => return Err(ImportError::unsupported("level-sensitive always block", item.span)),
        }
        let Some(clock) = item.signal.as_identifier() else {
            return Err(ImportError::unsupported("clock expression", item.signal.span()));
        };

        let Statement::If {
            condition,
            then_stmt,
            else_stmt,
            span,
        } = transparent(body)
        else {
            return Err(ImportError::unsupported(
                transparent(body).kind_name().to_string(),
                body.span(),
            ));
        };
        if else_stmt.is_some() {
            return Err(ImportError::unsupported("if statement with else", *span));
        }
        let Statement::NonBlocking { target, value, .. } = transparent(then_stmt) else {
            let inner = transparent(then_stmt);
            return Err(ImportError::unsupported(
                format!("{} inside clocked if", inner.kind_name()),
                inner.span(),
            ));
        };
        let Some(dest) = target.as_identifier() else {
            return Err(ImportError::unsupported("clocked bit select", target.span()));
        };

        let ce = lower_expr(condition)?;
        let value: Expr = lower_expr(value)?;
        self.netlist.define_clocked(clock, ce, dest, value)?;
        Ok(())
    }
}

/// Sees through `begin ... end` blocks holding exactly one statement.
fn transparent(stmt: &Statement) -> &Statement {
    match stmt {
        Statement::Block { stmts, .. } if stmts.len() == 1 => transparent(&stmts[0]),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use crate::{import_source, ImportError};
    use degate_common::Logic;
    use degate_diagnostics::{DiagnosticCode, DiagnosticSink};

    fn import(body: &str) -> Result<degate_netlist::Netlist, ImportError> {
        let source = format!("module top(clk, a, b, y);\ninput clk, a, b;\noutput y;\n{body}\nendmodule\n");
        let sink = DiagnosticSink::new();
        import_source(&source, &sink)
    }

    #[test]
    fn wires_become_combinational() {
        let nl = import("wire y, n;\nassign n = a & b;\nassign y = ~n;").unwrap();
        assert_eq!(nl.comb["n"].to_string(), "a&b");
        assert_eq!(nl.comb["y"].to_string(), "!n");
        assert_eq!(nl.inputs, vec!["clk", "a", "b"]);
        assert_eq!(nl.outputs, vec!["y"]);
    }

    #[test]
    fn register_declarations_and_initial_values() {
        let nl = import("reg q, r = 1'b1, s;\nassign q = 1'b0;\nwire y;\nassign y = q;").unwrap();
        assert_eq!(nl.registers["q"], Logic::Zero);
        assert_eq!(nl.registers["r"], Logic::One);
        assert_eq!(nl.registers["s"], Logic::X);
        assert!(!nl.comb.contains_key("q"));
    }

    #[test]
    fn clocked_if_becomes_clocked_element() {
        let nl = import(
            "reg q = 0;\nwire y;\nassign y = q;\nalways @(posedge clk) if (a) q <= b ^ q;",
        )
        .unwrap();
        let ff = &nl.clocked[0];
        assert_eq!(ff.clock, "clk");
        assert_eq!(ff.dest, "q");
        assert_eq!(ff.ce.to_string(), "a");
        assert_eq!(ff.value.to_string(), "b^q");
        assert_eq!(ff.init, Logic::Zero);
    }

    #[test]
    fn single_statement_blocks_are_transparent() {
        let nl = import(
            "reg q = 0;\nalways @(posedge clk) begin if (1'b1) begin q <= a; end end",
        )
        .unwrap();
        assert_eq!(nl.clocked.len(), 1);
        assert!(nl.clocked[0].ce.is_const(Logic::One));
    }

    #[test]
    fn unsupported_always_shapes() {
        for body in [
            "reg q = 0;\nalways @(negedge clk) if (a) q <= b;",
            "reg q = 0;\nalways @(posedge clk) q <= b;",
            "reg q = 0;\nalways @(posedge clk) if (a) q <= b; else q <= a;",
            "reg q = 0;\nalways @(posedge clk) if (a) q = b;",
            "reg q = 0;\nalways @(posedge clk) if (a) begin q <= b; q <= a; end",
            "reg q = 0;\nalways @(posedge clk or posedge a) if (a) q <= b;",
        ] {
            assert!(
                matches!(import(body), Err(ImportError::Unsupported { .. })),
                "{body} should be unsupported"
            );
        }
    }

    #[test]
    fn clocked_destination_needs_declaration() {
        let err = import("always @(posedge clk) if (a) q <= b;").unwrap_err();
        assert!(matches!(err, ImportError::Netlist(_)));
    }

    #[test]
    fn carry_pragma_applies_to_next_assignment_only() {
        let nl = import(
            "wire c, d, y;\n\
             assign c = (a & b) | ((a | b) & y); /* CARRY 1 */\n\
             assign d = (a & b) | ((a | b) & y);",
        )
        .unwrap();
        assert_eq!(nl.comb["c"].to_string(), "carry(a, b, y)");
        assert_eq!(nl.comb["d"].to_string(), "a&b|(a|b)&y");
    }

    #[test]
    fn carry_comment_survives_leading_attribute() {
        let nl = import(
            "wire c, d, y;\n\
             (* keep *) assign c = (a & b) | ((a | b) & y); /* CARRY 1 */\n\
             (* keep *) assign d = (a & b) | ((a | b) & y);",
        )
        .unwrap();
        assert_eq!(nl.comb["c"].to_string(), "carry(a, b, y)");
        assert_eq!(nl.comb["d"].to_string(), "a&b|(a|b)&y");
    }

    #[test]
    fn warnings_for_unrecognized_and_undeclared() {
        let source = "module top(input a, output y);\n\
                      and g1 (y, a, ghost);\n\
                      wire y;\n\
                      assign y = a & ghost;\n\
                      endmodule\n";
        let sink = DiagnosticSink::new();
        import_source(source, &sink).unwrap();
        let diags = sink.diagnostics();
        assert!(diags
            .iter()
            .any(|d| d.code == DiagnosticCode::UNRECOGNIZED_NODE && d.message == "gate [g1, y, a, ghost]"));
        assert!(diags
            .iter()
            .any(|d| d.code == DiagnosticCode::UNDECLARED_NET && d.message.contains("'ghost'")));
        assert!(!sink.has_errors());
    }

    #[test]
    fn syntax_errors_stop_import() {
        let sink = DiagnosticSink::new();
        let err = import_source("module top(input a); assign = ; endmodule", &sink).unwrap_err();
        assert!(matches!(err, ImportError::Syntax(n) if n > 0));
    }
}
