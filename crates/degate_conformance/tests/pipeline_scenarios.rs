//! End-to-end scenarios: Verilog in, three cleanup stages, snapshots and
//! diagnostics out.

use degate_clean::TraceStop;
use degate_common::Logic;
use degate_config::RuleSet;
use degate_conformance::{
    free_nets, full_pipeline, full_pipeline_json, import_verilog, next_state_table, truth_table,
    ConformanceError,
};
use degate_diagnostics::DiagnosticCode;
use degate_expr::Expr;
use degate_import::ImportError;

#[test]
fn imported_expression_keeps_precedence() {
    let (result, diagnostics) = import_verilog(
        "module top(input a, input b, input c, output y);\nwire y;\nassign y = a & b | c;\nendmodule\n",
    );
    let nl = result.unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(
        nl.comb["y"],
        Expr::or(vec![Expr::and(vec![Expr::net("a"), Expr::net("b")]), Expr::net("c")])
    );
}

#[test]
fn buffer_and_inverter_wiring_is_eliminated() {
    let src = r#"
module top(input a, input b, output y);
wire n1, n2, y;
assign n1 = a;
assign n2 = ~n1;
assign y = n2 & b;
endmodule
"#;
    let result = full_pipeline(src, &RuleSet::default()).unwrap();
    let stage1 = &result.snapshots[0].netlist;
    assert_eq!(stage1.comb.keys().collect::<Vec<_>>(), vec!["y"]);
    assert_eq!(stage1.comb["y"].to_string(), "!a&b");
    assert!(result.verilog(1).unwrap().contains("assign y = !a&b;"));

    let free = free_nets(&result.imported);
    assert_eq!(
        truth_table(&result.imported, "y", &free, &[]),
        truth_table(stage1, "y", &free, &[])
    );
}

#[test]
fn gated_reset_is_promoted_to_register_reset() {
    let src = r#"
module top(input clk, input rst_n, input d, output q);
reg q = 1'b1;
wire g;
assign g = d & rst_n;
always @(posedge clk) if (1'b1) q <= g;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"resets": {"rst_n": "0"}}"#).unwrap();
    let report = &result.snapshots[1].report;
    assert_eq!(report.edits["reset_propagate"], 1);
    assert_eq!(report.edits["promote"], 1);

    let nl = result.last().unwrap();
    assert!(!nl.comb.contains_key("g"));
    let ff = nl.find_clocked("q").unwrap();
    assert_eq!(ff.value, Expr::net("d"));
    assert_eq!(ff.reset.to_string(), "!rst_n");
    assert_eq!(ff.reset_value, Logic::Zero);
    assert!(ff.ce_reset.is_const(Logic::Zero));

    let free = free_nets(&result.imported);
    assert_eq!(
        next_state_table(&result.imported, "q", &free, &[]),
        next_state_table(nl, "q", &free, &[])
    );
}

#[test]
fn reset_gating_an_output_stays_on_the_output() {
    let src = r#"
module top(input clk, input rst_n, input d, input e, output y);
wire y;
assign y = d & e & rst_n;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"resets": {"rst_n": "0"}}"#).unwrap();
    assert_eq!(result.snapshots[1].report.edits["reset_propagate"], 0);

    let nl = result.last().unwrap();
    assert!(nl.comb["y"].references("rst_n"));
    let free = free_nets(&result.imported);
    assert_eq!(
        truth_table(&result.imported, "y", &free, &[]),
        truth_table(nl, "y", &free, &[])
    );
}

#[test]
fn enabled_register_gets_enable_gated_reset() {
    let src = r#"
module top(input clk, input rst_n, input en, input d, output q);
reg q = 1'b0;
always @(posedge clk) if (en) q <= d & rst_n;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"resets": {"rst_n": "0"}}"#).unwrap();
    let nl = result.last().unwrap();
    let ff = nl.find_clocked("q").unwrap();
    assert!(ff.reset.is_const(Logic::Zero));
    assert_eq!(ff.ce_reset.to_string(), "!rst_n");

    let free = free_nets(&result.imported);
    assert_eq!(
        next_state_table(&result.imported, "q", &free, &[]),
        next_state_table(nl, "q", &free, &[])
    );
}

#[test]
fn active_high_reset_rule_is_rejected() {
    let src = "module top(input a, output y);\nwire y;\nassign y = a;\nendmodule\n";
    let err = full_pipeline_json(src, r#"{"resets": {"a": "1"}}"#).err();
    assert!(matches!(err, Some(ConformanceError::Config(_))));

    // Rules built in memory skip the loader; the reset passes check again.
    let mut rules = RuleSet::default();
    rules.resets.insert("a".into(), "1".into());
    let err = full_pipeline(src, &rules).err();
    assert!(matches!(err, Some(ConformanceError::Clean(_))));
    assert!(err.map(|e| e.to_string()).unwrap_or_default().contains("active-low"));
}

#[test]
fn carry_comment_pairs_sum_with_full_adder() {
    let src = r#"
module top(input a, input b, input c, output co, output s);
wire co, s;
assign co = (a & b) | ((a | b) & c); /* CARRY bit 0 */
assign s = a ^ (b ^ c);
endmodule
"#;
    let result = full_pipeline(src, &RuleSet::default()).unwrap();
    assert_eq!(result.imported.comb["co"].to_string(), "carry(a, b, c)");

    let nl = result.last().unwrap();
    assert_eq!(nl.comb["s"], Expr::full_adder(Expr::net("a"), Expr::net("b"), Expr::net("c")));
    assert!(result.verilog(2).unwrap().contains("assign s = fa(a, b, c);"));

    let notes = result.with_code(DiagnosticCode::FULL_ADDER);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "`s` is the sum of full adder with carry `co`");

    let free = free_nets(&result.imported);
    for net in ["co", "s"] {
        assert_eq!(
            truth_table(&result.imported, net, &free, &[]),
            truth_table(nl, net, &free, &[]),
            "{net}"
        );
    }
}

#[test]
fn shift_chain_reset_values_decode_as_text() {
    // 'A' is 0x41, stored least significant bit first from r0.
    let src = r#"
module top(input clk, input en, input si, output r7);
reg r0 = 1'b1;
reg r1 = 1'b0;
reg r2 = 1'b0;
reg r3 = 1'b0;
reg r4 = 1'b0;
reg r5 = 1'b0;
reg r6 = 1'b1;
reg r7 = 1'b0;
always @(posedge clk) if (en) r0 <= si;
always @(posedge clk) if (en) r1 <= r0;
always @(posedge clk) if (en) r2 <= r1;
always @(posedge clk) if (en) r3 <= r2;
always @(posedge clk) if (en) r4 <= r3;
always @(posedge clk) if (en) r5 <= r4;
always @(posedge clk) if (en) r6 <= r5;
always @(posedge clk) if (en) r7 <= r6;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"trace_shifts": ["r0"]}"#).unwrap();
    let traces = &result.snapshots[1].report.traces;
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].bit_string(), "10000010");
    assert_eq!(traces[0].visited.len(), 8);
    assert_eq!(traces[0].stop, TraceStop::ChainEnd);

    let chain = result.with_code(DiagnosticCode::SHIFT_CHAIN);
    assert_eq!(chain.len(), 1);
    assert_eq!(
        chain[0].message,
        "shift chain from `r0`: 8 registers, stopped at end of chain"
    );
    let decoded = result.with_code(DiagnosticCode::SHIFT_DECODE);
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded[0].message, "`r0` inverted=0 reversed=0: \"A\" \"A\"");
}

#[test]
fn two_register_loop_trace_terminates() {
    let src = r#"
module top(input clk, output a);
reg a = 1'b1;
reg b = 1'b0;
always @(posedge clk) if (1'b1) a <= b;
always @(posedge clk) if (1'b1) b <= ~a;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"trace_shifts": ["a"]}"#).unwrap();
    let trace = &result.snapshots[1].report.traces[0];
    assert_eq!(trace.visited, vec!["a", "b"]);
    assert_eq!(trace.stop, TraceStop::Cycle);
    assert!(result.with_code(DiagnosticCode::SHIFT_DECODE).is_empty());
    assert_eq!(
        result.with_code(DiagnosticCode::SHIFT_CHAIN)[0].message,
        "shift chain from `a`: 2 registers, stopped at cycle"
    );
}

#[test]
fn aligning_a_chain_moves_the_inverter() {
    let src = r#"
module top(input clk, output y);
reg a = 1'b1;
reg b = 1'b0;
wire y;
assign y = b;
always @(posedge clk) if (1'b1) a <= b;
always @(posedge clk) if (1'b1) b <= ~a;
endmodule
"#;
    let result = full_pipeline_json(src, r#"{"align_shifts": ["b"]}"#).unwrap();
    assert_eq!(result.snapshots[1].report.edits["align_shifts"], 1);
    let trace = &result.snapshots[1].report.traces[0];
    assert_eq!(trace.inverted, vec!["a"]);

    let nl = result.last().unwrap();
    assert_eq!(nl.find_clocked("b").unwrap().value, Expr::net("a"));
    assert_eq!(nl.find_clocked("a").unwrap().value.to_string(), "!b");
    assert_eq!(nl.find_clocked("a").unwrap().init, Logic::Zero);
}

#[test]
fn rules_rename_invert_and_bundle() {
    let src = r#"
module top(input n1, input n2, input n3, output y);
reg n4 = 1'b0;
wire y;
assign y = n4;
always @(posedge n1) if (n2) n4 <= n3;
endmodule
"#;
    let rules = r#"{
        "rename": {"n1": "clk", "n4": "state"},
        "invert_ff": ["state"],
        "bundle_wires": {"bus": ["n2", "n3"]}
    }"#;
    let result = full_pipeline_json(src, rules).unwrap();

    let stage2 = result.verilog(2).unwrap();
    assert!(stage2.contains("always @(posedge clk)"));
    assert!(stage2.contains("reg state = 1;"));
    assert!(!stage2.contains("wire [2-1:0] bus"));
    assert!(result.verilog(3).unwrap().contains("wire [2-1:0] bus = {n2,n3};"));

    let nl = result.last().unwrap();
    assert_eq!(nl.outputs, vec!["y"]);
    let ff = nl.find_clocked("state").unwrap();
    assert_eq!(ff.value.to_string(), "!n3");
    assert_eq!(nl.comb["y"].to_string(), "!state");
}

#[test]
fn output_registers_keep_their_polarity() {
    let src = r#"
module top(input clk, input d, output q, output y);
reg q = 1'b0;
reg state = 1'b0;
wire y;
assign y = state;
always @(posedge clk) if (1'b1) q <= d;
always @(posedge clk) if (1'b1) state <= ~d;
endmodule
"#;
    // `state` only becomes an output through the rule, which runs first.
    let rules = r#"{"invert_ff": ["q", "state"], "output": ["state"]}"#;
    let result = full_pipeline_json(src, rules).unwrap();
    assert_eq!(result.snapshots[1].report.edits["invert_ffs"], 0);

    let nl = result.last().unwrap();
    assert_eq!(nl.outputs, vec!["q", "y", "state"]);
    let q = nl.find_clocked("q").unwrap();
    assert_eq!(q.init, Logic::Zero);
    assert_eq!(q.value, Expr::net("d"));
    assert_eq!(nl.find_clocked("state").unwrap().value.to_string(), "!d");
    assert!(result.verilog(3).unwrap().contains("reg q = 0;"));

    let free = free_nets(&result.imported);
    assert_eq!(
        next_state_table(&result.imported, "q", &free, &[]),
        next_state_table(nl, "q", &free, &[])
    );
}

#[test]
fn gate_instances_and_undeclared_nets_are_warnings() {
    let src = r#"
module top(input a, input b, output y);
and g1 (y, a, b);
wire y;
assign y = a & ghost;
endmodule
"#;
    let result = full_pipeline(src, &RuleSet::default()).unwrap();
    let unrecognized = result.with_code(DiagnosticCode::UNRECOGNIZED_NODE);
    assert_eq!(unrecognized.len(), 1);
    assert_eq!(unrecognized[0].message, "gate [g1, y, a, b]");
    let undeclared = result.with_code(DiagnosticCode::UNDECLARED_NET);
    assert_eq!(undeclared.len(), 1);
    assert!(undeclared[0].message.contains("'ghost'"));
    assert_eq!(result.warning_count(), 2);
    assert_eq!(result.snapshots.len(), 3);
}

#[test]
fn multi_bit_constructs_stop_the_import() {
    for body in [
        "wire y;\nassign y = a + b;",
        "wire y;\nassign y = a[0];",
        "wire y;\nassign y = {a, b};",
        "reg y = 0;\nalways @(negedge a) if (b) y <= a;",
        "reg y = 0;\nalways @(posedge a) if (b) y <= a; else y <= b;",
    ] {
        let src = format!("module top(input a, input b, output y);\n{body}\nendmodule\n");
        let err = full_pipeline(&src, &RuleSet::default()).err();
        assert!(
            matches!(err, Some(ConformanceError::Import(ImportError::Unsupported { .. }))),
            "{body} should be unsupported"
        );
    }
}

#[test]
fn missing_rule_targets_are_skipped() {
    let src = "module top(input a, output y);\nwire y;\nassign y = a;\nendmodule\n";
    let rules = r#"{"rename": {"nope": "x"}, "trace_shifts": ["nope"], "invert_ff": ["nope"]}"#;
    let result = full_pipeline_json(src, rules).unwrap();
    assert!(result.snapshots[1].report.traces.is_empty());
    assert_eq!(result.snapshots[1].report.edits["rename"], 0);
    assert!(result.verilog(3).unwrap().contains("assign y = a;"));
}
