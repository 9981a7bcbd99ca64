//! Implementation of a cleanup run.
//!
//! Reads the netlist and the rules, imports, runs the three stages and
//! writes one snapshot per stage. Diagnostics are rendered to stderr at
//! the end of the run, or as soon as a fatal error stops it.

use std::fs;
use std::path::{Path, PathBuf};

use degate_clean::{Pipeline, Snapshot};
use degate_config::{load_rules, RuleSet};
use degate_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer,
};
use degate_import::{import_source, preprocess};
use tracing::info;

use crate::{CleanArgs, GlobalArgs};

/// Runs the whole cleanup and returns the process exit code.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&args.input)
        .map_err(|e| format!("cannot read '{}': {e}", args.input.display()))?;
    let sink = DiagnosticSink::new();
    let report = |sink: &DiagnosticSink| render_diagnostics(sink, args, global, &source);

    let rules = if args.rules.exists() {
        load_rules(&args.rules)?
    } else {
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::MISSING_RULES,
                format!("rule file '{}' not found", args.rules.display()),
            )
            .with_note("continuing without rules"),
        );
        RuleSet::default()
    };

    let netlist = match import_source(&source, &sink) {
        Ok(netlist) => netlist,
        Err(e) => {
            report(&sink);
            return Err(e.into());
        }
    };
    info!(
        module = %netlist.name,
        comb = netlist.comb.len(),
        clocked = netlist.clocked.len(),
        "imported netlist"
    );

    let snapshots = match Pipeline::new(netlist, &rules, &sink).run() {
        Ok(snapshots) => snapshots,
        Err(e) => {
            report(&sink);
            return Err(e.into());
        }
    };

    for snapshot in &snapshots {
        write_snapshot(snapshot, args)?;
    }

    report(&sink);
    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Path of the snapshot for `stage` with the given extension.
fn snapshot_path(args: &CleanArgs, stage: u8, extension: &str) -> PathBuf {
    args.out_dir
        .join(format!("{}{stage}.{extension}", args.prefix))
}

fn write_snapshot(snapshot: &Snapshot, args: &CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = snapshot_path(args, snapshot.stage, "v");
    write_file(&path, &format!("{}\n", snapshot.verilog))?;
    info!(stage = snapshot.stage, path = %path.display(), "wrote snapshot");

    if args.json {
        let path = snapshot_path(args, snapshot.stage, "json");
        write_file(&path, &serde_json::to_string_pretty(snapshot)?)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, contents).map_err(|e| format!("cannot write '{}': {e}", path.display()))?;
    Ok(())
}

/// Renders every collected diagnostic; `--quiet` keeps only errors.
fn render_diagnostics(sink: &DiagnosticSink, args: &CleanArgs, global: &GlobalArgs, source: &str) {
    // Spans point into the preprocessed text.
    let text = preprocess(source).unwrap_or_else(|_| source.to_string());
    let file_name = args.input.display().to_string();
    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.take_all() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprintln!("{}", renderer.render(&diag, &file_name, &text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "\
module top(input n1, input n2, input n3, output n9);
wire n5;
wire n6;
wire n9;
reg n7 = 1'b1;
reg n8 = 1'b0;
assign n5 = ~n2;
assign n6 = n3 & n5;
assign n9 = n8;
always @(posedge n1)
  if (n6) n7 <= ~n8;
always @(posedge n1)
  if (n6) n8 <= n7;
endmodule
";

    fn args(dir: &Path) -> CleanArgs {
        CleanArgs {
            input: dir.join("test.v"),
            rules: dir.join("cleanup_renames.json"),
            out_dir: dir.to_path_buf(),
            prefix: "top_clean_pass".to_string(),
            json: false,
        }
    }

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            color: false,
        }
    }

    #[test]
    fn writes_three_snapshots_without_rules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.v"), COUNTER).unwrap();
        let code = run(&args(dir.path()), &quiet()).unwrap();
        assert_eq!(code, 0);
        for stage in 1..=3 {
            let text = fs::read_to_string(dir.path().join(format!("top_clean_pass{stage}.v"))).unwrap();
            assert!(text.starts_with("module top(input n1, input n2, input n3, output n9);"));
            assert!(text.trim_end().ends_with("endmodule"));
        }
        assert!(!dir.path().join("top_clean_pass1.json").exists());
    }

    #[test]
    fn rules_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.v"), COUNTER).unwrap();
        fs::write(
            dir.path().join("cleanup_renames.json"),
            r#"{"rename": {"n1": "clk", "n8": "count"}, "bundle_wires": {"state": ["n7", "count"]}}"#,
        )
        .unwrap();
        let mut args = args(dir.path());
        args.json = true;
        run(&args, &quiet()).unwrap();

        let stage1 = fs::read_to_string(dir.path().join("top_clean_pass1.v")).unwrap();
        assert!(stage1.contains("always @(posedge n1)"));
        let stage2 = fs::read_to_string(dir.path().join("top_clean_pass2.v")).unwrap();
        assert!(stage2.contains("always @(posedge clk)"));
        assert!(stage2.contains("reg count = 0;"));
        let stage3 = fs::read_to_string(dir.path().join("top_clean_pass3.v")).unwrap();
        assert!(stage3.contains("wire [2-1:0] state = {n7,count};"));

        let json = fs::read_to_string(dir.path().join("top_clean_pass3.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stage"], 3);
        assert_eq!(value["netlist"]["clocked"][1]["dest"], "count");
    }

    #[test]
    fn custom_prefix_and_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(dir.path().join("test.v"), COUNTER).unwrap();
        let mut args = args(dir.path());
        args.out_dir = out.clone();
        args.prefix = "chip".to_string();
        run(&args, &quiet()).unwrap();
        assert!(out.join("chip1.v").exists());
        assert!(out.join("chip3.v").exists());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(dir.path()), &quiet()).unwrap_err();
        assert!(err.to_string().starts_with("cannot read"));
    }

    #[test]
    fn unsupported_reset_polarity_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.v"), COUNTER).unwrap();
        fs::write(dir.path().join("cleanup_renames.json"), r#"{"resets": {"n3": "1"}}"#).unwrap();
        let err = run(&args(dir.path()), &quiet()).unwrap_err();
        assert!(err.to_string().contains("active-low"));
        assert!(!dir.path().join("top_clean_pass1.v").exists());
    }

    #[test]
    fn unsupported_construct_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("test.v"),
            "module top(input clk, input d);\nreg q = 0;\nalways @(negedge clk) if (d) q <= d;\nendmodule\n",
        )
        .unwrap();
        assert!(run(&args(dir.path()), &quiet()).is_err());
        assert!(!dir.path().join("top_clean_pass1.v").exists());
    }
}
