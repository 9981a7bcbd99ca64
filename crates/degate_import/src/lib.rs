//! Netlist importer: Verilog source to [`Netlist`].
//!
//! The source is first rewritten so carry markers become attributes
//! ([`preprocess`]), then parsed, then translated item by item. Constructs
//! the importer does not recognize are reported as `W201` warnings and
//! skipped; shapes it recognizes but cannot translate are fatal
//! [`ImportError::Unsupported`] errors.

#![warn(missing_docs)]

pub mod error;
pub mod importer;
pub mod lower;
pub mod preprocess;

pub use error::ImportError;
pub use importer::ImportContext;
pub use preprocess::preprocess;

use degate_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use degate_netlist::Netlist;
use degate_verilog_parser::parse_source;

/// Imports the first module of `source`.
///
/// Syntax errors are left in `sink` and reported as [`ImportError::Syntax`].
pub fn import_source(source: &str, sink: &DiagnosticSink) -> Result<Netlist, ImportError> {
    let text = preprocess(source)?;
    let file = parse_source(&text, sink);
    if sink.has_errors() {
        return Err(ImportError::Syntax(sink.error_count()));
    }

    let mut modules = file.modules();
    let module = modules.next().ok_or(ImportError::NoModule)?;
    for extra in modules {
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::UNRECOGNIZED_NODE,
                format!("module [{}]", extra.name),
            )
            .with_span(extra.span)
            .with_note(format!("only '{}' is imported", module.name)),
        );
    }

    ImportContext::new(&module.name, sink).import_module(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_has_no_module() {
        let sink = DiagnosticSink::new();
        assert!(matches!(import_source("", &sink), Err(ImportError::NoModule)));
    }

    #[test]
    fn only_first_module_is_imported() {
        let sink = DiagnosticSink::new();
        let nl = import_source(
            "module a(input x); endmodule\nmodule b(input z); endmodule",
            &sink,
        )
        .unwrap();
        assert_eq!(nl.name, "a");
        assert_eq!(nl.inputs, vec!["x"]);
        assert_eq!(sink.diagnostics()[0].message, "module [b]");
    }

    #[test]
    fn carry_comment_reaches_the_importer() {
        let sink = DiagnosticSink::new();
        let nl = import_source(
            "module top(input a, input b, input c, output co);\n\
             wire co;\n\
             assign co = (a & b) | ((a | b) & c); /* CARRY 0 */\n\
             endmodule",
            &sink,
        )
        .unwrap();
        assert_eq!(nl.comb["co"].to_string(), "carry(a, b, c)");
    }
}
