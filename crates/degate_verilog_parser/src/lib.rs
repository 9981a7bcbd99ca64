//! Hand-rolled recursive descent parser for gate-level Verilog netlists.
//!
//! The accepted language is the subset synthesis tools emit for flattened
//! designs: one or more modules with port, `wire` and `reg` declarations,
//! continuous assignments, `always` blocks and attribute instances.
//! Anything else inside a module (instances, gate primitives, parameters,
//! `initial` blocks, functions) is skipped and kept as an `Other` node.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens; `(* ... *)` attributes
//!   are single tokens.
//! - **Parser** ([`parser`]): recursive descent with Pratt expression
//!   parsing and error recovery via `Error` nodes.
//! - **AST** ([`ast`]): closed node types with spans and serde support.

#![warn(missing_docs)]

pub mod ast;
mod decl;
mod expr;
pub mod lexer;
pub mod parser;
mod stmt;
pub mod token;

pub use ast::VerilogSourceFile;
pub use token::{Token, VerilogToken};

use degate_diagnostics::DiagnosticSink;

/// Parses netlist source text into an AST.
///
/// Lexing and parsing errors are reported to `sink` (`E100` and `E101`)
/// and represented as `Error` nodes in the returned tree.
pub fn parse_source(source: &str, sink: &DiagnosticSink) -> VerilogSourceFile {
    let tokens = lexer::lex(source, sink);
    let mut parser = parser::VerilogParser::new(tokens, source, sink);
    parser.parse_source_file()
}
