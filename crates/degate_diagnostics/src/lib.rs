//! Diagnostic creation, severity management, and terminal rendering.
//!
//! [`Diagnostic`] messages carry a severity, a [`DiagnosticCode`], an
//! optional source [`Span`](degate_common::Span) and notes. The
//! [`DiagnosticSink`] accumulates them while a design is imported and
//! cleaned, and [`TerminalRenderer`] formats them for the console.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
