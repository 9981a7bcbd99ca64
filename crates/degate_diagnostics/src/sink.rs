//! Diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::cell::{Cell, RefCell};

/// Accumulates diagnostics emitted during import and cleanup.
///
/// The whole pipeline runs on one thread, so the sink uses plain interior
/// mutability and can be shared by `&` reference between passes.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.set(self.error_count.get() + 1);
        }
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.error_count.set(0);
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    #[test]
    fn new_sink_is_empty() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn emit_counts_errors_only() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(DiagnosticCode::UNRECOGNIZED_NODE, "Initial"));
        sink.emit(Diagnostic::note(DiagnosticCode::SHIFT_CHAIN, "chain"));
        assert!(!sink.has_errors());
        sink.emit(Diagnostic::error(DiagnosticCode::SYNTAX, "bad"));
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics().len(), 3);
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(DiagnosticCode::SYNTAX, "bad"));
        let taken = sink.take_all();
        assert_eq!(taken.len(), 1);
        assert!(sink.diagnostics().is_empty());
        assert!(!sink.has_errors());
    }
}
