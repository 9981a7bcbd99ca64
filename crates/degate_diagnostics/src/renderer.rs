//! Diagnostic rendering for the terminal.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic. `source` is the text spans point into.
    fn render(&self, diag: &Diagnostic, file_name: &str, source: &str) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[W201]: unrecognized node Initial [statement]
///   --> test.v:10:5
///    |
/// 10 | initial begin
///    | ^^^^^^^
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let label = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return label;
        }
        let color = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{color}m{label}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, file_name: &str, source: &str) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);

        if let Some(span) = diag.span {
            let (line, col) = span.line_col(source);
            out.push_str(&format!("  --> {file_name}:{line}:{col}\n"));

            let line_num = format!("{line}");
            let padding = " ".repeat(line_num.len());
            let line_content = get_source_line(source, span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            let carets = "^".repeat(span.len().max(1) as usize);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            out.push_str(&format!("{padding} | {col_padding}{carets}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        out
    }
}

/// Extracts the line of source code containing the given byte offset.
fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(content.len());
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use degate_common::Span;

    #[test]
    fn render_error_with_span() {
        let source = "module top;\nassign y = a +;\nendmodule\n";
        let diag = Diagnostic::error(DiagnosticCode::SYNTAX, "expected expression")
            .with_span(Span::new(26, 27));
        let output = TerminalRenderer::new(false).render(&diag, "test.v", source);

        assert!(output.contains("error[E101]: expected expression"));
        assert!(output.contains("--> test.v:2:15"));
        assert!(output.contains("assign y = a +;"));
        assert!(output.contains("^"));
    }

    #[test]
    fn render_note_without_span() {
        let diag = Diagnostic::note(DiagnosticCode::SHIFT_CHAIN, "key: 0101")
            .with_note("0,0: 'A' 'A'");
        let output = TerminalRenderer::new(false).render(&diag, "test.v", "");

        assert!(output.contains("note[N301]: key: 0101"));
        assert!(!output.contains("-->"));
        assert!(output.contains("= note: 0,0: 'A' 'A'"));
    }

    #[test]
    fn color_wraps_header() {
        let diag = Diagnostic::warning(DiagnosticCode::UNDECLARED_NET, "n1");
        let output = TerminalRenderer::new(true).render(&diag, "test.v", "");
        assert!(output.starts_with("\x1b[1;33mwarning[W202]"));
    }
}
