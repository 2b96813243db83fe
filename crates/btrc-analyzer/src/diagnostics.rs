//! Ariadne-based rendering of analyzer diagnostics.
//!
//! Diagnostics carry 1-based line/column positions; rendering resolves
//! them to byte offsets through [`LineIndex`] and emits one labeled
//! report per diagnostic. Output is colorless so tests and logs stay
//! stable.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};

use btrc_common::line_index::LineIndex;

use crate::error::{Diagnostic, Severity};

/// Render one diagnostic into a formatted report string.
pub fn render_diagnostic(
    diag: &Diagnostic,
    severity: Severity,
    source: &str,
    _filename: &str,
) -> String {
    let index = LineIndex::new(source);
    let source_len = source.len();
    let start = (index.offset(diag.line, diag.col) as usize).min(source_len);
    // Ariadne needs a non-empty span when there is any source to point at.
    let end = (start + 1).min(source_len).max(start);
    let span: Range<usize> = start..end;

    let kind = match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let config = Config::default().with_color(false);

    let report = Report::build(kind, span.clone())
        .with_message(&diag.message)
        .with_config(config)
        .with_label(Label::new(span).with_message(&diag.message))
        .finish();

    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

/// Render every error and warning in severity groups: warnings first,
/// then errors, each in discovery order.
pub fn render_all(
    errors: &[Diagnostic],
    warnings: &[Diagnostic],
    source: &str,
    filename: &str,
) -> Vec<String> {
    let mut out = Vec::with_capacity(errors.len() + warnings.len());
    for diag in warnings {
        out.push(render_diagnostic(diag, Severity::Warning, source, filename));
    }
    for diag in errors {
        out.push(render_diagnostic(diag, Severity::Error, source, filename));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_contains_message_and_source_line() {
        let source = "int x = 1;\nint y = ;\n";
        let diag = Diagnostic::new("Expected expression", 2, 9);
        let out = render_diagnostic(&diag, Severity::Error, source, "test.btrc");
        assert!(out.contains("Expected expression"), "{out}");
        assert!(out.contains("int y"), "{out}");
    }

    #[test]
    fn render_all_orders_warnings_before_errors() {
        let source = "int x = 1;";
        let errors = vec![Diagnostic::new("boom", 1, 1)];
        let warnings = vec![Diagnostic::new("careful", 1, 1)];
        let out = render_all(&errors, &warnings, source, "test.btrc");
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("careful"));
        assert!(out[1].contains("boom"));
    }
}
