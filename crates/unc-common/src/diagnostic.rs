//! Diagnostics stream (§6 outputs, §7 error handling design).
//!
//! `Diagnostic`/`Severity` model the *accumulating* per-file stream —
//! recoverable syntax issues, classification uncertainty (never actually
//! constructed, per §7: "these never produce diagnostics"), and
//! informational notes. This is independent of the typed `Result`-returning
//! errors each pass uses for genuinely fatal conditions (§7.1) — a
//! `Diagnostic` never aborts the pass that emits it.

use serde::Serialize;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Fatal,
}

/// One accumulated diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
    pub code: &'static str,
}

impl Diagnostic {
    pub fn new(severity: Severity, span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            span,
            message: message.into(),
            code,
        }
    }

    pub fn warning(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, span, code, message)
    }

    pub fn fatal(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, span, code, message)
    }

    pub fn info(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, span, code, message)
    }
}

/// Per-run accumulation of diagnostics, matching the "per-file counter" of
/// §7's propagation rule: the core never aborts on recoverable errors, it
/// just keeps piling them up here.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Fold another pass's bag into this one, in order.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Render a single diagnostic against `source` into a labeled terminal
/// report, following `snow-typeck::diagnostics::render_diagnostic`'s
/// colorless, code-prefixed style. Additive: nothing in this crate requires
/// it to produce a token list, only to pretty-print one.
pub fn render(diagnostic: &Diagnostic, source: &str, filename: &str) -> String {
    use ariadne::{Color, Config, Label, Report, ReportKind, Source};

    let kind = match diagnostic.severity {
        Severity::Fatal => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    let len = source.len();
    let start = (diagnostic.span.start as usize).min(len);
    let end = (diagnostic.span.end as usize).min(len).max(start + 1).min(len.max(1));

    let mut buf = Vec::new();
    Report::build(kind, (filename, start..end))
        .with_config(Config::default().with_color(false))
        .with_code(diagnostic.code)
        .with_message(&diagnostic.message)
        .with_label(Label::new((filename, start..end)).with_color(Color::Unset))
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .expect("ariadne report must render to an in-memory buffer");
    String::from_utf8(buf).expect("ariadne output is always valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_tracks_fatal_presence() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_fatal());
        bag.push(Diagnostic::warning(Span::new(0, 1), "W001", "unbalanced bracket"));
        assert!(!bag.has_fatal());
        bag.push(Diagnostic::fatal(Span::new(2, 3), "E001", "unterminated raw string"));
        assert!(bag.has_fatal());
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn severity_orders_fatal_above_warning_above_info() {
        assert!(Severity::Fatal > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn render_includes_code_and_message() {
        let diag = Diagnostic::warning(Span::new(0, 1), "W010", "unbalanced bracket");
        let out = render(&diag, "int x;", "test.c");
        assert!(out.contains("W010"));
        assert!(out.contains("unbalanced bracket"));
    }
}
