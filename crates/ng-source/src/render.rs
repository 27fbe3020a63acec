use annotate_snippets::AnnotationKind;
use annotate_snippets::Level;
use annotate_snippets::Renderer;
use annotate_snippets::Snippet;

use crate::Span;

/// Label printed in front of a rendered diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A positioned message about a template or declaration source, ready for rendering.
///
/// Callers pull the span, code and message out of their own error types and build
/// one of these; the renderer knows nothing about template errors.
#[derive(Debug)]
pub struct Diagnostic<'a> {
    pub source: &'a str,
    pub path: &'a str,
    pub code: &'a str,
    pub message: &'a str,
    pub severity: Severity,
    pub span: Span,
    pub label: &'a str,
    pub notes: Vec<&'a str>,
}

impl<'a> Diagnostic<'a> {
    #[must_use]
    pub fn error(source: &'a str, path: &'a str, code: &'a str, message: &'a str, span: Span) -> Self {
        Self {
            source,
            path,
            code,
            message,
            severity: Severity::Error,
            span,
            label: "",
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn note(mut self, note: &'a str) -> Self {
        self.notes.push(note);
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Renders diagnostics as text using `annotate-snippets`.
#[derive(Debug)]
pub struct DiagnosticRenderer {
    renderer: Renderer,
}

impl DiagnosticRenderer {
    /// No ANSI colors. Use for tests and log files.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            renderer: Renderer::plain(),
        }
    }

    #[must_use]
    pub fn styled() -> Self {
        Self {
            renderer: Renderer::styled(),
        }
    }

    #[must_use]
    pub fn render(&self, diagnostic: &Diagnostic<'_>) -> String {
        let level = match diagnostic.severity {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
        };

        // annotate-snippets needs a range inside the source, clamp stale spans
        let len = diagnostic.source.len();
        let start = diagnostic.span.start_usize().min(len);
        let end = diagnostic.span.end_usize().clamp(start, len);

        let snippet = Snippet::source(diagnostic.source)
            .path(diagnostic.path)
            .line_start(1)
            .annotation(
                AnnotationKind::Primary
                    .span(start..end)
                    .label(diagnostic.label),
            );

        let mut title = level
            .primary_title(diagnostic.message)
            .id(diagnostic.code)
            .element(snippet);

        for note in &diagnostic.notes {
            title = title.element(Level::NOTE.message(*note));
        }

        let report = &[title];
        self.renderer.render(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_element() {
        let source = "<p>\n<wo:Conditional condition=\"$show\">\n  visible\n";
        let diag = Diagnostic::error(
            source,
            "Main.html",
            "F100",
            "Unexpected end of template. Expected closing tag </wo:Conditional>",
            Span::from_bounds(4, 38),
        )
        .label("opened here");
        let output = DiagnosticRenderer::plain().render(&diag);

        assert!(output.contains("error[F100]"));
        assert!(output.contains("Main.html"));
        assert!(output.contains("<wo:Conditional condition=\"$show\">"));
        assert!(output.contains("opened here"));
        assert!(output.contains("^^^"));
    }

    #[test]
    fn test_note_and_warning() {
        let source = "greeting : String { value = name; }\n";
        let diag = Diagnostic::error(
            source,
            "Main.wod",
            "F200",
            "Binding resolves to an unused key",
            Span::from_bounds(20, 32),
        )
        .severity(Severity::Warning)
        .note("declared bindings are resolved on first use");
        let output = DiagnosticRenderer::plain().render(&diag);

        assert!(output.contains("warning[F200]"));
        assert!(output.contains("note: declared bindings are resolved on first use"));
    }

    #[test]
    fn test_span_past_end_is_clamped() {
        let source = "<wo:String";
        let diag = Diagnostic::error(source, "Main.html", "F100", "Unexpected end", Span::new(8, 50));
        let output = DiagnosticRenderer::plain().render(&diag);
        assert!(output.contains("<wo:String"));
    }

    #[test]
    fn test_plain_no_ansi() {
        let diag = Diagnostic::error("<x>", "t.html", "F100", "oops", Span::new(0, 1));
        assert!(!DiagnosticRenderer::plain().render(&diag).contains("\x1b["));
        assert!(DiagnosticRenderer::styled().render(&diag).contains("\x1b["));
    }
}
