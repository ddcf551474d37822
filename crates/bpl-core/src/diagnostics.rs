//! Diagnostic values and the collector the driver owns.

use std::fmt;

use crate::{SemanticError, Span};

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The module is invalid and must not reach code generation.
    Error,
    /// Suspicious but legal code, such as unreachable statements.
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        };
        f.write_str(s)
    }
}

/// File plus span.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub file: String,
    pub span: Span,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span)
    }
}

/// A single message produced while checking a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Remediation hint, distinct from the message.
    pub hint: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Convert a checker error into an error diagnostic for `file`.
    pub fn from_error(file: &str, error: &SemanticError) -> Self {
        Self {
            severity: Severity::Error,
            message: error.message(),
            hint: error.hint(),
            location: SourceLocation::new(file, error.span()),
        }
    }

    pub fn warning(
        file: &str,
        message: impl Into<String>,
        hint: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            hint: hint.into(),
            location: SourceLocation::new(file, span),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;
        if !self.hint.is_empty() {
            write!(f, "\n  hint: {}", self.hint)?;
        }
        Ok(())
    }
}

/// An ordered collection of diagnostics.
///
/// Diagnostics are kept in the order they were reported. The error flag is
/// tracked on insertion so [`has_errors`](Self::has_errors) does not scan.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record `error` against `file`.
    pub fn report(&mut self, file: &str, error: &SemanticError) {
        self.push(Diagnostic::from_error(file, error));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        for diagnostic in other.diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_error() -> SemanticError {
        SemanticError::undefined("x", None, Span::point(2, 9))
    }

    #[test]
    fn from_error_copies_message_and_hint() {
        let diag = Diagnostic::from_error("main.x", &sample_error());
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "Undefined symbol 'x'");
        assert_eq!(diag.location.file, "main.x");
        assert_eq!(diag.location.span, Span::point(2, 9));
    }

    #[test]
    fn tracks_errors_and_warnings() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());

        diags.push(Diagnostic::warning(
            "main.x",
            "Unreachable code detected.",
            "Remove the code after the return.",
            Span::point(5, 1),
        ));
        assert!(!diags.has_errors());
        assert!(diags.has_warnings());

        diags.report("main.x", &sample_error());
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn display_renders_location_and_hint() {
        let mut diags = Diagnostics::new();
        diags.report("main.x", &sample_error());
        assert_eq!(
            diags.to_string(),
            "main.x:2:9: error: Undefined symbol 'x'\n  hint: Ensure the variable or function is declared before use.\n"
        );
    }

    #[test]
    fn extend_keeps_order() {
        let mut first = Diagnostics::new();
        first.report("a.x", &sample_error());
        let mut second = Diagnostics::new();
        second.report("b.x", &sample_error());
        first.extend(second);
        let files: Vec<_> = first.iter().map(|d| d.location.file.as_str()).collect();
        assert_eq!(files, vec!["a.x", "b.x"]);
    }
}
