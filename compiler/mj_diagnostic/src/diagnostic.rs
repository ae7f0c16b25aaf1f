//! Core diagnostic types for structured error reporting.

use std::fmt;

use mj_ir::{SourceId, TokenSpan};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A labeled token span with a message.
///
/// Labels carry the source they point into, so a single diagnostic can refer
/// to several files (e.g. both sides of a duplicate definition).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub source: SourceId,
    pub span: TokenSpan,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    pub fn primary(source: SourceId, span: TokenSpan, message: impl Into<String>) -> Self {
        Label {
            source,
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(source: SourceId, span: TokenSpan, message: impl Into<String>) -> Self {
        Label {
            source,
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with all context needed for an error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Human-readable suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(
        mut self,
        source: SourceId,
        span: TokenSpan,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::primary(source, span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(
        mut self,
        source: SourceId,
        span: TokenSpan,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(source, span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// First primary label, if any.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_primary)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// "Did you mean" note listing candidate names, if there are any.
pub fn candidates_note(candidates: &[impl AsRef<str>]) -> Option<String> {
    match candidates {
        [] => None,
        [only] => Some(format!("candidate: `{}`", only.as_ref())),
        many => {
            let list: Vec<String> = many.iter().map(|c| format!("`{}`", c.as_ref())).collect();
            Some(format!("candidates: {}", list.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_collects_parts() {
        let src = SourceId::new(2);
        let diag = Diagnostic::error(ErrorCode::E2001)
            .with_message("no member `len` on `Point`")
            .with_secondary_label(src, TokenSpan::new(0, 3), "`Point` defined here")
            .with_label(src, TokenSpan::new(40, 1), "unknown member")
            .with_note("candidates: `x`, `y`");

        assert!(diag.is_error());
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(
            diag.primary_label().map(|l| l.span),
            Some(TokenSpan::new(40, 1))
        );
        assert_eq!(diag.to_string(), "error[E2001]: no member `len` on `Point`");
    }

    #[test]
    fn warning_is_not_error() {
        let diag = Diagnostic::warning(ErrorCode::E2008).with_message("shadowed");
        assert!(!diag.is_error());
        assert_eq!(diag.primary_label(), None);
    }

    #[test]
    fn candidates_note_formats() {
        assert_eq!(candidates_note(&[] as &[&str]), None);
        assert_eq!(candidates_note(&["x"]), Some("candidate: `x`".to_owned()));
        assert_eq!(
            candidates_note(&["x", "y"]),
            Some("candidates: `x`, `y`".to_owned())
        );
    }
}
