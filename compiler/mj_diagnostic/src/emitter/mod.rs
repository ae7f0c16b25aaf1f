//! Diagnostic Emitters
//!
//! Each emitter implements the `DiagnosticEmitter` trait. The terminal emitter
//! turns token-span labels into `path:line:col` positions when it is given the
//! session's source registry.

mod terminal;

pub use terminal::{ColorMode, SourceContext, TerminalEmitter};

use crate::Diagnostic;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// Count errors and warnings in a batch of diagnostics.
pub fn tally(diagnostics: &[Diagnostic]) -> (usize, usize) {
    diagnostics.iter().fold((0, 0), |(errors, warnings), d| {
        match d.severity {
            crate::Severity::Error => (errors + 1, warnings),
            crate::Severity::Warning => (errors, warnings + 1),
            crate::Severity::Note | crate::Severity::Help => (errors, warnings),
        }
    })
}

#[cfg(test)]
mod tests;
