//! Per-module diagnostic queue.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Exact-duplicate suppression
//! - `ErrorGuaranteed` proof that errors were emitted

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashSet, FxHasher};

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before stopping (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

fn fingerprint(diag: &Diagnostic) -> u64 {
    let mut hasher = FxHasher::default();
    diag.hash(&mut hasher);
    hasher.finish()
}

/// Queue for collecting, deduplicating and sorting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// let guarantee = queue.emit_error(diagnostic);
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<u64>,
    /// Count of errors (not warnings/notes).
    error_count: usize,
    /// Errors dropped because the limit was reached.
    dropped: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was queued, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.dropped += 1;
            return false;
        }

        if self.config.deduplicate && !self.seen.insert(fingerprint(&diag)) {
            return false;
        }

        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Add every diagnostic from an iterator.
    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The proof is returned even when the diagnostic was filtered as a
    /// duplicate or over the limit; an equivalent error is already recorded.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a {}", diag.severity);
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Proof of errors if any were emitted.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        (self.error_count > 0).then(ErrorGuaranteed::new)
    }

    /// Diagnostics sorted by primary location, leaving the queue empty.
    ///
    /// Unlabelled diagnostics come first; ties keep insertion order. A
    /// "too many errors" note is appended if the limit dropped anything.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.primary_label().map(|l| (l.source, l.span.start)));
        if self.dropped > 0 {
            result.push(too_many_errors(self.config.error_limit, self.dropped));
        }
        self.seen.clear();
        self.error_count = 0;
        self.dropped = 0;
        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, dropped: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9003)
        .with_message(format!("aborting after {limit} errors"))
        .with_note(format!("{dropped} further errors were not reported"))
}
