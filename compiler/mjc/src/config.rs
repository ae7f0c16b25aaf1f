//! Session configuration.

use mj_diagnostic::DiagnosticConfig;
use mj_types::TypeConfig;

use crate::cache::InvalidationPolicy;

/// Settings for one compilation session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum depth of nested template specializations.
    pub recursion_limit: usize,
    /// Size and alignment of pointers on the target, in bytes.
    pub pointer_size: u64,
    /// Worker threads for module processing; `0` lets rayon decide.
    pub threads: usize,
    /// Per-module diagnostic limits.
    pub diagnostics: DiagnosticConfig,
    /// How cached module outputs are invalidated.
    pub invalidation: InvalidationPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let types = TypeConfig::default();
        SessionConfig {
            recursion_limit: types.recursion_limit,
            pointer_size: types.pointer_size,
            threads: 0,
            diagnostics: DiagnosticConfig::default(),
            invalidation: InvalidationPolicy::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_pointer_size(mut self, bytes: u64) -> Self {
        self.pointer_size = bytes;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn with_invalidation(mut self, invalidation: InvalidationPolicy) -> Self {
        self.invalidation = invalidation;
        self
    }

    /// The type-system subset of this configuration.
    pub fn type_config(&self) -> TypeConfig {
        TypeConfig::default()
            .with_recursion_limit(self.recursion_limit)
            .with_pointer_size(self.pointer_size)
    }
}
