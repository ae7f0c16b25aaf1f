//! Diagnostic system for the Mj front end.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Token-span labels, tied to a source (where it went wrong)
//! - Notes and suggestions (how to fix)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type is proof that at least one error was emitted.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn check_module() -> Result<Checked, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{candidates_note, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
