//! Driver-level diagnostics: lexing, loading and import resolution.

use mj_diagnostic::{Diagnostic, ErrorCode};
use mj_ir::item::InvalidCast;
use mj_ir::{LexError, SourceError, SourceId, TokenSpan};

/// Lexer errors carry byte offsets, not tokens: label the file start and put
/// the offset in the message.
#[cold]
pub(crate) fn lex_error(source: SourceId, error: &LexError) -> Diagnostic {
    let code = if error.unterminated {
        ErrorCode::E0002
    } else {
        ErrorCode::E0001
    };
    Diagnostic::error(code)
        .with_message(error.to_string())
        .with_label(source, TokenSpan::default(), "in this file")
}

#[cold]
pub(crate) fn source_error(error: &SourceError) -> Diagnostic {
    let code = match error {
        SourceError::Io { .. } => ErrorCode::E3001,
        _ => ErrorCode::E9002,
    };
    Diagnostic::error(code).with_message(error.to_string())
}

/// The parser handed back a tree whose root is not a module item.
#[cold]
pub(crate) fn invalid_root(source: SourceId, span: TokenSpan, cast: &InvalidCast) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!("tree root is not a module: {cast}"))
        .with_label(source, span, "parsed from here")
}

#[cold]
pub(crate) fn unresolved_import(source: SourceId, span: TokenSpan, path: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2009)
        .with_message(format!("unresolved import `{path}`"))
        .with_label(source, span, "no module with this name in the build")
}

#[cold]
pub(crate) fn import_cycle(source: SourceId, span: TokenSpan, cycle: &[&str]) -> Diagnostic {
    let path = cycle
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(" -> ");
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!("import cycle: {path}"))
        .with_label(source, span, "this import closes the cycle")
}

#[cold]
pub(crate) fn duplicate_module(source: SourceId, span: TokenSpan, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2008)
        .with_message(format!("module `{name}` is defined more than once"))
        .with_label(source, span, "second definition")
}
