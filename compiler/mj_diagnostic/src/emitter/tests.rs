use mj_ir::token::TokenStreamBuilder;
use mj_ir::{
    SourceId, SourceInput, SourceRegistry, StringInterner, Token, TokenKind, TokenSpan,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::{ErrorCode, Severity};

/// `func main()\n    return 42`, with `42` at offset 14.
fn sample_source(registry: &SourceRegistry, interner: &StringInterner) -> SourceId {
    let mut b = TokenStreamBuilder::new();
    b.push_simple(TokenKind::KwFunc);
    b.push(Token::whitespace(1));
    b.push_interned(TokenKind::Identifier, interner.intern("main"));
    b.push_simple(TokenKind::LParen);
    b.push_simple(TokenKind::RParen);
    b.push_simple(TokenKind::Newline);
    b.push(Token::indent(1));
    b.push_simple(TokenKind::KwReturn);
    b.push(Token::whitespace(1));
    b.push_interned(TokenKind::IntLiteral, interner.intern("42"));
    let text = "func main()\n    return 42";
    registry
        .add_source_file(SourceInput::new("main.mj", text).with_tokens(b.finish()))
        .unwrap_or_else(|e| panic!("{e}"))
}

fn render(diag: &Diagnostic, sources: Option<SourceContext<'_>>) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    if let Some(ctx) = sources {
        emitter = emitter.with_sources(ctx);
    }
    emitter.emit(diag);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn test_labels_resolve_to_line_and_column() {
    let registry = SourceRegistry::new();
    let interner = StringInterner::new();
    let src = sample_source(&registry, &interner);

    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("no matching overload")
        .with_label(src, TokenSpan::new(14, 1), "returned here")
        .with_note("candidates: `main`");
    let text = render(
        &diag,
        Some(SourceContext {
            registry: &registry,
            interner: &interner,
        }),
    );

    assert_eq!(
        text,
        "error[E2003]: no matching overload\n\
         \x20 --> main.mj:2:12: returned here\n\
         \x20  |     return 42\n\
         \x20 = note: candidates: `main`\n\n"
    );
}

#[test]
fn test_unresolved_labels_fall_back_to_span() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("member not found")
        .with_label(SourceId::new(7), TokenSpan::new(3, 2), "here");
    let text = render(&diag, None);
    assert!(text.contains("SourceId(7)"));
    assert!(text.contains("here"));
}

#[test]
fn test_color_output_has_escapes() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Always, false);
    emitter.emit(&Diagnostic::error(ErrorCode::E1001).with_message("unexpected token"));
    let text = String::from_utf8(emitter.into_inner()).unwrap_or_else(|e| panic!("{e}"));
    assert!(text.contains("\x1b["));
    assert!(text.contains("E1001"));
}

#[test]
fn test_emit_summary() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2, 1);
    emitter.emit_summary(1, 0);
    emitter.emit_summary(0, 3);
    emitter.emit_summary(0, 0);
    let text = String::from_utf8(emitter.into_inner()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        text,
        "error: aborting due to 2 previous errors; 1 warning emitted\n\
         error: aborting due to previous error\n\
         warning: 3 warnings emitted\n"
    );
}

#[test]
fn test_tally_counts_by_severity() {
    let diags = vec![
        Diagnostic::error(ErrorCode::E2001),
        Diagnostic::warning(ErrorCode::E2008),
        Diagnostic::error(ErrorCode::E2002),
    ];
    assert_eq!(tally(&diags), (2, 1));
    assert_eq!(diags[1].severity, Severity::Warning);
}

#[test]
fn test_color_mode() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert_eq!(ColorMode::default(), ColorMode::Auto);
}
