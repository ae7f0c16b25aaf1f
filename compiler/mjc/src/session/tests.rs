use mj_diagnostic::ErrorCode;
use mj_ir::item::{ItemKind, ItemPayload};
use mj_ir::{ItemTreeBuilder, LexError, StringInterner, TokenSpan, TokenStream};
use pretty_assertions::assert_eq;

use super::*;
use crate::parser::ParseOutput;

struct NoLexer;

impl Lexer for NoLexer {
    fn lex(&self, _: &str, _: &StringInterner) -> Result<TokenStream, Vec<LexError>> {
        Err(vec![
            LexError {
                offset: 4,
                message: "stray `$`".to_owned(),
                unterminated: false,
            },
            LexError {
                offset: 9,
                message: "unterminated string".to_owned(),
                unterminated: true,
            },
        ])
    }
}

struct NoParser;

impl Parser for NoParser {
    fn parse(&self, _: &SourceFile, _: &TokenStream, _: &StringInterner) -> ParseOutput {
        ParseOutput::default()
    }
}

/// Lexes every file to an empty stream.
struct EmptyLexer;

impl Lexer for EmptyLexer {
    fn lex(&self, _: &str, _: &StringInterner) -> Result<TokenStream, Vec<LexError>> {
        Ok(TokenStream::empty())
    }
}

/// Returns a well-formed tree whose root is a block, not a module.
struct BlockParser;

impl Parser for BlockParser {
    fn parse(&self, file: &SourceFile, _: &TokenStream, _: &StringInterner) -> ParseOutput {
        let mut builder = ItemTreeBuilder::new(file.id());
        let tree = builder
            .push(ItemKind::Block, TokenSpan::default(), ItemPayload::None, &[])
            .and_then(|root| builder.finish(root))
            .unwrap_or_else(|e| panic!("{e}"));
        ParseOutput::from_tree(tree)
    }
}

#[test]
fn lex_errors_pick_their_code() {
    let session = Session::new(SessionConfig::default());
    let id = session
        .add_source(SourceInput::new("broken.mj", "a $ \"b"))
        .unwrap_or_else(|e| panic!("{e}"));
    let report = session.build(&NoLexer, &NoParser, &[id]);

    let module = &report.modules()[0];
    assert_eq!(module.status(), ModuleStatus::Failed);
    let codes: Vec<ErrorCode> = module.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0001, ErrorCode::E0002]);
    assert_eq!(module.diagnostics()[0].message, "stray `$` (byte 4)");
    assert!(module.tree().is_none());
}

#[test]
fn module_name_falls_back_to_file_stem() {
    let session = Session::new(SessionConfig::default());
    let id = session
        .add_source(SourceInput::new("dir/geometry.mj", ""))
        .unwrap_or_else(|e| panic!("{e}"));
    let report = session.build(&NoLexer, &NoParser, &[id]);
    assert_eq!(session.interner().lookup(report.modules()[0].name()), "geometry");
}

#[test]
fn non_module_root_is_an_invalid_cast() {
    let session = Session::new(SessionConfig::default());
    let id = session
        .add_source(SourceInput::new("block.mj", ""))
        .unwrap_or_else(|e| panic!("{e}"));
    let report = session.build(&EmptyLexer, &BlockParser, &[id]);

    let module = &report.modules()[0];
    assert_eq!(module.status(), ModuleStatus::Failed);
    assert!(module.tree().is_none());
    let codes: Vec<ErrorCode> = module.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E9001]);
    assert!(
        module.diagnostics()[0].message.starts_with("tree root is not a module"),
        "{}",
        module.diagnostics()[0].message
    );
}

#[test]
fn unknown_source_is_unattached() {
    let session = Session::new(SessionConfig::default());
    let report = session.build(&NoLexer, &NoParser, &[SourceId::new(7)]);
    assert!(report.modules().is_empty());
    let codes: Vec<ErrorCode> = report.unattached().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E9002]);
    assert_eq!(report.error_count(), 1);
}

#[test]
fn repeated_ids_build_once() {
    let session = Session::new(SessionConfig::default().with_threads(2));
    let id = session
        .add_source(SourceInput::new("once.mj", ""))
        .unwrap_or_else(|e| panic!("{e}"));
    let report = session.build(&NoLexer, &NoParser, &[id, id, id]);
    assert_eq!(report.modules().len(), 1);
}

#[test]
fn io_errors_lower_to_e3001() {
    let session = Session::new(SessionConfig::default());
    let err = match session.load_source("/definitely/not/here.mj") {
        Ok(id) => panic!("loaded {id:?}"),
        Err(err) => err,
    };
    assert_eq!(Session::source_error(&err).code, ErrorCode::E3001);
}

#[test]
fn cycle_message_lists_the_path() {
    let diag = diagnostics::import_cycle(SourceId::new(0), TokenSpan::new(0, 2), &["a", "b", "a"]);
    assert_eq!(diag.code, ErrorCode::E2010);
    assert_eq!(diag.message, "import cycle: `a` -> `b` -> `a`");
}

#[test]
fn sequential_map_keeps_order() {
    let doubled = map_maybe_parallel(false, vec![1, 2, 3], |n| n * 2);
    assert_eq!(doubled, vec![2, 4, 6]);
    let parallel = map_maybe_parallel(true, (0..100).collect(), |n: i32| n + 1);
    assert_eq!(parallel, (1..101).collect::<Vec<_>>());
}
