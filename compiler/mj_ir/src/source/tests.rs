use std::io::Write as _;

use pretty_assertions::assert_eq;

use super::*;
use crate::item::ItemKind;
use crate::token::{Token, TokenStreamBuilder};
use crate::{ItemLocator, TokenSpan};

/// Splits on spaces and newlines; everything else is an identifier.
struct WordLexer;

impl Lexer for WordLexer {
    fn lex(&self, text: &str, interner: &StringInterner) -> Result<TokenStream, Vec<LexError>> {
        let mut b = TokenStreamBuilder::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                b.push_simple(TokenKind::Newline);
            }
            for (j, word) in line.split(' ').enumerate() {
                if j > 0 {
                    b.push(Token::whitespace(1));
                }
                if word == "!" {
                    return Err(vec![LexError {
                        offset: 0,
                        message: "stray `!`".into(),
                        unterminated: false,
                    }]);
                }
                if !word.is_empty() {
                    b.push_interned(TokenKind::Identifier, interner.intern(word));
                }
            }
        }
        Ok(b.finish())
    }
}

fn lexed(registry: &SourceRegistry, interner: &StringInterner, path: &str, text: &str) -> SourceId {
    let tokens = WordLexer
        .lex(text, interner)
        .unwrap_or_else(|_| panic!("lex failed"));
    registry
        .add_source_file(SourceInput::new(path, text).with_tokens(tokens))
        .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn ids_are_sequential() {
    let registry = SourceRegistry::new();
    let a = registry.add_source_file(SourceInput::new("a.mj", ""));
    let b = registry.add_source_file(SourceInput::new("b.mj", ""));
    let c = registry.add_source_file(SourceInput::new("c.mj", ""));
    assert_eq!(
        [a.ok(), b.ok(), c.ok()],
        [Some(SourceId::new(0)), Some(SourceId::new(1)), Some(SourceId::new(2))]
    );
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.find_by_path(Path::new("b.mj")), Some(SourceId::new(1)));
}

#[test]
fn unknown_source_is_an_error() {
    let registry = SourceRegistry::new();
    assert!(matches!(
        registry.source_of(SourceId::new(9)),
        Err(SourceError::UnknownSource(id)) if id == SourceId::new(9)
    ));
}

#[test]
#[should_panic(expected = "unknown SourceId(4)")]
fn panicking_accessor_panics() {
    let registry = SourceRegistry::new();
    let _ = registry.source(SourceId::new(4));
}

#[test]
fn checksum_tracks_content() {
    let registry = SourceRegistry::new();
    let a = registry.source(registry.add_source_file(SourceInput::new("a.mj", "x y")).unwrap_or_default());
    let b = registry.source(registry.add_source_file(SourceInput::new("b.mj", "x y")).unwrap_or_default());
    let c = registry.source(registry.add_source_file(SourceInput::new("c.mj", "x z")).unwrap_or_default());
    assert_eq!(a.checksum(), b.checksum());
    assert_ne!(a.checksum(), c.checksum());
}

#[test]
fn lazily_lexes_once() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let id = registry
        .add_source_file(SourceInput::new("a.mj", "alpha beta"))
        .unwrap_or_else(|e| panic!("{e}"));
    let file = registry.source(id);
    assert!(file.tokens().is_none());
    assert!(matches!(registry.token_of(id, 0), Err(SourceError::NotLexed(_))));

    let tokens = file.tokens_with(&WordLexer, &interner).map(TokenStream::len);
    assert_eq!(tokens, Ok(3));
    assert!(file.tokens().is_some());
    assert_eq!(registry.token(id, 0).name(), Some(interner.intern("alpha")));
}

#[test]
fn lex_errors_are_returned() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let file = registry.source(
        registry
            .add_source_file(SourceInput::new("bad.mj", "a !"))
            .unwrap_or_default(),
    );
    let errors = file.tokens_with(&WordLexer, &interner).err().unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert!(file.tokens().is_none());
}

#[test]
fn token_of_checks_bounds() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let id = lexed(&registry, &interner, "a.mj", "one two");
    // one(0..3) ws(3..5) two(5..8) sentinel(8)
    assert_eq!(registry.token(id, 5).name(), Some(interner.intern("two")));
    assert!(matches!(
        registry.token_of(id, 8),
        Err(SourceError::OffsetOutOfBounds { offset: 8, .. })
    ));
}

#[test]
fn location_from_locator() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let id = lexed(&registry, &interner, "m.mj", "first line\n  second here");
    // first(0) ws(3) line(5) nl(8) ws(9) ws(11) second(13) ws(16) here(18)
    let locator = ItemLocator::new(ItemKind::VariableReference, id, 18)
        .unwrap_or_else(|e| panic!("{e}"));
    let location = registry
        .source_location_of(locator)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(location.span(), TokenSpan::point(18));
    assert_eq!(location.text(&interner), "here");
    assert_eq!(location.line_col(&interner), LineCol { line: 2, col: 10 });
    assert_eq!(location.line_text(&interner), "  second here");
}

#[test]
fn location_rejects_out_of_bounds_locator() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let id = lexed(&registry, &interner, "m.mj", "a");
    let locator = ItemLocator::new(ItemKind::Module, id, 400).unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(
        registry.source_location_of(locator),
        Err(SourceError::OffsetOutOfBounds { offset: 400, .. })
    ));
}

#[test]
fn offsets_inside_a_token_are_rejected() {
    let interner = StringInterner::new();
    let registry = SourceRegistry::new();
    let id = lexed(&registry, &interner, "a.mj", "one two\nthree");
    // one(0..3) ws(3..5) two(5..8) nl(8..9) three(9..12) sentinel(12)
    assert_eq!(registry.token(id, 3).kind(), TokenKind::Whitespace);
    assert_eq!(registry.token(id, 9).name(), Some(interner.intern("three")));
    for offset in [1, 4, 6, 10] {
        assert!(
            matches!(
                registry.token_of(id, offset),
                Err(SourceError::NotATokenStart { offset: at, .. }) if at == offset
            ),
            "offset {offset}"
        );
    }
    let inside = ItemLocator::new(ItemKind::Module, id, 11).unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(
        registry.source_location_of(inside),
        Err(SourceError::NotATokenStart { offset: 11, .. })
    ));
}

#[test]
fn payload_bytes_do_not_pass_for_tokens() {
    // An identifier whose name payload starts with the identifier kind byte,
    // so offset 1 would decode as a second identifier.
    let tokens = TokenStream::from_bytes(vec![8, 8, 0, 0]).unwrap_or_else(|e| panic!("{e}"));
    let registry = SourceRegistry::new();
    let id = registry
        .add_source_file(SourceInput::new("raw.mj", "x").with_tokens(tokens))
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(registry.token_of(id, 0).is_ok());
    assert!(matches!(
        registry.token_of(id, 1),
        Err(SourceError::NotATokenStart { offset: 1, .. })
    ));
    let locator = ItemLocator::new(ItemKind::Module, id, 1).unwrap_or_else(|e| panic!("{e}"));
    assert!(registry.source_location_of(locator).is_err());
}

#[test]
fn load_source_file_reads_disk() {
    let dir = std::env::temp_dir().join(format!("mj_ir_load_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("{e}"));
    let path = dir.join("main.mj");
    let mut file = std::fs::File::create(&path).unwrap_or_else(|e| panic!("{e}"));
    file.write_all(b"func main").unwrap_or_else(|e| panic!("{e}"));
    drop(file);

    let registry = SourceRegistry::new();
    let id = registry.load_source_file(&path).unwrap_or_else(|e| panic!("{e}"));
    let source = registry.source(id);
    assert_eq!(source.text(), "func main");
    assert!(source.modified().is_some());

    let missing = registry.load_source_file(dir.join("missing.mj"));
    assert!(matches!(missing, Err(SourceError::Io { .. })));
    let _ = std::fs::remove_dir_all(&dir);
}
