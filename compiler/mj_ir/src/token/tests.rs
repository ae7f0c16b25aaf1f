use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::{StringInterner, TokenSpan};

fn sample(interner: &StringInterner) -> TokenStream {
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
    b.finish()
}

#[test]
fn encoded_sizes() {
    assert_eq!(TokenKind::None.encoded_size(), 1);
    assert_eq!(TokenKind::Newline.encoded_size(), 1);
    assert_eq!(TokenKind::KwIf.encoded_size(), 1);
    assert_eq!(TokenKind::ShrAssign.encoded_size(), 1);
    assert_eq!(TokenKind::Indent.encoded_size(), 2);
    assert_eq!(TokenKind::Whitespace.encoded_size(), 2);
    assert_eq!(TokenKind::Identifier.encoded_size(), 3);
    assert_eq!(TokenKind::DocComment.encoded_size(), 3);
}

#[test]
fn from_byte_agrees_with_discriminant() {
    for &kind in TokenKind::ALL {
        assert_eq!(TokenKind::from_byte(kind as u8), Some(kind));
    }
    assert_eq!(TokenKind::from_byte(4), None);
    assert_eq!(TokenKind::from_byte(255), None);
}

#[test]
fn builtin_text_only_for_fixed_kinds() {
    assert_eq!(TokenKind::KwWhile.builtin_text(), Some("while"));
    assert_eq!(TokenKind::Arrow.builtin_text(), Some("->"));
    assert!(!TokenKind::Identifier.has_builtin_text());
    assert!(!TokenKind::Indent.has_builtin_text());
    assert!(TokenKind::KwStruct.is_keyword());
    assert!(!TokenKind::Plus.is_keyword());
}

#[test]
fn cursor_yields_offsets_and_stops_at_sentinel() {
    let interner = StringInterner::new();
    let stream = sample(&interner);
    let offsets: Vec<u64> = stream.cursor().map(|(at, _)| at).collect();
    assert_eq!(offsets, vec![0, 1, 3, 6, 7, 8, 9, 11, 12, 14]);
    assert_eq!(stream.len(), 10);
    assert_eq!(stream.end_offset(), 17);
    assert_eq!(stream.byte_len(), 18);
}

#[test]
fn cursor_is_restartable() {
    let interner = StringInterner::new();
    let stream = sample(&interner);
    let first: Vec<_> = stream.cursor().collect();
    let second: Vec<_> = stream.cursor().collect();
    assert_eq!(first, second);
}

#[test]
fn render_reconstructs_text() {
    let interner = StringInterner::new();
    let stream = sample(&interner);
    assert_eq!(stream.render(&interner), "func main()\n    return 42");
}

#[test]
fn text_of_span() {
    let interner = StringInterner::new();
    let stream = sample(&interner);
    let span = TokenSpan::new(3, 3);
    assert_eq!(stream.text_of(span, &interner), Ok("main()".to_owned()));
}

#[test]
fn token_at_decodes_payload() {
    let interner = StringInterner::new();
    let stream = sample(&interner);
    let token = stream.token_at(3).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(token.kind(), TokenKind::Identifier);
    assert_eq!(token.name(), Some(interner.intern("main")));
    assert_eq!(stream.token_at(9).map(Token::count), Ok(Some(1)));
    assert!(matches!(
        stream.token_at(99),
        Err(TokenStreamError::OffsetOutOfBounds { offset: 99, .. })
    ));
}

#[test]
fn from_bytes_validates() {
    assert_eq!(
        TokenStream::from_bytes(vec![TokenKind::KwIf as u8]),
        Err(TokenStreamError::MissingSentinel)
    );
    assert_eq!(
        TokenStream::from_bytes(vec![4, 0]),
        Err(TokenStreamError::UnknownKind { offset: 0, byte: 4 })
    );
    assert_eq!(
        TokenStream::from_bytes(vec![TokenKind::Identifier as u8, 1]),
        Err(TokenStreamError::Truncated {
            offset: 0,
            kind: TokenKind::Identifier
        })
    );
    assert_eq!(
        TokenStream::from_bytes(vec![0, 0]),
        Err(TokenStreamError::TrailingBytes { count: 1 })
    );
    let ok = TokenStream::from_bytes(vec![TokenKind::Indent as u8, 2, 0]);
    assert_eq!(ok.map(|s| s.len()), Ok(1));
}

#[test]
fn empty_stream() {
    let stream = TokenStream::empty();
    assert!(stream.is_empty());
    assert_eq!(stream.cursor().count(), 0);
    assert_eq!(stream.as_bytes(), &[0]);
}

#[test]
fn constructors_reject_wrong_payload_class() {
    assert_eq!(Token::simple(TokenKind::Identifier), None);
    assert_eq!(Token::interned(TokenKind::KwIf, crate::Name::EMPTY), None);
}

fn arb_token() -> impl Strategy<Value = Token> {
    let fixed: Vec<TokenKind> = TokenKind::ALL
        .iter()
        .copied()
        .filter(|k| k.payload_class() == PayloadClass::None && *k != TokenKind::None)
        .collect();
    let named: Vec<TokenKind> = TokenKind::ALL
        .iter()
        .copied()
        .filter(|k| k.payload_class() == PayloadClass::Name)
        .collect();
    prop_oneof![
        prop::sample::select(fixed).prop_filter_map("simple", Token::simple),
        any::<u8>().prop_map(Token::indent),
        any::<u8>().prop_map(Token::whitespace),
        (prop::sample::select(named), any::<u16>())
            .prop_filter_map("interned", |(k, raw)| Token::interned(
                k,
                crate::Name::from_raw(raw)
            )),
    ]
}

proptest! {
    #[test]
    fn iteration_visits_every_token_once(tokens in prop::collection::vec(arb_token(), 0..64)) {
        let mut builder = TokenStreamBuilder::new();
        let offsets: Vec<u64> = tokens.iter().map(|&t| builder.push(t)).collect();
        let stream = builder.finish();

        let seen: Vec<(u64, Token)> = stream.cursor().collect();
        let expected: Vec<(u64, Token)> = offsets.into_iter().zip(tokens).collect();
        prop_assert_eq!(seen, expected);

        let reparsed = TokenStream::from_bytes(stream.as_bytes().to_vec());
        prop_assert_eq!(reparsed.as_ref().map(TokenStream::len), Ok(stream.len()));
    }
}

#[test]
fn foreign_names_render_without_panicking() {
    // Identifier whose name payload was never interned.
    let stream = TokenStream::from_bytes(vec![TokenKind::Identifier as u8, 0xff, 0xff, 0])
        .unwrap_or_else(|e| panic!("{e}"));
    let interner = StringInterner::new();
    assert_eq!(stream.render(&interner), "\u{fffd}");
    let token = stream.token_at(0).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(token.text(&interner), "\u{fffd}");
}
