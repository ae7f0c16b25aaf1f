//! Compact binary token stream.
//!
//! Each token is a kind byte followed by 0, 1 or 2 payload bytes, so a cursor
//! advances by [`Token::size`] without a side table. Identifier and literal
//! text is stored once in the [`StringInterner`](crate::StringInterner) and
//! referenced by [`Name`](crate::Name).

mod kind;
mod stream;

pub use kind::{PayloadClass, TokenKind};
pub use stream::{
    dump, Token, TokenCursor, TokenStream, TokenStreamBuilder, TokenStreamError, INDENT_WIDTH,
};

use crate::StringInterner;

/// Error reported by a lexer for one malformed piece of input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (byte {offset})")]
pub struct LexError {
    /// Byte offset into the source text.
    pub offset: usize,
    pub message: String,
    /// True for an unterminated literal or comment, false for a stray character.
    pub unterminated: bool,
}

/// Character-level scanner turning source text into a token stream.
///
/// Implemented outside this crate; the core only consumes the stream.
pub trait Lexer: Send + Sync {
    fn lex(&self, text: &str, interner: &StringInterner) -> Result<TokenStream, Vec<LexError>>;
}

#[cfg(test)]
mod tests;
