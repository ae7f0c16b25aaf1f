//! Variable-length token encoding, the owning stream and its cursor.

use std::fmt::{self, Write as _};

use super::kind::{PayloadClass, TokenKind};
use crate::{Name, StringLookup, TokenSpan};

/// Spaces rendered per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// One decoded token: a kind plus its (possibly absent) inline payload.
///
/// The payload is kept raw; its meaning comes from [`TokenKind::payload_class`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    payload: u16,
}

impl Token {
    /// Sentinel terminating every stream.
    pub const SENTINEL: Token = Token {
        kind: TokenKind::None,
        payload: 0,
    };

    /// Token without payload (keywords, punctuation, newline).
    ///
    /// Returns `None` if `kind` carries a payload.
    pub const fn simple(kind: TokenKind) -> Option<Token> {
        match kind.payload_class() {
            PayloadClass::None => Some(Token { kind, payload: 0 }),
            _ => None,
        }
    }

    /// Indentation token with the given depth in levels.
    pub const fn indent(depth: u8) -> Token {
        Token {
            kind: TokenKind::Indent,
            payload: depth as u16,
        }
    }

    /// Whitespace run of `count` spaces.
    pub const fn whitespace(count: u8) -> Token {
        Token {
            kind: TokenKind::Whitespace,
            payload: count as u16,
        }
    }

    /// Token whose text lives in the interner.
    ///
    /// Returns `None` if `kind` does not carry an interned payload.
    pub const fn interned(kind: TokenKind, name: Name) -> Option<Token> {
        match kind.payload_class() {
            PayloadClass::Name => Some(Token {
                kind,
                payload: name.raw(),
            }),
            _ => None,
        }
    }

    #[inline]
    pub const fn kind(self) -> TokenKind {
        self.kind
    }

    /// Bytes this token occupies in the stream.
    #[inline]
    pub const fn size(self) -> usize {
        self.kind.encoded_size()
    }

    /// Depth or run length for indent and whitespace tokens.
    #[inline]
    pub fn count(self) -> Option<u8> {
        match self.kind.payload_class() {
            PayloadClass::Count => u8::try_from(self.payload).ok(),
            _ => None,
        }
    }

    /// Interned text for identifier, literal and comment tokens.
    #[inline]
    pub const fn name(self) -> Option<Name> {
        match self.kind.payload_class() {
            PayloadClass::Name => Some(Name::from_raw(self.payload)),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_sentinel(self) -> bool {
        matches!(self.kind, TokenKind::None)
    }

    /// Append this token's source text to `out`.
    pub fn write_text(self, out: &mut String, interner: &dyn StringLookup) {
        if let Some(text) = self.kind.builtin_text() {
            out.push_str(text);
            return;
        }
        match self.kind.payload_class() {
            PayloadClass::Count => {
                let width = match self.kind {
                    TokenKind::Indent => INDENT_WIDTH,
                    _ => 1,
                };
                let spaces = usize::from(self.payload) * width;
                out.extend(std::iter::repeat(' ').take(spaces));
            }
            // Streams from `from_bytes` may carry names this interner never saw.
            PayloadClass::Name => match interner.try_lookup(Name::from_raw(self.payload)) {
                Some(text) => out.push_str(text),
                None => out.push(char::REPLACEMENT_CHARACTER),
            },
            PayloadClass::None => {}
        }
    }

    /// Source text of this token.
    pub fn text(self, interner: &dyn StringLookup) -> String {
        let mut out = String::new();
        self.write_text(&mut out, interner);
        out
    }

    fn encode_into(self, out: &mut Vec<u8>) {
        out.push(self.kind as u8);
        match self.kind.payload_class() {
            PayloadClass::None => {}
            PayloadClass::Count => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "count payloads are built from u8"
                )]
                out.push(self.payload as u8);
            }
            PayloadClass::Name => out.extend_from_slice(&self.payload.to_le_bytes()),
        }
    }

    /// Decode the token starting at `offset`.
    fn decode(bytes: &[u8], offset: usize) -> Result<Token, TokenStreamError> {
        let byte = *bytes
            .get(offset)
            .ok_or(TokenStreamError::OffsetOutOfBounds {
                offset: offset as u64,
                len: bytes.len() as u64,
            })?;
        let kind = TokenKind::from_byte(byte).ok_or(TokenStreamError::UnknownKind {
            offset: offset as u64,
            byte,
        })?;
        let truncated = TokenStreamError::Truncated {
            offset: offset as u64,
            kind,
        };
        let payload = match kind.payload_class() {
            PayloadClass::None => 0,
            PayloadClass::Count => u16::from(*bytes.get(offset + 1).ok_or(truncated)?),
            PayloadClass::Name => {
                let lo = *bytes.get(offset + 1).ok_or(truncated.clone())?;
                let hi = *bytes.get(offset + 2).ok_or(truncated)?;
                u16::from_le_bytes([lo, hi])
            }
        };
        Ok(Token { kind, payload })
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.payload_class() {
            PayloadClass::None => write!(f, "{:?}", self.kind),
            PayloadClass::Count => write!(f, "{:?}({})", self.kind, self.payload),
            PayloadClass::Name => write!(f, "{:?}({:?})", self.kind, Name::from_raw(self.payload)),
        }
    }
}

/// Errors in an encoded token buffer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("unknown token kind byte {byte:#04x} at offset {offset}")]
    UnknownKind { offset: u64, byte: u8 },
    #[error("truncated {kind:?} token at offset {offset}")]
    Truncated { offset: u64, kind: TokenKind },
    #[error("token stream is not terminated by the end sentinel")]
    MissingSentinel,
    #[error("{count} trailing bytes after the end sentinel")]
    TrailingBytes { count: usize },
    #[error("offset {offset} is outside the token stream ({len} bytes)")]
    OffsetOutOfBounds { offset: u64, len: u64 },
    #[error("token stream exceeds the 40-bit offset range")]
    TooLarge,
}

/// Owned, immutable encoded token sequence for one source file.
///
/// Always ends with exactly one [`TokenKind::None`] sentinel.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenStream {
    bytes: Box<[u8]>,
    token_count: u32,
}

impl TokenStream {
    /// Validate an externally produced buffer.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Result<Self, TokenStreamError> {
        let bytes = bytes.into();
        if bytes.len() as u64 > TokenSpan::MAX_START + 1 {
            return Err(TokenStreamError::TooLarge);
        }
        let mut offset = 0;
        let mut token_count = 0u32;
        loop {
            if offset >= bytes.len() {
                return Err(TokenStreamError::MissingSentinel);
            }
            let token = Token::decode(&bytes, offset)?;
            offset += token.size();
            if token.is_sentinel() {
                break;
            }
            token_count += 1;
        }
        if offset != bytes.len() {
            return Err(TokenStreamError::TrailingBytes {
                count: bytes.len() - offset,
            });
        }
        Ok(TokenStream { bytes, token_count })
    }

    /// Stream holding only the sentinel.
    pub fn empty() -> Self {
        TokenStreamBuilder::new().finish()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size, sentinel included.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of tokens, sentinel excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.token_count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    /// Byte offset of the sentinel.
    #[inline]
    pub fn end_offset(&self) -> u64 {
        (self.bytes.len() - 1) as u64
    }

    /// Cursor over every token from the start.
    pub fn cursor(&self) -> TokenCursor<'_> {
        TokenCursor {
            bytes: &self.bytes,
            offset: 0,
            remaining: None,
        }
    }

    /// Decode the token at a byte offset.
    pub fn token_at(&self, offset: u64) -> Result<Token, TokenStreamError> {
        let len = self.bytes.len() as u64;
        let index = usize::try_from(offset)
            .ok()
            .filter(|&i| i < self.bytes.len())
            .ok_or(TokenStreamError::OffsetOutOfBounds { offset, len })?;
        Token::decode(&self.bytes, index)
    }

    /// Cursor over the `span.count` tokens starting at `span.start`.
    ///
    /// Iteration stops early at the sentinel.
    pub fn tokens_in(&self, span: TokenSpan) -> Result<TokenCursor<'_>, TokenStreamError> {
        if span.start > self.end_offset() {
            return Err(TokenStreamError::OffsetOutOfBounds {
                offset: span.start,
                len: self.bytes.len() as u64,
            });
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "start was just bounds-checked against the buffer length"
        )]
        let offset = span.start as usize;
        Ok(TokenCursor {
            bytes: &self.bytes,
            offset,
            remaining: Some(span.count),
        })
    }

    /// Reconstruct the source text covered by `span`.
    pub fn text_of(
        &self,
        span: TokenSpan,
        interner: &dyn StringLookup,
    ) -> Result<String, TokenStreamError> {
        let mut out = String::new();
        for (_, token) in self.tokens_in(span)? {
            token.write_text(&mut out, interner);
        }
        Ok(out)
    }

    /// Reconstruct the full source text.
    pub fn render(&self, interner: &dyn StringLookup) -> String {
        let mut out = String::new();
        for (_, token) in self.cursor() {
            token.write_text(&mut out, interner);
        }
        out
    }
}

impl fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("tokens", &self.token_count)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = (u64, Token);
    type IntoIter = TokenCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

/// Forward iterator yielding `(offset, token)` until the sentinel.
///
/// Restart by asking the stream for a new cursor.
#[derive(Clone)]
pub struct TokenCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    remaining: Option<u32>,
}

impl TokenCursor<'_> {
    /// Byte offset of the next token.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset as u64
    }
}

impl Iterator for TokenCursor<'_> {
    type Item = (u64, Token);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let token = match Token::decode(self.bytes, self.offset) {
            Ok(token) => token,
            // Streams are validated on construction; a bad byte here is a bug.
            Err(err) => panic!("corrupt token stream: {err}"),
        };
        if token.is_sentinel() {
            return None;
        }
        let at = self.offset as u64;
        self.offset += token.size();
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        Some((at, token))
    }
}

impl std::iter::FusedIterator for TokenCursor<'_> {}

/// Incremental encoder used by lexers and tests.
#[derive(Default)]
pub struct TokenStreamBuilder {
    bytes: Vec<u8>,
    token_count: u32,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        TokenStreamBuilder {
            bytes: Vec::with_capacity(bytes),
            token_count: 0,
        }
    }

    /// Append a token, returning its byte offset.
    ///
    /// Sentinels are ignored; [`finish`](Self::finish) writes the only one.
    pub fn push(&mut self, token: Token) -> u64 {
        let at = self.bytes.len() as u64;
        if token.is_sentinel() {
            return at;
        }
        token.encode_into(&mut self.bytes);
        self.token_count += 1;
        at
    }

    /// Append a payload-free token.
    ///
    /// # Panics
    /// Panics if `kind` carries a payload.
    pub fn push_simple(&mut self, kind: TokenKind) -> u64 {
        match Token::simple(kind) {
            Some(token) => self.push(token),
            None => panic!("{kind:?} tokens carry a payload"),
        }
    }

    /// Append an interned-text token.
    ///
    /// # Panics
    /// Panics if `kind` has no interned payload.
    pub fn push_interned(&mut self, kind: TokenKind, name: Name) -> u64 {
        match Token::interned(kind, name) {
            Some(token) => self.push(token),
            None => panic!("{kind:?} tokens do not carry interned text"),
        }
    }

    /// Offset the next pushed token will get.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn len(&self) -> usize {
        self.token_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    /// Terminate with the sentinel.
    pub fn finish(mut self) -> TokenStream {
        Token::SENTINEL.encode_into(&mut self.bytes);
        TokenStream {
            bytes: self.bytes.into_boxed_slice(),
            token_count: self.token_count,
        }
    }
}

/// Debug helper: `Kind(payload) Kind ...` on one line.
pub fn dump(stream: &TokenStream) -> String {
    let mut out = String::new();
    for (i, (_, token)) in stream.cursor().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{token:?}");
    }
    out
}
