//! Token ranges inside one source's token stream.

use std::fmt;

/// Half-open range of tokens `[start, start + count)` in a token stream.
///
/// `start` is the byte offset of the first token; `count` is measured in
/// tokens, not bytes. Spans never own text.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSpan {
    pub start: u64,
    pub count: u32,
}

/// Error constructing a span.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("token offset {0} exceeds the 40-bit offset range")]
pub struct SpanError(pub u64);

impl TokenSpan {
    /// Largest representable start offset (40 bits).
    pub const MAX_START: u64 = (1 << 40) - 1;

    /// Empty span at offset 0.
    pub const DUMMY: TokenSpan = TokenSpan { start: 0, count: 0 };

    #[inline]
    pub const fn new(start: u64, count: u32) -> Self {
        debug_assert!(start <= Self::MAX_START);
        TokenSpan { start, count }
    }

    pub const fn try_new(start: u64, count: u32) -> Result<Self, SpanError> {
        if start > Self::MAX_START {
            return Err(SpanError(start));
        }
        Ok(TokenSpan { start, count })
    }

    /// Span covering exactly the token at `start`.
    #[inline]
    pub const fn point(start: u64) -> Self {
        Self::new(start, 1)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.count == 0
    }

    /// Span starting where `self` starts and covering `other` when `other`
    /// begins inside or right after `self`'s tokens.
    ///
    /// The caller supplies the token count between the two starts, since a
    /// span alone cannot convert bytes to tokens.
    pub const fn extend(self, tokens_between: u32, other: TokenSpan) -> Self {
        let end = tokens_between + other.count;
        let count = if end > self.count { end } else { self.count };
        TokenSpan {
            start: self.start,
            count,
        }
    }
}

impl fmt::Debug for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}+{}", self.start, self.count)
    }
}
