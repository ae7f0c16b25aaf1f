use std::fmt;
use std::sync::Arc;

use super::{SourceError, SourceFile};
use crate::token::{TokenKind, TokenStream};
use crate::{StringLookup, TokenSpan};

/// 1-based line and column (columns count characters).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A token span inside a specific, lexed source file.
#[derive(Clone)]
pub struct SourceLocation {
    file: Arc<SourceFile>,
    span: TokenSpan,
}

impl SourceLocation {
    /// Pair a file with a span, checking the span starts on a token.
    pub fn new(file: Arc<SourceFile>, span: TokenSpan) -> Result<Self, SourceError> {
        let tokens = file.require_tokens()?;
        let end = tokens.end_offset();
        let in_bounds = if span.is_empty() {
            span.start <= end
        } else {
            span.start < end
        };
        if !in_bounds {
            return Err(SourceError::OffsetOutOfBounds {
                source_id: file.id(),
                offset: span.start,
            });
        }
        file.require_token_start(span.start)?;
        Ok(SourceLocation { file, span })
    }

    #[inline]
    pub fn file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    #[inline]
    pub fn span(&self) -> TokenSpan {
        self.span
    }

    fn tokens(&self) -> &TokenStream {
        match self.file.tokens() {
            Some(tokens) => tokens,
            None => unreachable!("locations are only built over lexed files"),
        }
    }

    fn line_start(&self) -> (usize, u64) {
        let starts = self.file.line_starts().unwrap_or(&[0]);
        let index = starts
            .partition_point(|&s| s <= self.span.start)
            .saturating_sub(1);
        (index, starts.get(index).copied().unwrap_or(0))
    }

    /// Line and column of the span's first token.
    pub fn line_col(&self, interner: &dyn StringLookup) -> LineCol {
        let (index, line_start) = self.line_start();
        let mut col = 1u32;
        let mut text = String::new();
        if let Ok(cursor) = self.tokens().tokens_in(TokenSpan::new(line_start, u32::MAX)) {
            for (offset, token) in cursor {
                if offset >= self.span.start {
                    break;
                }
                text.clear();
                token.write_text(&mut text, interner);
                col = col.saturating_add(u32::try_from(text.chars().count()).unwrap_or(u32::MAX));
            }
        }
        LineCol {
            line: u32::try_from(index + 1).unwrap_or(u32::MAX),
            col,
        }
    }

    /// Source text covered by the span.
    pub fn text(&self, interner: &dyn StringLookup) -> String {
        self.tokens()
            .text_of(self.span, interner)
            .unwrap_or_default()
    }

    /// Full text of the line the span starts on, without the newline.
    pub fn line_text(&self, interner: &dyn StringLookup) -> String {
        let (_, line_start) = self.line_start();
        let mut out = String::new();
        if let Ok(cursor) = self.tokens().tokens_in(TokenSpan::new(line_start, u32::MAX)) {
            for (_, token) in cursor {
                if token.kind() == TokenKind::Newline {
                    break;
                }
                token.write_text(&mut out, interner);
            }
        }
        out
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.file.path().display(), self.span)
    }
}
