//! Loaded source files and the session-wide registry that owns them.

mod location;
mod registry;

use std::fmt;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use rustc_hash::FxHasher;

use crate::token::{LexError, Lexer, TokenKind, TokenStream, TokenStreamError};
use crate::{StringInterner, TokenSpan};

pub use location::{LineCol, SourceLocation};
pub use registry::SourceRegistry;

/// Stable id of a source file, assigned by the [`SourceRegistry`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SourceId(u16);

impl SourceId {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        SourceId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Errors from the source registry.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("source id space exhausted ({} files)", u32::from(u16::MAX) + 1)]
    IdSpaceExhausted,
    #[error("unknown {0:?}")]
    UnknownSource(SourceId),
    #[error("{0:?} has not been lexed")]
    NotLexed(SourceId),
    #[error("offset {offset} is outside the tokens of {source_id:?}")]
    OffsetOutOfBounds { source_id: SourceId, offset: u64 },
    #[error("offset {offset} is not the start of a token in {source_id:?}")]
    NotATokenStart { source_id: SourceId, offset: u64 },
    #[error(transparent)]
    Stream(#[from] TokenStreamError),
}

/// Everything needed to register a file.
#[derive(Clone, Debug)]
pub struct SourceInput {
    pub path: PathBuf,
    pub text: String,
    pub modified: Option<SystemTime>,
    /// Tokens lexed ahead of registration, if any.
    pub tokens: Option<TokenStream>,
}

impl SourceInput {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        SourceInput {
            path: path.into(),
            text: text.into(),
            modified: None,
            tokens: None,
        }
    }

    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: TokenStream) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// One loaded source file. Immutable apart from its lazily built tables.
pub struct SourceFile {
    id: SourceId,
    path: PathBuf,
    text: String,
    modified: Option<SystemTime>,
    checksum: u64,
    tokens: OnceLock<TokenStream>,
    /// Offset of the first token on each line.
    line_starts: OnceLock<Vec<u64>>,
}

impl SourceFile {
    fn new(id: SourceId, input: SourceInput) -> Self {
        let checksum = content_checksum(&input.text);
        let tokens = OnceLock::new();
        if let Some(stream) = input.tokens {
            let _ = tokens.set(stream);
        }
        SourceFile {
            id,
            path: input.path,
            text: input.text,
            modified: input.modified,
            checksum,
            tokens,
            line_starts: OnceLock::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> SourceId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// FxHash of the file contents.
    #[inline]
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Tokens, if the file has been lexed.
    #[inline]
    pub fn tokens(&self) -> Option<&TokenStream> {
        self.tokens.get()
    }

    /// Tokens, lexing on first use.
    ///
    /// Concurrent first calls may both lex; one result is kept.
    pub fn tokens_with(
        &self,
        lexer: &dyn Lexer,
        interner: &StringInterner,
    ) -> Result<&TokenStream, Vec<LexError>> {
        if let Some(stream) = self.tokens.get() {
            return Ok(stream);
        }
        let stream = lexer.lex(&self.text, interner)?;
        tracing::trace!(source = self.id.raw(), tokens = stream.len(), "lexed source");
        Ok(self.tokens.get_or_init(|| stream))
    }

    pub(crate) fn require_tokens(&self) -> Result<&TokenStream, SourceError> {
        self.tokens.get().ok_or(SourceError::NotLexed(self.id))
    }

    /// Token offsets that begin a line, in order.
    pub(crate) fn line_starts(&self) -> Result<&[u64], SourceError> {
        if let Some(starts) = self.line_starts.get() {
            return Ok(starts);
        }
        let tokens = self.require_tokens()?;
        let mut starts = vec![0];
        for (offset, token) in tokens.cursor() {
            if token.kind() == TokenKind::Newline {
                starts.push(offset + token.size() as u64);
            }
        }
        Ok(self.line_starts.get_or_init(|| starts))
    }

    /// Fail unless a token, or the end sentinel, begins exactly at `offset`.
    ///
    /// Walks the tokens of the line `offset` falls on.
    pub(crate) fn require_token_start(&self, offset: u64) -> Result<(), SourceError> {
        let tokens = self.require_tokens()?;
        if offset == tokens.end_offset() {
            return Ok(());
        }
        let starts = self.line_starts()?;
        let line = starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let from = starts.get(line).copied().unwrap_or(0);
        let aligned = tokens
            .tokens_in(TokenSpan::new(from, u32::MAX))?
            .map(|(at, _)| at)
            .find(|&at| at >= offset)
            == Some(offset);
        if aligned {
            Ok(())
        } else {
            Err(SourceError::NotATokenStart {
                source_id: self.id,
                offset,
            })
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("len", &self.text.len())
            .field("lexed", &self.tokens.get().is_some())
            .finish()
    }
}

/// Content checksum used for change detection.
pub fn content_checksum(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests;
