use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{SourceError, SourceFile, SourceId, SourceInput, SourceLocation};
use crate::token::Token;
use crate::{ItemLocator, TokenSpan};

#[derive(Default)]
struct RegistryInner {
    files: Vec<Arc<SourceFile>>,
    by_path: FxHashMap<PathBuf, SourceId>,
}

/// Owns every source file of a session.
///
/// Ids are handed out sequentially and never reused. Registration takes the
/// write lock; every query takes the read lock.
#[derive(Default)]
pub struct SourceRegistry {
    inner: RwLock<RegistryInner>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %input.path.display()))]
    pub fn add_source_file(&self, input: SourceInput) -> Result<SourceId, SourceError> {
        let mut inner = self.inner.write();
        let id = u16::try_from(inner.files.len())
            .map(SourceId::new)
            .map_err(|_| SourceError::IdSpaceExhausted)?;
        let path = input.path.clone();
        inner.files.push(Arc::new(SourceFile::new(id, input)));
        inner.by_path.insert(path, id);
        tracing::debug!(id = id.raw(), "registered source");
        Ok(id)
    }

    /// Read a file from disk and register it.
    pub fn load_source_file(&self, path: impl AsRef<Path>) -> Result<SourceId, SourceError> {
        let path = path.as_ref();
        let io = |error| SourceError::Io {
            path: path.to_owned(),
            error,
        };
        let text = std::fs::read_to_string(path).map_err(io)?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let mut input = SourceInput::new(path, text);
        input.modified = modified;
        self.add_source_file(input)
    }

    pub fn source_of(&self, id: SourceId) -> Result<Arc<SourceFile>, SourceError> {
        self.inner
            .read()
            .files
            .get(id.index())
            .cloned()
            .ok_or(SourceError::UnknownSource(id))
    }

    /// # Panics
    /// Panics if `id` was not issued by this registry.
    pub fn source(&self, id: SourceId) -> Arc<SourceFile> {
        self.source_of(id).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Latest id registered under `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<SourceId> {
        self.inner.read().by_path.get(path).copied()
    }

    pub fn token_of(&self, source_id: SourceId, offset: u64) -> Result<Token, SourceError> {
        let file = self.source_of(source_id)?;
        let tokens = file.require_tokens()?;
        if offset >= tokens.end_offset() {
            return Err(SourceError::OffsetOutOfBounds { source_id, offset });
        }
        file.require_token_start(offset)?;
        Ok(tokens.token_at(offset)?)
    }

    /// # Panics
    /// Panics if the source is unknown, unlexed, or `offset` is out of bounds.
    pub fn token(&self, source_id: SourceId, offset: u64) -> Token {
        self.token_of(source_id, offset)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Location of the first token of the item a locator addresses.
    pub fn source_location_of(&self, locator: ItemLocator) -> Result<SourceLocation, SourceError> {
        let file = self.source_of(locator.source())?;
        SourceLocation::new(file, TokenSpan::point(locator.offset()))
    }

    /// # Panics
    /// Panics if the locator points outside a registered, lexed source.
    pub fn location(&self, locator: ItemLocator) -> SourceLocation {
        self.source_location_of(locator)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn len(&self) -> usize {
        self.inner.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().files.is_empty()
    }

    /// Snapshot of all files in id order.
    pub fn files(&self) -> Vec<Arc<SourceFile>> {
        self.inner.read().files.clone()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("files", &self.len())
            .finish()
    }
}
