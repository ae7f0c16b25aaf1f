//! Change detection for the incremental build cache.
//!
//! Every module records a [`ModuleStamp`] describing the input it was built
//! from. A later session compares the current stamp with the cached one to
//! decide whether the cached object can be reused.

use std::path::PathBuf;
use std::time::SystemTime;

use mj_ir::SourceFile;

/// How a cached module output is judged stale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidationPolicy {
    /// Rebuild only when the source is newer than the cached output.
    Timestamp,
    /// Also rebuild when the content checksum differs.
    #[default]
    Checksum,
}

/// Identity of a module's input at build time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleStamp {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub checksum: u64,
    /// Paths of imported modules, in import order.
    pub dependencies: Vec<PathBuf>,
}

impl ModuleStamp {
    pub fn of(source: &SourceFile, dependencies: Vec<PathBuf>) -> Self {
        ModuleStamp {
            path: source.path().to_path_buf(),
            modified: source.modified(),
            checksum: source.checksum(),
            dependencies,
        }
    }
}

/// Decides whether a module must be rebuilt.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub invalidation: InvalidationPolicy,
}

impl CachePolicy {
    pub fn new(invalidation: InvalidationPolicy) -> Self {
        CachePolicy { invalidation }
    }

    /// Whether `current` can reuse the output recorded as `cached`.
    ///
    /// A missing entry, a changed dependency list, or a source newer than the
    /// cached one always rebuilds. Unknown modification times count as newer.
    pub fn needs_rebuild(&self, current: &ModuleStamp, cached: Option<&ModuleStamp>) -> bool {
        let Some(cached) = cached else {
            return true;
        };
        if current.path != cached.path || current.dependencies != cached.dependencies {
            return true;
        }
        let newer = match (current.modified, cached.modified) {
            (Some(now), Some(then)) => now > then,
            _ => true,
        };
        match self.invalidation {
            InvalidationPolicy::Timestamp => newer,
            InvalidationPolicy::Checksum => newer || current.checksum != cached.checksum,
        }
    }
}

#[cfg(test)]
mod tests;
