//! Sharded string interner for identifiers and literal text.
//!
//! Provides O(1) interning and lookup with thread-safe concurrent access
//! via per-shard locking. Every [`Name`] it hands out fits in 16 bits so it
//! can be stored inline in the token stream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Name;

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u16>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// A shard ran out of 13-bit local indices.
    #[error("interner shard {shard_idx} is full: {count} strings, max is {max}", max = usize::from(Name::MAX_LOCAL) + 1)]
    ShardOverflow { shard_idx: usize, count: usize },
}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(128),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        // Pre-intern empty string at index 0
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner for concurrent access.
///
/// Strings are leaked to obtain `'static` lookups. The id space caps a
/// session at 65,536 distinct strings, which also caps the leak.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
    /// Total count of interned strings across all shards (O(1) `len()`).
    total_count: AtomicUsize,
}

impl StringInterner {
    /// Create a new interner with the primitive type names pre-interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });

        let interner = Self {
            shards,
            total_count: AtomicUsize::new(1),
        };
        interner.pre_intern_common();
        interner
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (8)"
        )]
        let shard_u16 = shard_idx as u16;
        let shard = &self.shards[shard_idx];

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Ok(Name::new(shard_u16, local));
            }
        }

        let mut guard = shard.write();

        // Another writer may have won the race.
        if let Some(&local) = guard.map.get(s) {
            return Ok(Name::new(shard_u16, local));
        }

        let count = guard.strings.len();
        let local = u16::try_from(count)
            .ok()
            .filter(|&local| local <= Name::MAX_LOCAL)
            .ok_or(InternError::ShardOverflow { shard_idx, count })?;

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);

        Ok(Name::new(shard_u16, local))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the target shard is full. Use `try_intern` where the input
    /// is user-controlled.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        match self.try_lookup(name) {
            Some(text) => text,
            None => panic!("{name:?} was not interned here"),
        }
    }

    /// Look up the string for a Name, or `None` if it was never interned here.
    pub fn try_lookup(&self, name: Name) -> Option<&'static str> {
        let guard = self.shards[name.shard()].read();
        guard.strings.get(name.local()).copied()
    }

    /// Find the Name of an already interned string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (8)"
        )]
        let shard_u16 = shard_idx as u16;
        let guard = self.shards[shard_idx].read();
        guard.map.get(s).map(|&local| Name::new(shard_u16, local))
    }

    fn pre_intern_common(&self) {
        const COMMON: &[&str] = &[
            // Primitive type names
            "void", "bool", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64",
            // Conventional identifiers
            "main", "self", "this", "value",
        ];

        for s in COMMON {
            self.intern(s);
        }
    }

    /// Get the number of interned strings (O(1)).
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Check if the interner holds only the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned names without depending on the concrete
/// interner type.
pub trait StringLookup {
    /// The string for a name, or `None` if this interner never produced it.
    fn try_lookup(&self, name: Name) -> Option<&str>;

    /// # Panics
    /// Panics if `name` is unknown to this interner.
    fn lookup(&self, name: Name) -> &str {
        match self.try_lookup(name) {
            Some(text) => text,
            None => panic!("{name:?} was not interned here"),
        }
    }
}

impl StringLookup for StringInterner {
    fn try_lookup(&self, name: Name) -> Option<&str> {
        StringInterner::try_lookup(self, name)
    }
}

/// Shared interner handle for a compilation session.
///
/// Cloned into every worker that lexes, parses or type-checks a module.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
