//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// Layout: 16-bit index split into shard (3 bits) + local index (13 bits)
/// - Bits 15-13: Shard index (0-7)
/// - Bits 12-0: Local index within shard
///
/// The 16-bit width is what lets identifier and literal tokens carry their
/// text inline in the token stream (kind byte + two payload bytes).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u16);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Maximum local index per shard.
    pub const MAX_LOCAL: u16 = 0x1FFF;

    /// Number of shards.
    pub const NUM_SHARDS: usize = 8;

    const SHARD_SHIFT: u16 = 13;

    /// Create from shard and local index.
    #[inline]
    pub const fn new(shard: u16, local: u16) -> Self {
        debug_assert!(shard < 8);
        debug_assert!(local <= Self::MAX_LOCAL);
        Name((shard << Self::SHARD_SHIFT) | local)
    }

    /// Extract shard index.
    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> Self::SHARD_SHIFT) as usize
    }

    /// Extract local index.
    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    /// Get raw u16 value (the token-stream payload).
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Create from raw u16 value.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(shard={}, local={})", self.shard(), self.local())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
