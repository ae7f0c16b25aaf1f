//! Interned type handle.
//!
//! `Idx` is the only way the rest of the compiler refers to a type. Types are
//! compared by index equality, never structurally.

use std::fmt;

/// A 32-bit index into the [`TypePool`](crate::TypePool).
///
/// # Layout
/// - Bits 31-28: shard index (0-15)
/// - Bits 27-0: local index within the shard
///
/// Primitive types live in shard 0 at fixed local indices.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    pub const VOID: Idx = Idx(0);
    pub const BOOL: Idx = Idx(1);
    pub const I8: Idx = Idx(2);
    pub const I16: Idx = Idx(3);
    pub const I32: Idx = Idx(4);
    pub const I64: Idx = Idx(5);
    pub const U8: Idx = Idx(6);
    pub const U16: Idx = Idx(7);
    pub const U32: Idx = Idx(8);
    pub const U64: Idx = Idx(9);
    pub const F32: Idx = Idx(10);
    pub const F64: Idx = Idx(11);
    /// Placeholder for a type that failed to resolve; never has a layout.
    pub const ERROR: Idx = Idx(12);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 13;

    /// Maximum local index per shard (2^28 - 1).
    pub const MAX_LOCAL: u32 = 0x0FFF_FFFF;

    /// Number of shards in the type pool.
    pub const NUM_SHARDS: usize = 16;

    #[inline]
    pub const fn from_shard_local(shard: u32, local: u32) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(local <= Self::MAX_LOCAL);
        Idx((shard << 28) | local)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> 28) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Idx(raw)
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    /// Spelling of a primitive type, `None` for everything else.
    pub const fn primitive_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("void"),
            1 => Some("bool"),
            2 => Some("i8"),
            3 => Some("i16"),
            4 => Some("i32"),
            5 => Some("i64"),
            6 => Some("u8"),
            7 => Some("u16"),
            8 => Some("u32"),
            9 => Some("u64"),
            10 => Some("f32"),
            11 => Some("f64"),
            12 => Some("<error>"),
            _ => None,
        }
    }

    /// Primitive named `name`, as written in source.
    pub fn primitive_by_name(name: &str) -> Option<Idx> {
        (0..Self::PRIMITIVE_COUNT - 1)
            .map(Idx)
            .find(|idx| idx.primitive_name() == Some(name))
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => write!(f, "Idx({name})"),
            None => write!(f, "Idx({}:{})", self.shard(), self.local()),
        }
    }
}
