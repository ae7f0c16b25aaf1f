//! Sharded type pool.
//!
//! Structural [`TypeData`] is interned into an [`Idx`]; equal data always
//! yields the same index, so type identity is index equality. Follows the
//! same pattern as the `StringInterner` in `mj_ir`.

use std::hash::{Hash, Hasher};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::registry::{DefId, DefKind};
use crate::template::TemplateId;
use crate::{Idx, Qualifiers, TypeData, TypeFlags};

/// Error when interning a type fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeInternError {
    #[error("type pool shard {shard} exceeded {} types", Idx::MAX_LOCAL)]
    ShardOverflow { shard: usize },
}

/// Per-shard storage for interned types.
struct TypeShard {
    map: FxHashMap<TypeData, u32>,
    types: Vec<(TypeData, TypeFlags)>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            map: FxHashMap::default(),
            types: Vec::with_capacity(64),
        }
    }

    /// Shard 0 with the primitives at their fixed indices.
    fn with_primitives() -> Self {
        let mut shard = Self::new();
        for data in TypeData::primitives() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "primitive count is fixed and small"
            )]
            let local = shard.types.len() as u32;
            let flags = TypeFlags::compute(&data, []);
            shard.map.insert(data.clone(), local);
            shard.types.push((data, flags));
        }
        shard
    }
}

/// Sharded type interner for concurrent access.
///
/// # Thread Safety
/// One `RwLock` per shard; lookups of already-interned types only take read
/// locks.
pub struct TypePool {
    shards: [RwLock<TypeShard>; Idx::NUM_SHARDS],
}

impl TypePool {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(TypeShard::with_primitives())
            } else {
                RwLock::new(TypeShard::new())
            }
        });
        TypePool { shards }
    }

    /// Shards 1.. take hashed data; shard 0 holds only the primitives so
    /// their fixed indices stay stable.
    #[inline]
    fn shard_for(data: &TypeData) -> usize {
        let mut hasher = FxHasher::default();
        data.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "truncation is fine for hash-based shard selection"
        )]
        let hash = hasher.finish() as usize;
        1 + hash % (Idx::NUM_SHARDS - 1)
    }

    /// Try to intern a type, returning its `Idx` or an error on overflow.
    pub fn try_intern(&self, data: TypeData) -> Result<Idx, TypeInternError> {
        if let Some(idx) = data.primitive_idx() {
            return Ok(idx);
        }

        let shard_idx = Self::shard_for(&data);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        // Fast path: already interned
        if let Some(&local) = shard.read().map.get(&data) {
            return Ok(Idx::from_shard_local(shard_u32, local));
        }

        // Children are interned already, so their flags are readable without
        // holding this shard's write lock.
        let flags = TypeFlags::compute(&data, data.children().map(|c| self.flags(c)));

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(&data) {
            return Ok(Idx::from_shard_local(shard_u32, local));
        }
        let local = u32::try_from(guard.types.len())
            .ok()
            .filter(|&l| l <= Idx::MAX_LOCAL)
            .ok_or(TypeInternError::ShardOverflow { shard: shard_idx })?;
        guard.types.push((data.clone(), flags));
        guard.map.insert(data, local);
        Ok(Idx::from_shard_local(shard_u32, local))
    }

    /// Intern a type.
    ///
    /// # Panics
    /// Panics if a shard exceeds capacity. Use `try_intern` for fallible
    /// interning.
    pub fn intern(&self, data: TypeData) -> Idx {
        self.try_intern(data).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The data behind `idx`.
    ///
    /// # Panics
    /// Panics if `idx` was not created by this pool.
    pub fn lookup(&self, idx: Idx) -> TypeData {
        match self.try_lookup(idx) {
            Some(data) => data,
            None => panic!("{idx:?} does not belong to this type pool"),
        }
    }

    pub fn try_lookup(&self, idx: Idx) -> Option<TypeData> {
        let guard = self.shards.get(idx.shard())?.read();
        guard.types.get(idx.local()).map(|(data, _)| data.clone())
    }

    /// Cached flags of `idx`; an unknown index reads as the error type.
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.shards
            .get(idx.shard())
            .and_then(|shard| shard.read().types.get(idx.local()).map(|(_, f)| *f))
            .unwrap_or(TypeFlags::HAS_ERROR)
    }

    /// Number of interned types, primitives included.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().types.len()).sum()
    }

    /// Always false; the primitives are pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }

    // === Constructors ===

    pub fn int(&self, bits: u8, signed: bool) -> Idx {
        self.intern(TypeData::Int { bits, signed })
    }

    pub fn pointer(&self, pointee: Idx) -> Idx {
        self.intern(TypeData::Pointer(pointee))
    }

    pub fn array(&self, elem: Idx, len: u64) -> Idx {
        self.intern(TypeData::Array { elem, len })
    }

    pub fn slice(&self, elem: Idx) -> Idx {
        self.intern(TypeData::Slice(elem))
    }

    pub fn function(&self, params: impl Into<Box<[Idx]>>, ret: Idx, variadic: bool) -> Idx {
        self.intern(TypeData::Function {
            params: params.into(),
            ret,
            variadic,
        })
    }

    pub fn nominal(&self, kind: DefKind, def: DefId) -> Idx {
        self.intern(TypeData::Nominal { kind, def })
    }

    pub fn param(&self, template: TemplateId, index: u16) -> Idx {
        self.intern(TypeData::Param { template, index })
    }

    /// Canonical qualified form of `ty`.
    ///
    /// Qualifying a qualified type merges the sets over its unqualified base,
    /// and an empty set returns the base unchanged, so every distinct
    /// `(base, quals)` pair has exactly one index.
    pub fn qualified(&self, ty: Idx, quals: Qualifiers) -> Idx {
        let (base, existing) = self.split_qualifiers(ty);
        let merged = existing | quals;
        if merged.is_empty() {
            return base;
        }
        self.intern(TypeData::Qualified {
            base,
            quals: merged,
        })
    }

    /// Unqualified base and qualifier set of `ty`.
    pub fn split_qualifiers(&self, ty: Idx) -> (Idx, Qualifiers) {
        if !self.flags(ty).contains(TypeFlags::IS_QUALIFIED) {
            return (ty, Qualifiers::empty());
        }
        match self.lookup(ty) {
            TypeData::Qualified { base, quals } => (base, quals),
            _ => (ty, Qualifiers::empty()),
        }
    }

    #[inline]
    pub fn unqualified(&self, ty: Idx) -> Idx {
        self.split_qualifiers(ty).0
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
