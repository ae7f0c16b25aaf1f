//! Structural type data stored in the pool.

use crate::registry::{DefId, DefKind};
use crate::template::TemplateId;
use crate::{Idx, Qualifiers};

/// The key the [`TypePool`](crate::TypePool) interns.
///
/// Nominal types are keyed by their [`DefId`], so two structures with the
/// same members are still distinct types.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeData {
    // Basic
    Void,
    Bool,
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    Nominal { kind: DefKind, def: DefId },

    // Derived
    Pointer(Idx),
    Array { elem: Idx, len: u64 },
    Slice(Idx),
    Function {
        params: Box<[Idx]>,
        ret: Idx,
        /// A trailing `Slice` parameter absorbs the remaining arguments.
        variadic: bool,
    },
    Qualified { base: Idx, quals: Qualifiers },

    /// Parameter `index` of `template`; only meaningful inside its body.
    Param { template: TemplateId, index: u16 },

    Error,
}

impl TypeData {
    /// Fixed index for pre-interned primitives.
    pub(crate) fn primitive_idx(&self) -> Option<Idx> {
        let idx = match self {
            TypeData::Void => Idx::VOID,
            TypeData::Bool => Idx::BOOL,
            TypeData::Int { bits: 8, signed: true } => Idx::I8,
            TypeData::Int { bits: 16, signed: true } => Idx::I16,
            TypeData::Int { bits: 32, signed: true } => Idx::I32,
            TypeData::Int { bits: 64, signed: true } => Idx::I64,
            TypeData::Int { bits: 8, signed: false } => Idx::U8,
            TypeData::Int { bits: 16, signed: false } => Idx::U16,
            TypeData::Int { bits: 32, signed: false } => Idx::U32,
            TypeData::Int { bits: 64, signed: false } => Idx::U64,
            TypeData::Float { bits: 32 } => Idx::F32,
            TypeData::Float { bits: 64 } => Idx::F64,
            TypeData::Error => Idx::ERROR,
            _ => return None,
        };
        Some(idx)
    }

    /// Primitive data in index order, for seeding shard 0.
    pub(crate) fn primitives() -> [TypeData; Idx::PRIMITIVE_COUNT as usize] {
        [
            TypeData::Void,
            TypeData::Bool,
            TypeData::Int { bits: 8, signed: true },
            TypeData::Int { bits: 16, signed: true },
            TypeData::Int { bits: 32, signed: true },
            TypeData::Int { bits: 64, signed: true },
            TypeData::Int { bits: 8, signed: false },
            TypeData::Int { bits: 16, signed: false },
            TypeData::Int { bits: 32, signed: false },
            TypeData::Int { bits: 64, signed: false },
            TypeData::Float { bits: 32 },
            TypeData::Float { bits: 64 },
            TypeData::Error,
        ]
    }

    /// Types directly referenced by this one.
    pub fn children(&self) -> impl Iterator<Item = Idx> + '_ {
        let (head, rest): (Option<Idx>, &[Idx]) = match self {
            TypeData::Pointer(inner) | TypeData::Slice(inner) => (Some(*inner), &[]),
            TypeData::Array { elem, .. } => (Some(*elem), &[]),
            TypeData::Qualified { base, .. } => (Some(*base), &[]),
            TypeData::Function { params, ret, .. } => (Some(*ret), params),
            _ => (None, &[]),
        };
        head.into_iter().chain(rest.iter().copied())
    }
}
