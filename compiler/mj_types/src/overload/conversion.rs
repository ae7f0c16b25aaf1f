//! Implicit conversions between argument and parameter types.

use crate::registry::DefKind;
use crate::{Idx, Qualifiers, TypeContext, TypeData};

/// How well an argument matches a parameter. Lower is better.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Exact = 0,
    Conversion = 1,
    /// Absorbed by a variadic tail.
    Variadic = 2,
}

impl Rank {
    #[inline]
    pub const fn cost(self) -> u32 {
        self as u32
    }
}

impl TypeContext {
    /// Rank of passing a `from` value where `to` is expected, `None` if no
    /// implicit conversion exists.
    ///
    /// Allowed conversions:
    /// - integer widening within the same signedness
    /// - unsigned to a strictly wider signed integer
    /// - integer to float, and float widening
    /// - enumeration to its index type
    /// - adding qualifiers
    /// - pointer to class to pointer to a base class or interface
    /// - array to a slice of the same element type
    pub fn implicit_conversion(&self, from: Idx, to: Idx) -> Option<Rank> {
        if from == to {
            return Some(Rank::Exact);
        }
        let pool = self.pool();
        let (from_base, from_quals) = pool.split_qualifiers(from);
        let (to_base, to_quals) = pool.split_qualifiers(to);
        if !to_quals.contains(from_quals) {
            return None;
        }
        if from_base == to_base || self.converts(from_base, to_base) {
            return Some(Rank::Conversion);
        }
        None
    }

    /// Conversions between unqualified types.
    fn converts(&self, from: Idx, to: Idx) -> bool {
        let pool = self.pool();
        match (pool.lookup(from), pool.lookup(to)) {
            (
                TypeData::Int {
                    bits: from_bits,
                    signed: from_signed,
                },
                TypeData::Int {
                    bits: to_bits,
                    signed: to_signed,
                },
            ) => to_bits > from_bits && (from_signed == to_signed || !from_signed),
            (TypeData::Int { .. }, TypeData::Float { .. }) => true,
            (TypeData::Float { bits: from_bits }, TypeData::Float { bits: to_bits }) => {
                to_bits > from_bits
            }
            (
                TypeData::Nominal {
                    kind: DefKind::Enumeration,
                    ..
                },
                _,
            ) => self
                .body_of(from)
                .and_then(|body| body.index_type)
                .is_some_and(|index| pool.unqualified(index) == to),
            (TypeData::Pointer(from_pointee), TypeData::Pointer(to_pointee)) => {
                self.pointee_converts(from_pointee, to_pointee)
            }
            (TypeData::Array { elem, .. }, TypeData::Slice(slice_elem)) => {
                let (from_elem, from_q) = pool.split_qualifiers(elem);
                let (to_elem, to_q) = pool.split_qualifiers(slice_elem);
                from_elem == to_elem && to_q.contains(from_q)
            }
            _ => false,
        }
    }

    /// `*A` to `*B`: B may add qualifiers and may be a supertype of A.
    fn pointee_converts(&self, from: Idx, to: Idx) -> bool {
        let pool = self.pool();
        let (from_base, from_q): (Idx, Qualifiers) = pool.split_qualifiers(from);
        let (to_base, to_q) = pool.split_qualifiers(to);
        to_q.contains(from_q)
            && (from_base == to_base
                || (self.is_record(from_base) && self.is_subtype_of(from_base, to_base)))
    }

    fn is_record(&self, ty: Idx) -> bool {
        self.def_of(ty)
            .is_some_and(|def| matches!(def.kind, DefKind::Class | DefKind::Structure))
    }
}
