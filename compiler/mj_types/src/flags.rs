//! Pre-computed type metadata flags.
//!
//! Computed once when a type is interned, so queries like "does this mention
//! a template parameter" never walk the type.

use bitflags::bitflags;

use crate::TypeData;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        // === Presence Flags ===
        // Propagated from every referenced type.

        /// Mentions a template parameter; not concrete.
        const HAS_PARAM = 1 << 0;
        /// Mentions the error type.
        const HAS_ERROR = 1 << 1;

        // === Category Flags ===
        // Describe the outermost constructor only.

        const IS_PRIMITIVE = 1 << 8;
        const IS_INTEGER = 1 << 9;
        const IS_FLOAT = 1 << 10;
        const IS_NOMINAL = 1 << 11;
        const IS_QUALIFIED = 1 << 12;
        const IS_FUNCTION = 1 << 13;
        /// Pointer, array or slice.
        const IS_INDIRECT = 1 << 14;
    }
}

impl TypeFlags {
    /// Flags that flow from a child into every type built on it.
    pub const PROPAGATED: TypeFlags = TypeFlags::HAS_PARAM.union(TypeFlags::HAS_ERROR);

    /// Flags of `data`, given the already-computed flags of its children.
    pub fn compute(data: &TypeData, children: impl IntoIterator<Item = TypeFlags>) -> TypeFlags {
        let mut flags = match data {
            TypeData::Void | TypeData::Bool => TypeFlags::IS_PRIMITIVE,
            TypeData::Int { .. } => TypeFlags::IS_PRIMITIVE | TypeFlags::IS_INTEGER,
            TypeData::Float { .. } => TypeFlags::IS_PRIMITIVE | TypeFlags::IS_FLOAT,
            TypeData::Nominal { .. } => TypeFlags::IS_NOMINAL,
            TypeData::Pointer(_) | TypeData::Array { .. } | TypeData::Slice(_) => {
                TypeFlags::IS_INDIRECT
            }
            TypeData::Function { .. } => TypeFlags::IS_FUNCTION,
            TypeData::Qualified { .. } => TypeFlags::IS_QUALIFIED,
            TypeData::Param { .. } => TypeFlags::HAS_PARAM,
            TypeData::Error => TypeFlags::HAS_ERROR,
        };
        for child in children {
            flags |= child & Self::PROPAGATED;
        }
        flags
    }

    #[inline]
    pub fn is_concrete(self) -> bool {
        !self.contains(TypeFlags::HAS_PARAM)
    }
}
