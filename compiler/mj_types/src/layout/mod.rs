//! Size and alignment.
//!
//! Layouts are computed on demand and cached per `Idx`; only successful
//! results are cached, so a type that was incomplete can be asked again once
//! its definition has a body.
//!
//! Rules:
//! - structures place members in declaration order, each padded to its own
//!   alignment, and round the total up to the largest member alignment
//! - classes lay out their base-class subobject first, then members as above
//! - unions take the largest member size and the largest alignment
//! - enumerations use their index type
//! - pointers and functions are pointer-sized, slices and interface
//!   references are two pointers

use mj_stack::ensure_sufficient_stack;

use crate::registry::{DefBody, DefKind};
use crate::{Idx, TypeContext, TypeData, TypeError};

/// Size and alignment of a type, in bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Layout {
    pub size: u64,
    /// Always a power of two.
    pub align: u64,
}

impl Layout {
    /// Layout of `void` and empty aggregates.
    pub const EMPTY: Layout = Layout { size: 0, align: 1 };

    pub const fn new(size: u64, align: u64) -> Self {
        Layout { size, align }
    }

    /// A scalar whose alignment equals its size.
    const fn scalar(bytes: u64) -> Self {
        Layout {
            size: bytes,
            align: bytes,
        }
    }
}

/// Round `offset` up to a multiple of `align`.
#[inline]
pub fn align_to(offset: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    offset.saturating_add(align - 1) & !(align - 1)
}

/// Layout of a record plus the offset of each member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordLayout {
    pub layout: Layout,
    pub offsets: Vec<u64>,
}

struct LayoutCx<'a> {
    ctx: &'a TypeContext,
    /// Types whose layout is being computed; meeting one again means it
    /// contains itself by value.
    visiting: Vec<Idx>,
}

impl LayoutCx<'_> {
    fn layout(&mut self, ty: Idx) -> Result<Layout, TypeError> {
        if let Some(hit) = self.ctx.layouts.get(&ty).map(|l| *l) {
            return Ok(hit);
        }
        if self.visiting.contains(&ty) {
            return Err(TypeError::InfiniteSize { ty });
        }

        self.visiting.push(ty);
        let result = ensure_sufficient_stack(|| self.compute(ty));
        self.visiting.pop();

        if let Ok(layout) = result {
            self.ctx.layouts.insert(ty, layout);
        }
        result
    }

    fn compute(&mut self, ty: Idx) -> Result<Layout, TypeError> {
        let ptr = self.ctx.config().pointer_size;
        match self.ctx.pool().lookup(ty) {
            TypeData::Void => Ok(Layout::EMPTY),
            TypeData::Bool => Ok(Layout::scalar(1)),
            TypeData::Int { bits, .. } | TypeData::Float { bits } => {
                if bits % 8 != 0 || !(bits / 8).is_power_of_two() {
                    return Err(TypeError::UnsupportedWidth { ty, bits });
                }
                Ok(Layout::scalar(u64::from(bits / 8)))
            }
            TypeData::Pointer(_) | TypeData::Function { .. } => Ok(Layout::scalar(ptr)),
            TypeData::Slice(_) => Ok(Layout::new(2 * ptr, ptr)),
            TypeData::Array { elem, len } => {
                let elem = self.layout(elem)?;
                Ok(Layout::new(elem.size.saturating_mul(len), elem.align))
            }
            TypeData::Qualified { base, .. } => self.layout(base),
            TypeData::Param { .. } | TypeData::Error => Err(TypeError::IncompleteType { ty }),
            TypeData::Nominal { kind, .. } => {
                let body = self
                    .ctx
                    .body_of(ty)
                    .ok_or(TypeError::IncompleteType { ty })?;
                match kind {
                    DefKind::Enumeration => self.layout(body.index_type.unwrap_or(Idx::I32)),
                    DefKind::Interface => Ok(Layout::new(2 * ptr, ptr)),
                    DefKind::Structure | DefKind::Class => Ok(self.record(&body)?.layout),
                    DefKind::Union => self.union(&body),
                }
            }
        }
    }

    fn record(&mut self, body: &DefBody) -> Result<RecordLayout, TypeError> {
        let (mut offset, mut align) = match body.base {
            Some(base) => {
                let base = self.layout(base)?;
                (base.size, base.align)
            }
            None => (0, 1),
        };
        let mut offsets = Vec::with_capacity(body.members.len());
        for member in &body.members {
            let layout = self.layout(member.ty)?;
            offset = align_to(offset, layout.align);
            offsets.push(offset);
            offset = offset.saturating_add(layout.size);
            align = align.max(layout.align);
        }
        Ok(RecordLayout {
            layout: Layout::new(align_to(offset, align), align),
            offsets,
        })
    }

    fn union(&mut self, body: &DefBody) -> Result<Layout, TypeError> {
        let mut size = 0;
        let mut align = 1;
        for member in &body.members {
            let layout = self.layout(member.ty)?;
            size = size.max(layout.size);
            align = align.max(layout.align);
        }
        Ok(Layout::new(align_to(size, align), align))
    }
}

impl TypeContext {
    /// Size and alignment of `ty`.
    pub fn layout_of(&self, ty: Idx) -> Result<Layout, TypeError> {
        LayoutCx {
            ctx: self,
            visiting: Vec::new(),
        }
        .layout(ty)
    }

    pub fn size_of(&self, ty: Idx) -> Result<u64, TypeError> {
        Ok(self.layout_of(ty)?.size)
    }

    pub fn align_of(&self, ty: Idx) -> Result<u64, TypeError> {
        Ok(self.layout_of(ty)?.align)
    }

    /// Member offsets of a structure or class; union members are all at 0.
    pub fn record_layout(&self, ty: Idx) -> Result<RecordLayout, TypeError> {
        let def = self.def_of(ty).ok_or(TypeError::IncompleteType { ty })?;
        let body = def.body().ok_or(TypeError::IncompleteType { ty })?;
        let mut cx = LayoutCx {
            ctx: self,
            visiting: vec![self.pool().unqualified(ty)],
        };
        match def.kind {
            DefKind::Structure | DefKind::Class => cx.record(body),
            DefKind::Union => Ok(RecordLayout {
                layout: cx.union(body)?,
                offsets: vec![0; body.members.len()],
            }),
            DefKind::Enumeration | DefKind::Interface => Ok(RecordLayout {
                layout: self.layout_of(ty)?,
                offsets: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
