use mj_ir::SharedInterner;
use pretty_assertions::assert_eq;

use super::*;
use crate::registry::{number_constants, DefRequest, Member};
use crate::template::TemplateId;
use crate::TypeConfig;

fn ctx() -> TypeContext {
    TypeContext::new(SharedInterner::new(), TypeConfig::default())
}

fn member(ctx: &TypeContext, name: &str, ty: Idx) -> Member {
    Member {
        name: ctx.interner().intern(name),
        ty,
    }
}

#[test]
fn primitives() {
    let ctx = ctx();
    assert_eq!(ctx.layout_of(Idx::VOID), Ok(Layout::EMPTY));
    assert_eq!(ctx.layout_of(Idx::BOOL), Ok(Layout::new(1, 1)));
    assert_eq!(ctx.layout_of(Idx::I16), Ok(Layout::new(2, 2)));
    assert_eq!(ctx.layout_of(Idx::U64), Ok(Layout::new(8, 8)));
    assert_eq!(ctx.layout_of(Idx::F32), Ok(Layout::new(4, 4)));
}

#[test]
fn odd_scalar_widths_have_no_layout() {
    let ctx = ctx();
    for (bits, signed) in [(1, false), (12, true), (24, false), (0, false)] {
        let ty = ctx.pool().int(bits, signed);
        assert_eq!(ctx.layout_of(ty), Err(TypeError::UnsupportedWidth { ty, bits }));
    }
    let half = ctx.pool().intern(TypeData::Float { bits: 16 });
    assert_eq!(ctx.size_of(half), Ok(2));
    let odd = ctx.pool().intern(TypeData::Float { bits: 80 });
    assert_eq!(ctx.layout_of(odd), Err(TypeError::UnsupportedWidth { ty: odd, bits: 80 }));

    // A structure holding one fails the same way instead of misaligning.
    let bit = member(&ctx, "flag", ctx.pool().int(1, false));
    let name = ctx.interner().intern("Flags");
    let flags = ctx
        .define_structure(name, [bit])
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(ctx.size_of(flags), Err(TypeError::UnsupportedWidth { bits: 1, .. })));
}

#[test]
fn structure_pads_members() {
    let ctx = ctx();
    let name = ctx.interner().intern("S");
    let s = ctx
        .define_structure(name, [member(&ctx, "a", Idx::U8), member(&ctx, "b", Idx::U32)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.size_of(s), Ok(8));
    assert_eq!(ctx.align_of(s), Ok(4));
    assert_eq!(
        ctx.record_layout(s).map(|r| r.offsets),
        Ok(vec![0, 4])
    );
}

#[test]
fn structure_rounds_tail() {
    let ctx = ctx();
    let name = ctx.interner().intern("T");
    let s = ctx
        .define_structure(
            name,
            [
                member(&ctx, "a", Idx::U32),
                member(&ctx, "b", Idx::U16),
                member(&ctx, "c", Idx::U8),
            ],
        )
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.layout_of(s), Ok(Layout::new(8, 4)));
}

#[test]
fn empty_structure() {
    let ctx = ctx();
    let name = ctx.interner().intern("Empty");
    let s = ctx
        .define_structure(name, [])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.layout_of(s), Ok(Layout::EMPTY));
}

#[test]
fn union_takes_max() {
    let ctx = ctx();
    let u = ctx
        .define_union([
            member(&ctx, "a", Idx::U8),
            member(&ctx, "b", Idx::U32),
            member(&ctx, "c", Idx::U64),
        ])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.layout_of(u), Ok(Layout::new(8, 8)));
    assert_eq!(ctx.record_layout(u).map(|r| r.offsets), Ok(vec![0, 0, 0]));
}

#[test]
fn union_rounds_to_alignment() {
    let ctx = ctx();
    let bytes = ctx.pool().array(Idx::U8, 5);
    let u = ctx
        .define_union([member(&ctx, "raw", bytes), member(&ctx, "word", Idx::U32)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.layout_of(u), Ok(Layout::new(8, 4)));
}

#[test]
fn class_places_base_first() {
    let ctx = ctx();
    let base_name = ctx.interner().intern("Base");
    let base = ctx
        .define_structure(base_name, [member(&ctx, "tag", Idx::U8)])
        .unwrap_or_else(|e| panic!("{e}"));

    let derived = ctx
        .declare(DefRequest::named(ctx.interner().intern("Derived"), DefKind::Class))
        .unwrap_or_else(|e| panic!("{e}"));
    ctx.define(
        derived.ty,
        DefBody::with_members([member(&ctx, "value", Idx::U16)]).with_base(base),
    )
    .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(ctx.layout_of(derived.ty), Ok(Layout::new(4, 2)));
    assert_eq!(ctx.record_layout(derived.ty).map(|r| r.offsets), Ok(vec![2]));
}

#[test]
fn enumeration_uses_index_type() {
    let ctx = ctx();
    let i = ctx.interner();
    let e = ctx
        .define_enumeration(
            i.intern("Color"),
            Idx::U8,
            number_constants([(i.intern("Red"), None), (i.intern("Green"), None)]),
        )
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.layout_of(e), Ok(Layout::new(1, 1)));
}

#[test]
fn derived_types() {
    let ctx = ctx();
    let pool = ctx.pool();
    assert_eq!(ctx.layout_of(pool.pointer(Idx::U8)), Ok(Layout::new(8, 8)));
    assert_eq!(ctx.layout_of(pool.slice(Idx::U8)), Ok(Layout::new(16, 8)));
    assert_eq!(ctx.layout_of(pool.array(Idx::U16, 3)), Ok(Layout::new(6, 2)));
    assert_eq!(
        ctx.layout_of(pool.function(vec![Idx::I32], Idx::VOID, false)),
        Ok(Layout::new(8, 8))
    );
    let c = ctx.const_qualified_derivation(Idx::U32);
    assert_eq!(ctx.layout_of(c), ctx.layout_of(Idx::U32));
}

#[test]
fn pointer_size_is_configurable() {
    let ctx = TypeContext::new(
        SharedInterner::new(),
        TypeConfig::default().with_pointer_size(4),
    );
    assert_eq!(ctx.layout_of(ctx.pool().slice(Idx::U8)), Ok(Layout::new(8, 4)));
}

#[test]
fn incomplete_types() {
    let ctx = ctx();
    let pending = ctx
        .declare(DefRequest::named(ctx.interner().intern("Later"), DefKind::Structure))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        ctx.layout_of(pending.ty),
        Err(TypeError::IncompleteType { ty: pending.ty })
    );
    // A pointer to it is fine.
    assert_eq!(ctx.size_of(ctx.pool().pointer(pending.ty)), Ok(8));

    let param = ctx.pool().param(TemplateId::new(0), 0);
    assert_eq!(
        ctx.layout_of(param),
        Err(TypeError::IncompleteType { ty: param })
    );
    assert!(ctx.layout_of(Idx::ERROR).is_err());

    // Once defined, the layout becomes available.
    ctx.define(pending.ty, DefBody::with_members([member(&ctx, "x", Idx::I64)]))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.size_of(pending.ty), Ok(8));
}

#[test]
fn self_containing_structure() {
    let ctx = ctx();
    let node = ctx
        .declare(DefRequest::named(ctx.interner().intern("Node"), DefKind::Structure))
        .unwrap_or_else(|e| panic!("{e}"));
    ctx.define(
        node.ty,
        DefBody::with_members([member(&ctx, "inner", node.ty)]),
    )
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        ctx.layout_of(node.ty),
        Err(TypeError::InfiniteSize { ty: node.ty })
    );
}

#[test]
fn align_to_rounds_up() {
    assert_eq!(align_to(0, 4), 0);
    assert_eq!(align_to(1, 4), 4);
    assert_eq!(align_to(8, 8), 8);
    assert_eq!(align_to(9, 1), 9);
}
