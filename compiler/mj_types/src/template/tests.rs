use mj_ir::SharedInterner;
use pretty_assertions::assert_eq;

use super::*;
use crate::{Qualifiers, TypeConfig, TypeContext, TypeData, TypeError};

fn ctx() -> TypeContext {
    TypeContext::new(SharedInterner::new(), TypeConfig::default())
}

fn ty(idx: Idx) -> TemplateArgument {
    TemplateArgument::Type(idx)
}

/// `struct List<T> { value: T, next: *List<T> }`
fn register_list(ctx: &TypeContext) -> TemplateId {
    let i = ctx.interner();
    let (name, t, value, next) = (i.intern("List"), i.intern("T"), i.intern("value"), i.intern("next"));
    ctx.register_template_with(|id| TemplateDef {
        name,
        params: vec![TemplateParameter::ty(t)],
        body: TemplateBody::Structure(vec![
            FieldExpr::new(value, TypeExpr::Param(0)),
            FieldExpr::new(
                next,
                TypeExpr::pointer(TypeExpr::apply(id, [ArgExpr::Param(0)])),
            ),
        ]),
    })
    .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn same_arguments_same_type() {
    let ctx = ctx();
    let list = register_list(&ctx);
    let a = ctx
        .specialize_type(list, &[ty(Idx::U32)])
        .unwrap_or_else(|e| panic!("{e}"));
    let b = ctx
        .specialize_type(list, &[ty(Idx::U32)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(a, b);

    let c = ctx
        .specialize_type(list, &[ty(Idx::U64)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_ne!(a, c);
    assert_eq!(ctx.specialization_count(), 2);
}

#[test]
fn self_reference_through_pointer() {
    let ctx = ctx();
    let list = register_list(&ctx);
    let node = ctx
        .specialize_type(list, &[ty(Idx::I8)])
        .unwrap_or_else(|e| panic!("{e}"));
    let members = ctx.members(node);
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].ty, Idx::I8);
    assert_eq!(members[1].ty, ctx.pool().pointer(node));
    assert_eq!(ctx.size_of(node), Ok(16));
    assert_eq!(
        ctx.specialization_of(node),
        Some(SpecializationKey {
            template: list,
            args: [ty(Idx::I8)].into_iter().collect(),
        })
    );
}

#[test]
fn alias_to_itself_is_rejected() {
    let ctx = ctx();
    let i = ctx.interner();
    let (name, x) = (i.intern("T"), i.intern("X"));
    let t = ctx
        .register_template_with(|id| TemplateDef {
            name,
            params: vec![TemplateParameter::ty(x)],
            body: TemplateBody::Alias(TypeExpr::apply(id, [ArgExpr::Param(0)])),
        })
        .unwrap_or_else(|e| panic!("{e}"));

    let err = ctx.specialize_type(t, &[ty(Idx::I32)]);
    let Err(TypeError::RecursionLimitExceeded { chain, .. }) = err else {
        panic!("expected recursion error, got {err:?}");
    };
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0], chain[1]);
    // Nothing half-built is left behind.
    assert_eq!(ctx.specialization_count(), 0);
}

#[test]
fn growing_specialization_hits_limit() {
    let ctx = TypeContext::new(
        SharedInterner::new(),
        TypeConfig::default().with_recursion_limit(16),
    );
    let i = ctx.interner();
    let (name, x) = (i.intern("Grow"), i.intern("X"));
    let grow = ctx
        .register_template_with(|id| TemplateDef {
            name,
            params: vec![TemplateParameter::ty(x)],
            body: TemplateBody::Alias(TypeExpr::apply(
                id,
                [ArgExpr::Type(TypeExpr::pointer(TypeExpr::Param(0)))],
            )),
        })
        .unwrap_or_else(|e| panic!("{e}"));

    let err = ctx.specialize_type(grow, &[ty(Idx::U8)]);
    let Err(TypeError::RecursionLimitExceeded { limit, chain }) = err else {
        panic!("expected recursion error, got {err:?}");
    };
    assert_eq!(limit, 16);
    assert_eq!(chain.len(), 17);
}

#[test]
fn arity_is_checked() {
    let ctx = ctx();
    let list = register_list(&ctx);
    assert_eq!(
        ctx.specialize_type(list, &[]),
        Err(TypeError::TemplateArityMismatch {
            template: list,
            min: 1,
            max: 1,
            found: 0,
        })
    );
    assert!(matches!(
        ctx.specialize_type(list, &[ty(Idx::U8), ty(Idx::U8)]),
        Err(TypeError::TemplateArityMismatch { found: 2, .. })
    ));
}

#[test]
fn argument_kinds_are_checked() {
    let ctx = ctx();
    let list = register_list(&ctx);
    assert_eq!(
        ctx.specialize_type(list, &[TemplateArgument::Variable(ConstValue::Int(3))]),
        Err(TypeError::TemplateArgumentMismatch {
            template: list,
            index: 0,
            expected: ArgKind::Type,
            found: ArgKind::Variable,
        })
    );
}

/// `struct Buffer<T, N: u32 = 4> { data: [T; N] }`
#[test]
fn variable_parameter_with_default() {
    let ctx = ctx();
    let i = ctx.interner();
    let buffer = ctx
        .register_template(TemplateDef {
            name: i.intern("Buffer"),
            params: vec![
                TemplateParameter::ty(i.intern("T")),
                TemplateParameter::variable(i.intern("N"), Idx::U32)
                    .with_default(TemplateArgument::Variable(ConstValue::Int(4))),
            ],
            body: TemplateBody::Structure(vec![FieldExpr::new(
                i.intern("data"),
                TypeExpr::ArrayOfParam {
                    elem: Box::new(TypeExpr::Param(0)),
                    len_param: 1,
                },
            )]),
        })
        .unwrap_or_else(|e| panic!("{e}"));

    let implicit = ctx
        .specialize_type(buffer, &[ty(Idx::U16)])
        .unwrap_or_else(|e| panic!("{e}"));
    let explicit = ctx
        .specialize_type(buffer, &[ty(Idx::U16), TemplateArgument::Variable(ConstValue::Int(4))])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(implicit, explicit);
    assert_eq!(ctx.size_of(implicit), Ok(8));
    assert_eq!(ctx.display(implicit), "Buffer<u16, 4>");

    let bigger = ctx
        .specialize_type(buffer, &[ty(Idx::U16), TemplateArgument::Variable(ConstValue::Int(10))])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.size_of(bigger), Ok(20));

    assert!(matches!(
        ctx.specialize_type(buffer, &[ty(Idx::U16), TemplateArgument::Variable(ConstValue::Bool(true))]),
        Err(TypeError::TemplateArgumentMismatch { index: 1, .. })
    ));
}

#[test]
fn defaults_must_trail() {
    let ctx = ctx();
    let i = ctx.interner();
    let err = ctx.register_template(TemplateDef {
        name: i.intern("Bad"),
        params: vec![
            TemplateParameter::ty(i.intern("A")).with_default(ty(Idx::I32)),
            TemplateParameter::ty(i.intern("B")),
        ],
        body: TemplateBody::Alias(TypeExpr::Param(0)),
    });
    assert_eq!(err, Err(TemplateDefError::DefaultNotTrailing { index: 1 }));

    let err = ctx.register_template(TemplateDef {
        name: i.intern("Worse"),
        params: vec![TemplateParameter::ty(i.intern("A"))
            .with_default(TemplateArgument::Variable(ConstValue::Bool(false)))],
        body: TemplateBody::Alias(TypeExpr::Param(0)),
    });
    assert_eq!(
        err,
        Err(TemplateDefError::DefaultKind {
            index: 0,
            expected: ArgKind::Type,
            found: ArgKind::Variable,
        })
    );
    assert!(ctx.templates().is_empty());
}

#[test]
fn function_instances_are_shared() {
    let ctx = ctx();
    let i = ctx.interner();
    let max = ctx
        .register_template(TemplateDef {
            name: i.intern("max"),
            params: vec![TemplateParameter::ty(i.intern("T"))],
            body: TemplateBody::Function {
                params: vec![TypeExpr::Param(0), TypeExpr::Param(0)],
                ret: TypeExpr::Param(0),
                variadic: false,
            },
        })
        .unwrap_or_else(|e| panic!("{e}"));

    let a = ctx
        .specialize_function(max, &[ty(Idx::F64)])
        .unwrap_or_else(|e| panic!("{e}"));
    let b = ctx
        .specialize_function(max, &[ty(Idx::F64)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(
        ctx.pool().lookup(a.signature),
        TypeData::Function {
            params: vec![Idx::F64, Idx::F64].into(),
            ret: Idx::F64,
            variadic: false,
        }
    );
    assert_eq!(
        ctx.specialize_type(max, &[ty(Idx::F64)]),
        Err(TypeError::NotATypeTemplate(max))
    );
}

#[test]
fn template_template_parameter() {
    let ctx = ctx();
    let list = register_list(&ctx);
    let i = ctx.interner();
    // `alias Wrap<C<_>, E> = const C<E>`
    let wrap = ctx
        .register_template(TemplateDef {
            name: i.intern("Wrap"),
            params: vec![
                TemplateParameter {
                    name: i.intern("C"),
                    kind: TemplateParamKind::Template { arity: 1 },
                    default: None,
                },
                TemplateParameter::ty(i.intern("E")),
            ],
            body: TemplateBody::Alias(TypeExpr::Qualified(
                Box::new(TypeExpr::ApplyParam {
                    param: 0,
                    args: vec![ArgExpr::Param(1)],
                }),
                Qualifiers::CONST,
            )),
        })
        .unwrap_or_else(|e| panic!("{e}"));

    let wrapped = ctx
        .specialize_type(wrap, &[TemplateArgument::Template(list), ty(Idx::BOOL)])
        .unwrap_or_else(|e| panic!("{e}"));
    let direct = ctx
        .specialize_type(list, &[ty(Idx::BOOL)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(wrapped, ctx.const_qualified_derivation(direct));

    // `Wrap` itself takes two arguments, so it cannot stand in for `C`.
    assert!(matches!(
        ctx.specialize_type(wrap, &[TemplateArgument::Template(wrap), ty(Idx::BOOL)]),
        Err(TypeError::TemplateArgumentMismatch { index: 0, .. })
    ));
}

#[test]
fn unknown_template() {
    let ctx = ctx();
    let missing = TemplateId::new(7);
    assert_eq!(
        ctx.specialize_type(missing, &[]),
        Err(TypeError::UnknownTemplate(missing))
    );
}

#[test]
fn bad_parameter_reference() {
    let ctx = ctx();
    let i = ctx.interner();
    let broken = ctx
        .register_template(TemplateDef {
            name: i.intern("Broken"),
            params: vec![TemplateParameter::ty(i.intern("T"))],
            body: TemplateBody::Alias(TypeExpr::Param(3)),
        })
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        ctx.specialize_type(broken, &[ty(Idx::U8)]),
        Err(TypeError::BadParamReference {
            template: broken,
            index: 3,
            expected: ArgKind::Type,
        })
    );
}

#[test]
fn concurrent_specialization_agrees() {
    let ctx = ctx();
    let list = register_list(&ctx);
    let results: Vec<Idx> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| ctx.specialize_type(list, &[ty(Idx::I64)])))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| panic!("thread panicked"))
                    .unwrap_or_else(|e| panic!("{e}"))
            })
            .collect()
    });
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(ctx.specialization_count(), 1);
}

/// `struct Wrap<T> { inner: T }` and a `Big<T>` with `count` fields
/// `first, f1, f2, ..` of type `Wrap<[T; n]>`, so building one instance
/// specializes `count` others.
fn register_big(ctx: &TypeContext, count: u64) -> TemplateId {
    let i = ctx.interner();
    let wrap = ctx
        .register_template(TemplateDef {
            name: i.intern("Wrap"),
            params: vec![TemplateParameter::ty(i.intern("T"))],
            body: TemplateBody::Structure(vec![FieldExpr::new(
                i.intern("inner"),
                TypeExpr::Param(0),
            )]),
        })
        .unwrap_or_else(|e| panic!("{e}"));
    let fields = (0..count)
        .map(|n| {
            let name = if n == 0 { i.intern("first") } else { i.intern(&format!("f{n}")) };
            let elem = TypeExpr::Array(Box::new(TypeExpr::Param(0)), n + 1);
            FieldExpr::new(name, TypeExpr::apply(wrap, [ArgExpr::Type(elem)]))
        })
        .collect();
    ctx.register_template(TemplateDef {
        name: i.intern("Big"),
        params: vec![TemplateParameter::ty(i.intern("T"))],
        body: TemplateBody::Structure(fields),
    })
    .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn other_threads_only_see_finished_specializations() {
    let ctx = ctx();
    let big = register_big(&ctx, 400);
    let first = ctx.interner().intern("first");

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let instance = ctx
                        .specialize_type(big, &[ty(Idx::U32)])
                        .unwrap_or_else(|e| panic!("{e}"));
                    let layout = ctx.layout_of(instance);
                    (instance, layout, ctx.lookup_member(instance, first).is_ok())
                })
            })
            .collect();
        let seen: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("thread panicked")))
            .collect();
        for (instance, layout, found) in &seen {
            assert_eq!(*instance, seen[0].0);
            assert!(layout.is_ok(), "{layout:?}");
            assert!(found);
        }
    });
    // `Big<u32>` and its 400 `Wrap` instances.
    assert_eq!(ctx.specialization_count(), 401);
}

#[test]
fn failed_specialization_is_withdrawn() {
    let ctx = ctx();
    let list = register_list(&ctx);
    let i = ctx.interner();
    // `struct Outer<T> { items: List<T>, oops: <parameter 2> }`
    let outer = ctx
        .register_template(TemplateDef {
            name: i.intern("Outer"),
            params: vec![TemplateParameter::ty(i.intern("T"))],
            body: TemplateBody::Structure(vec![
                FieldExpr::new(i.intern("items"), TypeExpr::apply(list, [ArgExpr::Param(0)])),
                FieldExpr::new(i.intern("oops"), TypeExpr::Param(2)),
            ]),
        })
        .unwrap_or_else(|e| panic!("{e}"));

    for _ in 0..2 {
        assert_eq!(
            ctx.specialize_type(outer, &[ty(Idx::U16)]),
            Err(TypeError::BadParamReference {
                template: outer,
                index: 2,
                expected: ArgKind::Type,
            })
        );
        assert_eq!(ctx.specialization_count(), 0);
        assert!(ctx.registry().is_empty());
    }

    // The nested instance was discarded with its parent and builds cleanly
    // on its own.
    let node = ctx
        .specialize_type(list, &[ty(Idx::U16)])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ctx.size_of(node), Ok(16));
    assert_eq!(ctx.registry().len(), 1);
}
