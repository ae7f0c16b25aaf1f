//! Template specialization.
//!
//! A [`Specializer`] binds argument lists to templates and evaluates their
//! bodies. Results are interned in the context's specialization cache under
//! their [`SpecializationKey`], so the same template and arguments always
//! yield the same `Idx` (or the same [`FunctionInstance`]).
//!
//! Nominal results (structures, unions, classes) are reserved before their
//! members are evaluated. A template whose members refer back to the template
//! being specialized, e.g. `List<T> { next: *List<T> }`, finds the
//! reservation and stops there.
//!
//! Reservations stay private to the specializer that made them. The shared
//! cache only ever receives a whole request's results once every body in it
//! is defined, and one specializer builds at a time; the others wait for it
//! and then find its results in the cache.

use std::sync::Arc;

use mj_stack::ensure_sufficient_stack;
use parking_lot::MutexGuard;
use rustc_hash::FxHashMap;

use super::{
    ArgExpr, ArgKind, ConstValue, FieldExpr, SpecializationKey, TemplateArgument,
    TemplateArgumentList, TemplateBody, TemplateDef, TemplateId, TemplateParamKind, TypeExpr,
};
use crate::registry::{DefBody, DefId, DefKind, DefRequest, Member, Method};
use crate::{Idx, TypeContext, TypeData, TypeError};

/// A function template applied to arguments.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FunctionInstance {
    pub template: TemplateId,
    pub args: TemplateArgumentList,
    /// Interned function type of the instance.
    pub signature: Idx,
}

/// A cached specialization result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Specialization {
    Type(Idx),
    Function(Arc<FunctionInstance>),
}

/// Specializes templates for one request.
///
/// Keeps the chain of specializations in progress so runaway recursion is
/// reported with its path instead of overflowing.
pub struct Specializer<'ctx> {
    ctx: &'ctx TypeContext,
    chain: Vec<SpecializationKey>,
    /// Results of the current request, published when it succeeds.
    local: FxHashMap<SpecializationKey, Specialization>,
    /// Definitions declared by the current request.
    declared: Vec<DefId>,
    building: Option<MutexGuard<'ctx, ()>>,
}

impl<'ctx> Specializer<'ctx> {
    pub fn new(ctx: &'ctx TypeContext) -> Self {
        Specializer {
            ctx,
            chain: Vec::new(),
            local: FxHashMap::default(),
            declared: Vec::new(),
            building: None,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn specialize_type(
        &mut self,
        template: TemplateId,
        args: &[TemplateArgument],
    ) -> Result<Idx, TypeError> {
        match self.specialize(template, args)? {
            Specialization::Type(ty) => Ok(ty),
            Specialization::Function(_) => Err(TypeError::NotATypeTemplate(template)),
        }
    }

    pub fn specialize_function(
        &mut self,
        template: TemplateId,
        args: &[TemplateArgument],
    ) -> Result<Arc<FunctionInstance>, TypeError> {
        match self.specialize(template, args)? {
            Specialization::Function(instance) => Ok(instance),
            Specialization::Type(_) => Err(TypeError::NotAFunctionTemplate(template)),
        }
    }

    /// Bind `args` to `template` and produce (or fetch) the specialization.
    #[tracing::instrument(level = "debug", skip_all, fields(template = ?template, depth = self.chain.len()))]
    pub fn specialize(
        &mut self,
        template: TemplateId,
        args: &[TemplateArgument],
    ) -> Result<Specialization, TypeError> {
        let ctx = self.ctx;
        let def = ctx
            .templates()
            .get(template)
            .ok_or(TypeError::UnknownTemplate(template))?;
        let key = SpecializationKey {
            template,
            args: bind(ctx, template, &def, args)?,
        };

        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        if self.building.is_some() {
            return self.build(&def, key);
        }

        // Outermost request: wait for whoever is building, then look again.
        self.building = Some(ctx.specializing.lock());
        let result = match self.lookup(&key) {
            Some(hit) => Ok(hit),
            None => self.build(&def, key),
        };
        self.finish(result.is_ok());
        result
    }

    /// This request's own results first, then the shared cache.
    fn lookup(&self, key: &SpecializationKey) -> Option<Specialization> {
        if let Some(hit) = self.local.get(key) {
            return Some(hit.clone());
        }
        let hit = self
            .ctx
            .specializations
            .get(key)
            .map(|hit| hit.value().clone());
        if hit.is_some() {
            tracing::trace!("specialization cache hit");
        }
        hit
    }

    /// Publish everything the request produced, or withdraw the definitions
    /// it declared, then let the next builder in.
    fn finish(&mut self, succeeded: bool) {
        let local = std::mem::take(&mut self.local);
        let declared = std::mem::take(&mut self.declared);
        if succeeded {
            tracing::debug!(count = local.len(), "publishing specializations");
            for (key, value) in local {
                self.ctx.specializations.insert(key, value);
            }
        } else {
            for id in declared {
                if let Err(err) = self.ctx.registry().withdraw(id) {
                    tracing::warn!(?id, %err, "could not withdraw failed specialization");
                }
            }
        }
        self.building = None;
    }

    fn build(
        &mut self,
        def: &TemplateDef,
        key: SpecializationKey,
    ) -> Result<Specialization, TypeError> {
        let ctx = self.ctx;

        // A repeated key can only come from a non-nominal body (nominal ones
        // are reserved before recursing), so it would never terminate.
        let limit = ctx.config().recursion_limit;
        if self.chain.len() >= limit || self.chain.contains(&key) {
            let mut chain = self.chain.clone();
            chain.push(key);
            return Err(TypeError::RecursionLimitExceeded { limit, chain });
        }

        match &def.body {
            TemplateBody::Structure(_) | TemplateBody::Union(_) | TemplateBody::Class { .. } => {
                self.specialize_nominal(def, key)
            }
            TemplateBody::Alias(expr) => {
                let ty = self.nested(&key, |this| this.eval(expr, &key))?;
                Ok(self.record(key, Specialization::Type(ty)))
            }
            TemplateBody::Function {
                params,
                ret,
                variadic,
            } => {
                let signature = self.nested(&key, |this| {
                    let params = params
                        .iter()
                        .map(|p| this.eval(p, &key))
                        .collect::<Result<Vec<_>, _>>()?;
                    let ret = this.eval(ret, &key)?;
                    Ok(ctx.pool().function(params, ret, *variadic))
                })?;
                let instance = Arc::new(FunctionInstance {
                    template: key.template,
                    args: key.args.clone(),
                    signature,
                });
                Ok(self.record(key, Specialization::Function(instance)))
            }
        }
    }

    fn record(&mut self, key: SpecializationKey, value: Specialization) -> Specialization {
        self.local.insert(key, value.clone());
        value
    }

    fn specialize_nominal(
        &mut self,
        def: &TemplateDef,
        key: SpecializationKey,
    ) -> Result<Specialization, TypeError> {
        let kind = match def.body {
            TemplateBody::Union(_) => DefKind::Union,
            TemplateBody::Class { .. } => DefKind::Class,
            _ => DefKind::Structure,
        };

        let reserved = self.ctx.declare(DefRequest {
            name: Some(def.name),
            kind,
            locator: None,
            specialization: Some(key.clone()),
        })?;
        self.declared.push(reserved.id);
        let ty = Specialization::Type(reserved.ty);
        self.local.insert(key.clone(), ty.clone());
        tracing::debug!(ty = ?reserved.ty, "reserved nominal specialization");

        let body = self.nested(&key, |this| this.materialize(&def.body, &key))?;
        self.ctx.registry().define(reserved.id, body)?;
        Ok(ty)
    }

    /// Run `f` with `key` pushed on the in-progress chain.
    fn nested<T>(
        &mut self,
        key: &SpecializationKey,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.chain.push(key.clone());
        let result = ensure_sufficient_stack(|| f(self));
        self.chain.pop();
        result
    }

    fn materialize(
        &mut self,
        body: &TemplateBody,
        key: &SpecializationKey,
    ) -> Result<DefBody, TypeError> {
        match body {
            TemplateBody::Structure(fields) | TemplateBody::Union(fields) => {
                Ok(DefBody::with_members(self.fields(fields, key)?))
            }
            TemplateBody::Class {
                base,
                fields,
                methods,
            } => {
                let mut out = DefBody::with_members(self.fields(fields, key)?);
                if let Some(base) = base {
                    out.base = Some(self.eval(base, key)?);
                }
                for method in methods {
                    let params = method
                        .params
                        .iter()
                        .map(|p| self.eval(p, key))
                        .collect::<Result<Vec<_>, _>>()?;
                    let ret = self.eval(&method.ret, key)?;
                    out.methods.push(Method {
                        name: method.name,
                        signature: self.ctx.pool().function(params, ret, false),
                        is_static: false,
                    });
                }
                Ok(out)
            }
            TemplateBody::Alias(_) | TemplateBody::Function { .. } => Ok(DefBody::default()),
        }
    }

    fn fields(
        &mut self,
        fields: &[FieldExpr],
        key: &SpecializationKey,
    ) -> Result<Vec<Member>, TypeError> {
        fields
            .iter()
            .map(|field| {
                Ok(Member {
                    name: field.name,
                    ty: self.eval(&field.ty, key)?,
                })
            })
            .collect()
    }

    /// Evaluate a body expression with the parameters of `key` bound.
    fn eval(&mut self, expr: &TypeExpr, key: &SpecializationKey) -> Result<Idx, TypeError> {
        let pool = self.ctx.pool();
        ensure_sufficient_stack(|| match expr {
            TypeExpr::Concrete(idx) => Ok(*idx),
            TypeExpr::Param(index) => match key.args.get(usize::from(*index)) {
                Some(TemplateArgument::Type(ty)) => Ok(*ty),
                _ => Err(bad_param(key, *index, ArgKind::Type)),
            },
            TypeExpr::Pointer(inner) => Ok(pool.pointer(self.eval(inner, key)?)),
            TypeExpr::Array(elem, len) => Ok(pool.array(self.eval(elem, key)?, *len)),
            TypeExpr::ArrayOfParam { elem, len_param } => {
                let len = match key.args.get(usize::from(*len_param)) {
                    Some(TemplateArgument::Variable(ConstValue::Int(v))) => u64::try_from(*v).ok(),
                    _ => None,
                }
                .ok_or_else(|| bad_param(key, *len_param, ArgKind::Variable))?;
                Ok(pool.array(self.eval(elem, key)?, len))
            }
            TypeExpr::Slice(inner) => Ok(pool.slice(self.eval(inner, key)?)),
            TypeExpr::Qualified(inner, quals) => Ok(pool.qualified(self.eval(inner, key)?, *quals)),
            TypeExpr::Function {
                params,
                ret,
                variadic,
            } => {
                let params = params
                    .iter()
                    .map(|p| self.eval(p, key))
                    .collect::<Result<Vec<_>, _>>()?;
                let ret = self.eval(ret, key)?;
                Ok(pool.function(params, ret, *variadic))
            }
            TypeExpr::Apply { template, args } => {
                let args = self.eval_args(args, key)?;
                self.specialize_type(*template, &args)
            }
            TypeExpr::ApplyParam { param: index, args } => {
                let template = match key.args.get(usize::from(*index)) {
                    Some(TemplateArgument::Template(template)) => *template,
                    _ => return Err(bad_param(key, *index, ArgKind::Template)),
                };
                let args = self.eval_args(args, key)?;
                self.specialize_type(template, &args)
            }
        })
    }

    fn eval_args(
        &mut self,
        args: &[ArgExpr],
        key: &SpecializationKey,
    ) -> Result<TemplateArgumentList, TypeError> {
        args.iter()
            .map(|arg| {
                Ok(match arg {
                    ArgExpr::Type(expr) => TemplateArgument::Type(self.eval(expr, key)?),
                    ArgExpr::Value(value) => TemplateArgument::Variable(*value),
                    ArgExpr::Template(template) => TemplateArgument::Template(*template),
                    ArgExpr::Param(index) => key
                        .args
                        .get(usize::from(*index))
                        .copied()
                        .ok_or_else(|| bad_param(key, *index, ArgKind::Type))?,
                })
            })
            .collect()
    }
}

/// A body referred to parameter `index` as something it is not bound to.
fn bad_param(key: &SpecializationKey, index: u16, expected: ArgKind) -> TypeError {
    TypeError::BadParamReference {
        template: key.template,
        index,
        expected,
    }
}

/// Check arity and kinds, filling trailing defaults.
fn bind(
    ctx: &TypeContext,
    template: TemplateId,
    def: &TemplateDef,
    args: &[TemplateArgument],
) -> Result<TemplateArgumentList, TypeError> {
    let min = def.required_params();
    let max = def.params.len();
    let arity_mismatch = || TypeError::TemplateArityMismatch {
        template,
        min,
        max,
        found: args.len(),
    };
    if args.len() < min || args.len() > max {
        return Err(arity_mismatch());
    }

    def.params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let arg = args
                .get(index)
                .copied()
                .or(param.default)
                .ok_or_else(arity_mismatch)?;
            let mismatch = || TypeError::TemplateArgumentMismatch {
                template,
                index,
                expected: param.kind.arg_kind(),
                found: arg.kind(),
            };
            match (param.kind, arg) {
                (TemplateParamKind::Type, TemplateArgument::Type(_)) => Ok(arg),
                (TemplateParamKind::Variable { ty }, TemplateArgument::Variable(value)) => {
                    let is_bool = ctx.pool().unqualified(ty) == Idx::BOOL;
                    match value {
                        ConstValue::Bool(_) if is_bool => Ok(arg),
                        ConstValue::Int(_) if !is_bool => Ok(arg),
                        _ => Err(mismatch()),
                    }
                }
                (TemplateParamKind::Template { arity }, TemplateArgument::Template(target)) => {
                    let accepts = ctx.templates().get(target).is_some_and(|target| {
                        let arity = usize::from(arity);
                        target.required_params() <= arity && arity <= target.params.len()
                    });
                    if accepts {
                        Ok(arg)
                    } else {
                        Err(mismatch())
                    }
                }
                _ => Err(mismatch()),
            }
        })
        .collect()
}

impl TypeContext {
    /// Template and arguments a nominal type was specialized from.
    pub fn specialization_of(&self, ty: Idx) -> Option<SpecializationKey> {
        match self.pool().lookup(self.pool().unqualified(ty)) {
            TypeData::Nominal { def, .. } => self.registry().get(def)?.specialization.clone(),
            _ => None,
        }
    }
}
