//! Per-session type tables.
//!
//! [`TypeContext`] owns the type pool, the nominal and template registries
//! and the layout and specialization caches. Every table is internally
//! synchronized, so one context is shared by all worker threads of a session
//! and torn down with it.

mod display;

use std::sync::Arc;

use dashmap::DashMap;
use mj_ir::{Name, SharedInterner};
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

use crate::layout::Layout;
use crate::registry::{DefBody, DefKind, DefRequest, EnumConstant, Member, TypeDef, TypeRegistry};
use crate::template::{
    Specialization, SpecializationKey, Specializer, TemplateArgument, TemplateDef,
    TemplateDefError, TemplateId, TemplateRegistry,
};
use crate::{FunctionInstance, Idx, Qualifiers, TypeData, TypeError, TypePool};

/// Type-system settings for one session.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypeConfig {
    /// Maximum depth of nested specializations.
    pub recursion_limit: usize,
    /// Size and alignment of pointers, in bytes.
    pub pointer_size: u64,
}

impl Default for TypeConfig {
    fn default() -> Self {
        TypeConfig {
            recursion_limit: 256,
            pointer_size: 8,
        }
    }
}

impl TypeConfig {
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_pointer_size(mut self, bytes: u64) -> Self {
        self.pointer_size = bytes;
        self
    }
}

/// Shared type tables of a session.
pub struct TypeContext {
    config: TypeConfig,
    interner: SharedInterner,
    pool: TypePool,
    registry: TypeRegistry,
    templates: TemplateRegistry,
    pub(crate) layouts: DashMap<Idx, Layout, FxBuildHasher>,
    /// Holds only finished specializations.
    pub(crate) specializations: DashMap<SpecializationKey, Specialization, FxBuildHasher>,
    /// Held by the one specializer building new entries.
    pub(crate) specializing: Mutex<()>,
}

impl TypeContext {
    pub fn new(interner: SharedInterner, config: TypeConfig) -> Self {
        TypeContext {
            config,
            interner,
            pool: TypePool::new(),
            registry: TypeRegistry::new(),
            templates: TemplateRegistry::new(),
            layouts: DashMap::with_hasher(FxBuildHasher),
            specializations: DashMap::with_hasher(FxBuildHasher),
            specializing: Mutex::new(()),
        }
    }

    #[inline]
    pub fn config(&self) -> &TypeConfig {
        &self.config
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Text of an interned name.
    #[inline]
    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    // === Qualification ===

    /// The `const`-qualified form of `ty`; the same `Idx` on every call.
    pub fn const_qualified_derivation(&self, ty: Idx) -> Idx {
        self.pool.qualified(ty, Qualifiers::CONST)
    }

    /// The `volatile`-qualified form of `ty`; the same `Idx` on every call.
    pub fn volatile_qualified_derivation(&self, ty: Idx) -> Idx {
        self.pool.qualified(ty, Qualifiers::VOLATILE)
    }

    pub fn qualifiers_of(&self, ty: Idx) -> Qualifiers {
        self.pool.split_qualifiers(ty).1
    }

    pub fn is_const(&self, ty: Idx) -> bool {
        self.qualifiers_of(ty).contains(Qualifiers::CONST)
    }

    pub fn is_volatile(&self, ty: Idx) -> bool {
        self.qualifiers_of(ty).contains(Qualifiers::VOLATILE)
    }

    // === Nominal definitions ===

    /// Declare a nominal type without a body.
    pub fn declare(&self, request: DefRequest) -> Result<Arc<TypeDef>, TypeError> {
        let kind = request.kind;
        Ok(self
            .registry
            .declare(request, |id| self.pool.nominal(kind, id))?)
    }

    /// Attach the body of a type returned by [`declare`](Self::declare).
    pub fn define(&self, ty: Idx, body: DefBody) -> Result<(), TypeError> {
        let def = self.def_of(ty).ok_or(TypeError::IncompleteType { ty })?;
        self.registry.define(def.id, body)?;
        Ok(())
    }

    /// Declare and define a structure in one step.
    pub fn define_structure(
        &self,
        name: Name,
        members: impl IntoIterator<Item = Member>,
    ) -> Result<Idx, TypeError> {
        let def = self.declare(DefRequest::named(name, DefKind::Structure))?;
        self.define(def.ty, DefBody::with_members(members))?;
        Ok(def.ty)
    }

    /// Declare and define an anonymous union in one step.
    pub fn define_union(&self, members: impl IntoIterator<Item = Member>) -> Result<Idx, TypeError> {
        let def = self.declare(DefRequest::anonymous(DefKind::Union))?;
        self.define(def.ty, DefBody::with_members(members))?;
        Ok(def.ty)
    }

    /// Declare and define an enumeration in one step.
    pub fn define_enumeration(
        &self,
        name: Name,
        index_type: Idx,
        constants: Vec<EnumConstant>,
    ) -> Result<Idx, TypeError> {
        let def = self.declare(DefRequest::named(name, DefKind::Enumeration))?;
        self.define(def.ty, DefBody::enumeration(index_type, constants))?;
        Ok(def.ty)
    }

    /// The definition behind a nominal type, looking through qualifiers.
    pub fn def_of(&self, ty: Idx) -> Option<Arc<TypeDef>> {
        match self.pool.lookup(self.pool.unqualified(ty)) {
            TypeData::Nominal { def, .. } => self.registry.get(def),
            _ => None,
        }
    }

    /// Body of a nominal type, `None` for other or still-pending types.
    pub fn body_of(&self, ty: Idx) -> Option<Arc<DefBody>> {
        self.def_of(ty).and_then(|def| def.body().cloned())
    }

    /// Enumeration constants in declaration order.
    pub fn enum_constants(&self, ty: Idx) -> Vec<EnumConstant> {
        self.body_of(ty)
            .map(|body| body.constants.clone())
            .unwrap_or_default()
    }

    // === Templates ===

    pub fn register_template(&self, def: TemplateDef) -> Result<TemplateId, TemplateDefError> {
        self.templates.register(def)
    }

    /// Register a template whose body refers to its own id.
    pub fn register_template_with(
        &self,
        make: impl FnOnce(TemplateId) -> TemplateDef,
    ) -> Result<TemplateId, TemplateDefError> {
        self.templates.register_with(make)
    }

    /// A fresh specializer with an empty in-progress chain.
    pub fn specializer(&self) -> Specializer<'_> {
        Specializer::new(self)
    }

    /// Specialize a type template; repeated calls return the same `Idx`.
    pub fn specialize_type(
        &self,
        template: TemplateId,
        args: &[TemplateArgument],
    ) -> Result<Idx, TypeError> {
        self.specializer().specialize_type(template, args)
    }

    /// Specialize a function template into an interned instance.
    pub fn specialize_function(
        &self,
        template: TemplateId,
        args: &[TemplateArgument],
    ) -> Result<Arc<FunctionInstance>, TypeError> {
        self.specializer().specialize_function(template, args)
    }

    /// Number of cached specializations.
    pub fn specialization_count(&self) -> usize {
        self.specializations.len()
    }
}
