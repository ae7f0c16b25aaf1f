//! Registry of nominal type definitions.
//!
//! Every enumeration, structure, union, interface and class (declared in
//! source or produced by specializing a template) gets a [`DefId`]. A
//! definition is declared first and given its body later, so types can refer
//! to each other, and to themselves through pointers, before any layout is
//! known.

use std::fmt;
use std::sync::{Arc, OnceLock};

use mj_ir::item::Operator;
use mj_ir::{ItemLocator, Name};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::template::SpecializationKey;
use crate::Idx;

/// Index of a nominal definition in the [`TypeRegistry`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct DefId(u32);

impl DefId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        DefId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefId({})", self.0)
    }
}

/// The nominal basic types.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DefKind {
    Enumeration,
    Structure,
    Union,
    Interface,
    Class,
}

impl DefKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            DefKind::Enumeration => "enum",
            DefKind::Structure => "struct",
            DefKind::Union => "union",
            DefKind::Interface => "interface",
            DefKind::Class => "class",
        }
    }
}

/// A data member.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Member {
    pub name: Name,
    pub ty: Idx,
}

/// A method; `signature` is a function type without the receiver.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Method {
    pub name: Name,
    pub signature: Idx,
    pub is_static: bool,
}

/// An operator overload; `signature` excludes the receiver.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OperatorMethod {
    pub op: Operator,
    pub signature: Idx,
}

/// A named enumeration constant.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EnumConstant {
    pub name: Name,
    pub value: i128,
}

/// Assign values to enumeration constants in declaration order.
///
/// An explicit value is kept; an implicit one continues from the previous
/// constant plus one, starting at zero.
pub fn number_constants(
    constants: impl IntoIterator<Item = (Name, Option<i128>)>,
) -> Vec<EnumConstant> {
    let mut next = 0i128;
    constants
        .into_iter()
        .map(|(name, explicit)| {
            let value = explicit.unwrap_or(next);
            next = value.saturating_add(1);
            EnumConstant { name, value }
        })
        .collect()
}

/// Contents of a definition, attached once it is known.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DefBody {
    /// Data members in declaration order.
    pub members: Vec<Member>,
    pub methods: Vec<Method>,
    pub operators: Vec<OperatorMethod>,
    /// Base class, laid out before the members.
    pub base: Option<Idx>,
    /// Implemented or extended interfaces, in declaration order.
    pub interfaces: Vec<Idx>,
    /// Enumeration constants in declaration order.
    pub constants: Vec<EnumConstant>,
    /// Representation of an enumeration.
    pub index_type: Option<Idx>,
}

impl DefBody {
    pub fn with_members(members: impl IntoIterator<Item = Member>) -> Self {
        DefBody {
            members: members.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn enumeration(index_type: Idx, constants: Vec<EnumConstant>) -> Self {
        DefBody {
            index_type: Some(index_type),
            constants,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: Idx) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = Idx>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    #[must_use]
    pub fn with_method(mut self, name: Name, signature: Idx) -> Self {
        self.methods.push(Method {
            name,
            signature,
            is_static: false,
        });
        self
    }

    #[must_use]
    pub fn with_operator(mut self, op: Operator, signature: Idx) -> Self {
        self.operators.push(OperatorMethod { op, signature });
        self
    }
}

/// One nominal definition.
#[derive(Debug)]
pub struct TypeDef {
    pub id: DefId,
    /// `None` for anonymous types.
    pub name: Option<Name>,
    pub kind: DefKind,
    /// The nominal type this definition introduces.
    pub ty: Idx,
    /// Where the definition was written, if it came from source.
    pub locator: Option<ItemLocator>,
    /// Set for definitions produced by specializing a template.
    pub specialization: Option<SpecializationKey>,
    body: OnceLock<Arc<DefBody>>,
}

impl TypeDef {
    /// The body, or `None` while the definition is still pending.
    #[inline]
    pub fn body(&self) -> Option<&Arc<DefBody>> {
        self.body.get()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.body.get().is_some()
    }
}

/// Parameters for a new definition.
#[derive(Clone, Debug)]
pub struct DefRequest {
    pub name: Option<Name>,
    pub kind: DefKind,
    pub locator: Option<ItemLocator>,
    pub specialization: Option<SpecializationKey>,
}

impl DefRequest {
    pub fn named(name: Name, kind: DefKind) -> Self {
        DefRequest {
            name: Some(name),
            kind,
            locator: None,
            specialization: None,
        }
    }

    pub fn anonymous(kind: DefKind) -> Self {
        DefRequest {
            name: None,
            kind,
            locator: None,
            specialization: None,
        }
    }

    #[must_use]
    pub fn at(mut self, locator: ItemLocator) -> Self {
        self.locator = Some(locator);
        self
    }
}

/// Why a registry operation was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a type named {name:?} is already defined as {existing:?}")]
    Duplicate { name: Name, existing: DefId },
    #[error("{0:?} already has a body")]
    AlreadyDefined(DefId),
    #[error("unknown {0:?}")]
    UnknownDef(DefId),
}

#[derive(Default)]
struct RegistryInner {
    /// `None` marks a withdrawn definition; ids are never reused.
    defs: Vec<Option<Arc<TypeDef>>>,
    /// Source-level names only; specializations are reached through the
    /// template cache.
    by_name: FxHashMap<Name, DefId>,
}

/// Append-only store of nominal definitions.
///
/// Definitions are only ever withdrawn when a specialization that declared
/// them fails before anyone else could see them.
#[derive(Default)]
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a definition whose type is produced by `make_ty`.
    ///
    /// `make_ty` runs under the registry's write lock and must not call back
    /// into the registry.
    pub(crate) fn declare(
        &self,
        request: DefRequest,
        make_ty: impl FnOnce(DefId) -> Idx,
    ) -> Result<Arc<TypeDef>, RegistryError> {
        let mut inner = self.inner.write();
        let indexed = request.specialization.is_none();
        if let (true, Some(name)) = (indexed, request.name) {
            if let Some(&existing) = inner.by_name.get(&name) {
                return Err(RegistryError::Duplicate { name, existing });
            }
        }
        let id = DefId(u32::try_from(inner.defs.len()).unwrap_or(u32::MAX));
        let def = Arc::new(TypeDef {
            id,
            name: request.name,
            kind: request.kind,
            ty: make_ty(id),
            locator: request.locator,
            specialization: request.specialization,
            body: OnceLock::new(),
        });
        if let (true, Some(name)) = (indexed, request.name) {
            inner.by_name.insert(name, id);
        }
        inner.defs.push(Some(Arc::clone(&def)));
        tracing::trace!(?id, kind = ?def.kind, "declared nominal type");
        Ok(def)
    }

    /// Attach the body of a declared definition.
    pub fn define(&self, id: DefId, body: DefBody) -> Result<(), RegistryError> {
        let def = self.get(id).ok_or(RegistryError::UnknownDef(id))?;
        def.body
            .set(Arc::new(body))
            .map_err(|_| RegistryError::AlreadyDefined(id))
    }

    /// Drop an unnamed or specialized definition nobody else refers to.
    pub(crate) fn withdraw(&self, id: DefId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let slot = inner
            .defs
            .get_mut(id.index())
            .ok_or(RegistryError::UnknownDef(id))?;
        let def = slot.take().ok_or(RegistryError::UnknownDef(id))?;
        if let Some(name) = def.name {
            if inner.by_name.get(&name) == Some(&id) {
                inner.by_name.remove(&name);
            }
        }
        tracing::trace!(?id, "withdrew nominal type");
        Ok(())
    }

    pub fn get(&self, id: DefId) -> Option<Arc<TypeDef>> {
        self.inner.read().defs.get(id.index())?.clone()
    }

    pub fn find_by_name(&self, name: Name) -> Option<Arc<TypeDef>> {
        let inner = self.inner.read();
        let id = *inner.by_name.get(&name)?;
        inner.defs.get(id.index())?.clone()
    }

    /// Number of live definitions.
    pub fn len(&self) -> usize {
        self.inner.read().defs.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
