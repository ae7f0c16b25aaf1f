//! Templates, their parameters and argument lists.
//!
//! A template is registered once with a [`TemplateBody`] written in
//! [`TypeExpr`]s. Applying it to a [`TemplateArgumentList`] goes through the
//! [`Specializer`], which interns every result under its
//! [`SpecializationKey`].

mod expr;
mod specialize;

use std::fmt;
use std::sync::Arc;

use mj_ir::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::Idx;

pub use expr::{ArgExpr, FieldExpr, MethodExpr, TypeExpr};
pub use specialize::{FunctionInstance, Specialization, Specializer};

/// Index of a template in the [`TemplateRegistry`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u32);

impl TemplateId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        TemplateId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateId({})", self.0)
    }
}

/// Compile-time value bound to a variable template parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstValue {
    Int(i128),
    Bool(bool),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// What a parameter accepts and what an argument is.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgKind {
    Type,
    Variable,
    Template,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::Type => "type",
            ArgKind::Variable => "value",
            ArgKind::Template => "template",
        })
    }
}

/// Kind of a template parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TemplateParamKind {
    Type,
    /// A compile-time value of type `ty`.
    Variable { ty: Idx },
    /// A template taking `arity` arguments.
    Template { arity: u8 },
}

impl TemplateParamKind {
    pub const fn arg_kind(self) -> ArgKind {
        match self {
            TemplateParamKind::Type => ArgKind::Type,
            TemplateParamKind::Variable { .. } => ArgKind::Variable,
            TemplateParamKind::Template { .. } => ArgKind::Template,
        }
    }
}

/// One concrete template argument.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TemplateArgument {
    Type(Idx),
    Variable(ConstValue),
    Template(TemplateId),
}

impl TemplateArgument {
    pub const fn kind(self) -> ArgKind {
        match self {
            TemplateArgument::Type(_) => ArgKind::Type,
            TemplateArgument::Variable(_) => ArgKind::Variable,
            TemplateArgument::Template(_) => ArgKind::Template,
        }
    }
}

/// Ordered argument list; equal lists hash equally.
pub type TemplateArgumentList = SmallVec<[TemplateArgument; 4]>;

/// A declared template parameter. `default: None` means the parameter must
/// be bound explicitly.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TemplateParameter {
    pub name: Name,
    pub kind: TemplateParamKind,
    pub default: Option<TemplateArgument>,
}

impl TemplateParameter {
    pub fn ty(name: Name) -> Self {
        TemplateParameter {
            name,
            kind: TemplateParamKind::Type,
            default: None,
        }
    }

    pub fn variable(name: Name, ty: Idx) -> Self {
        TemplateParameter {
            name,
            kind: TemplateParamKind::Variable { ty },
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: TemplateArgument) -> Self {
        self.default = Some(default);
        self
    }
}

/// What a template produces when specialized.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TemplateBody {
    Structure(Vec<FieldExpr>),
    Union(Vec<FieldExpr>),
    Class {
        base: Option<TypeExpr>,
        fields: Vec<FieldExpr>,
        methods: Vec<MethodExpr>,
    },
    Alias(TypeExpr),
    Function {
        params: Vec<TypeExpr>,
        ret: TypeExpr,
        variadic: bool,
    },
}

/// A registered template.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TemplateDef {
    pub name: Name,
    pub params: Vec<TemplateParameter>,
    pub body: TemplateBody,
}

impl TemplateDef {
    /// Number of parameters without a default.
    ///
    /// Defaults are trailing, so this is also the minimum argument count.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .position(|p| p.default.is_some())
            .unwrap_or(self.params.len())
    }
}

/// Identity of a specialization: the template and its full argument list
/// (defaults filled in).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SpecializationKey {
    pub template: TemplateId,
    pub args: TemplateArgumentList,
}

/// Why a template could not be registered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemplateDefError {
    #[error("parameter {index} has no default but follows one that does")]
    DefaultNotTrailing { index: usize },
    #[error("default for parameter {index} is a {found}, expected a {expected}")]
    DefaultKind {
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },
}

fn validate_defaults(def: &TemplateDef) -> Result<(), TemplateDefError> {
    let required = def.required_params();
    for (index, param) in def.params.iter().enumerate() {
        match param.default {
            None if index > required => return Err(TemplateDefError::DefaultNotTrailing { index }),
            Some(default) if default.kind() != param.kind.arg_kind() => {
                return Err(TemplateDefError::DefaultKind {
                    index,
                    expected: param.kind.arg_kind(),
                    found: default.kind(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

/// Append-only store of templates.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: RwLock<Vec<Arc<TemplateDef>>>,
    by_name: RwLock<FxHashMap<Name, TemplateId>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, checking that defaults are trailing and match
    /// their parameter's kind.
    ///
    /// A later template with the same name shadows the earlier one in
    /// [`find_by_name`](Self::find_by_name).
    pub fn register(&self, def: TemplateDef) -> Result<TemplateId, TemplateDefError> {
        self.register_with(|_| def)
    }

    /// Register a template built from its own id, for bodies that apply the
    /// template to itself.
    pub fn register_with(
        &self,
        make: impl FnOnce(TemplateId) -> TemplateDef,
    ) -> Result<TemplateId, TemplateDefError> {
        let mut templates = self.templates.write();
        let id = TemplateId(u32::try_from(templates.len()).unwrap_or(u32::MAX));
        let def = make(id);
        validate_defaults(&def)?;

        self.by_name.write().insert(def.name, id);
        templates.push(Arc::new(def));
        tracing::debug!(?id, "registered template");
        Ok(id)
    }

    pub fn get(&self, id: TemplateId) -> Option<Arc<TemplateDef>> {
        self.templates.read().get(id.index()).cloned()
    }

    pub fn find_by_name(&self, name: Name) -> Option<TemplateId> {
        self.by_name.read().get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}

#[cfg(test)]
mod tests;
