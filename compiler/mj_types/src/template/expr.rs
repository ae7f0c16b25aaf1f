//! Type expressions inside template bodies.

use mj_ir::Name;

use super::{ConstValue, TemplateId};
use crate::{Idx, Qualifiers};

/// A type written in a template body, possibly mentioning its parameters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeExpr {
    /// An already-interned type.
    Concrete(Idx),
    /// Type parameter `index` of the enclosing template.
    Param(u16),
    Pointer(Box<TypeExpr>),
    Array(Box<TypeExpr>, u64),
    /// Array whose length is variable parameter `len_param`.
    ArrayOfParam { elem: Box<TypeExpr>, len_param: u16 },
    Slice(Box<TypeExpr>),
    Qualified(Box<TypeExpr>, Qualifiers),
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        variadic: bool,
    },
    /// Another (or the same) template applied to arguments.
    Apply { template: TemplateId, args: Vec<ArgExpr> },
    /// Template-template parameter `param` applied to arguments.
    ApplyParam { param: u16, args: Vec<ArgExpr> },
}

impl TypeExpr {
    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(inner: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(inner))
    }

    pub fn apply(template: TemplateId, args: impl IntoIterator<Item = ArgExpr>) -> Self {
        TypeExpr::Apply {
            template,
            args: args.into_iter().collect(),
        }
    }
}

impl From<Idx> for TypeExpr {
    fn from(idx: Idx) -> Self {
        TypeExpr::Concrete(idx)
    }
}

/// An argument inside a nested template application.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgExpr {
    Type(TypeExpr),
    Value(ConstValue),
    Template(TemplateId),
    /// Forward parameter `index` of the enclosing template, whatever its kind.
    Param(u16),
}

/// A field in a structure, union or class template.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldExpr {
    pub name: Name,
    pub ty: TypeExpr,
}

impl FieldExpr {
    pub fn new(name: Name, ty: impl Into<TypeExpr>) -> Self {
        FieldExpr { name, ty: ty.into() }
    }
}

/// A method in a class template; the receiver is implicit.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodExpr {
    pub name: Name,
    pub params: Vec<TypeExpr>,
    pub ret: TypeExpr,
}
