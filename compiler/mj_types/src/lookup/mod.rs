//! Member, method and operator lookup.
//!
//! A lookup searches the type's own members, then its methods, then its base
//! class (recursively, in the same order), then its interfaces in
//! declaration order. The first match wins.

use mj_ir::item::Operator;
use mj_ir::Name;
use rustc_hash::FxHashSet;

use crate::registry::{Member, Method, OperatorMethod};
use crate::{Idx, TypeContext, TypeError};

/// Where a member name resolved.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemberRef {
    Field { owner: Idx, index: usize, ty: Idx },
    Method { owner: Idx, index: usize, signature: Idx },
}

impl MemberRef {
    pub fn owner(self) -> Idx {
        match self {
            MemberRef::Field { owner, .. } | MemberRef::Method { owner, .. } => owner,
        }
    }
}

/// Where an operator resolved.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OperatorRef {
    pub owner: Idx,
    pub index: usize,
    pub signature: Idx,
}

impl TypeContext {
    /// Own data members, in declaration order.
    pub fn members(&self, ty: Idx) -> Vec<Member> {
        self.body_of(ty)
            .map(|body| body.members.clone())
            .unwrap_or_default()
    }

    /// Own methods, in declaration order.
    pub fn methods(&self, ty: Idx) -> Vec<Method> {
        self.body_of(ty)
            .map(|body| body.methods.clone())
            .unwrap_or_default()
    }

    /// Own operator overloads, in declaration order.
    pub fn operators(&self, ty: Idx) -> Vec<OperatorMethod> {
        self.body_of(ty)
            .map(|body| body.operators.clone())
            .unwrap_or_default()
    }

    /// `ty` followed by every type it inherits from, in search order.
    ///
    /// Qualifiers are dropped and each type appears once, so cyclic
    /// inheritance cannot loop.
    pub fn search_order(&self, ty: Idx) -> Vec<Idx> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        self.collect_supertypes(self.pool().unqualified(ty), &mut order, &mut seen);
        order
    }

    fn collect_supertypes(&self, ty: Idx, order: &mut Vec<Idx>, seen: &mut FxHashSet<Idx>) {
        if !seen.insert(ty) {
            return;
        }
        order.push(ty);
        let Some(body) = self.body_of(ty) else {
            return;
        };
        let supers = body.base.into_iter().chain(body.interfaces.iter().copied());
        for sup in supers {
            self.collect_supertypes(self.pool().unqualified(sup), order, seen);
        }
    }

    /// Whether `ty` is `target` or inherits from it, ignoring qualifiers.
    pub fn is_subtype_of(&self, ty: Idx, target: Idx) -> bool {
        let target = self.pool().unqualified(target);
        self.search_order(ty).contains(&target)
    }

    /// Resolve `name` as a field or method of `ty`.
    pub fn lookup_member(&self, ty: Idx, name: Name) -> Result<MemberRef, TypeError> {
        let mut candidates = Vec::new();
        for owner in self.search_order(ty) {
            let Some(body) = self.body_of(owner) else {
                continue;
            };
            if let Some(index) = body.members.iter().position(|m| m.name == name) {
                return Ok(MemberRef::Field {
                    owner,
                    index,
                    ty: body.members[index].ty,
                });
            }
            if let Some(index) = body.methods.iter().position(|m| m.name == name) {
                return Ok(MemberRef::Method {
                    owner,
                    index,
                    signature: body.methods[index].signature,
                });
            }
            let names = body.members.iter().map(|m| m.name);
            for candidate in names.chain(body.methods.iter().map(|m| m.name)) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        Err(TypeError::MemberNotFound {
            ty,
            name,
            candidates,
        })
    }

    /// Resolve operator `op` on `ty`.
    pub fn lookup_operator(&self, ty: Idx, op: Operator) -> Result<OperatorRef, TypeError> {
        self.search_order(ty)
            .into_iter()
            .find_map(|owner| {
                let body = self.body_of(owner)?;
                let index = body.operators.iter().position(|o| o.op == op)?;
                Some(OperatorRef {
                    owner,
                    index,
                    signature: body.operators[index].signature,
                })
            })
            .ok_or(TypeError::OperatorNotFound { ty, op })
    }
}
