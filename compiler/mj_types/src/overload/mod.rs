//! Overload resolution.
//!
//! Each candidate is ranked per argument ([`Rank`]); a candidate's cost is
//! the sum of its ranks. The unique cheapest viable candidate wins. Equal
//! cheapest candidates are ambiguous.

mod conversion;

use mj_ir::Name;

pub use conversion::Rank;

use crate::{Idx, TypeContext, TypeData, TypeError};

/// The winning candidate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverloadMatch {
    /// Position in the candidate list.
    pub index: usize,
    pub signature: Idx,
    pub cost: u32,
    /// One rank per argument.
    pub ranks: Vec<Rank>,
}

/// A resolved method call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodMatch {
    /// Type in the base chain that declares the method.
    pub owner: Idx,
    /// Index into the owner's methods.
    pub method: usize,
    pub overload: OverloadMatch,
}

impl TypeContext {
    /// Per-argument ranks of calling `signature` with `args`, `None` if the
    /// candidate is not viable.
    pub fn rank_candidate(&self, signature: Idx, args: &[Idx]) -> Option<Vec<Rank>> {
        let TypeData::Function {
            params, variadic, ..
        } = self.pool().lookup(signature)
        else {
            return None;
        };

        let variadic_elem = match (variadic, params.last()) {
            (true, Some(&last)) => match self.pool().lookup(self.pool().unqualified(last)) {
                TypeData::Slice(elem) => Some(elem),
                _ => None,
            },
            _ => None,
        };

        let fixed = match variadic_elem {
            Some(_) => &params[..params.len() - 1],
            None => &params[..],
        };
        if args.len() < fixed.len() || (variadic_elem.is_none() && args.len() != fixed.len()) {
            return None;
        }

        let mut ranks = Vec::with_capacity(args.len());
        for (&arg, &param) in args.iter().zip(fixed) {
            ranks.push(self.implicit_conversion(arg, param)?);
        }
        if let Some(elem) = variadic_elem {
            for &arg in &args[fixed.len()..] {
                self.implicit_conversion(arg, elem)?;
                ranks.push(Rank::Variadic);
            }
        }
        Some(ranks)
    }

    /// Pick the best of `candidates` (function types) for `args`.
    #[tracing::instrument(level = "debug", skip_all, fields(candidates = candidates.len(), args = args.len()))]
    pub fn resolve_overload(
        &self,
        name: Name,
        candidates: &[Idx],
        args: &[Idx],
    ) -> Result<OverloadMatch, TypeError> {
        let viable: Vec<OverloadMatch> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, &signature)| {
                let ranks = self.rank_candidate(signature, args)?;
                Some(OverloadMatch {
                    index,
                    signature,
                    cost: ranks.iter().map(|r| r.cost()).sum(),
                    ranks,
                })
            })
            .collect();

        let Some(best) = viable.iter().map(|m| m.cost).min() else {
            return Err(TypeError::NoMatchingOverload {
                name,
                args: args.to_vec(),
                candidates: candidates.to_vec(),
            });
        };
        let cheapest: Vec<OverloadMatch> = viable.into_iter().filter(|m| m.cost == best).collect();
        match <[OverloadMatch; 1]>::try_from(cheapest) {
            Ok([winner]) => Ok(winner),
            Err(tied) => Err(TypeError::AmbiguousCall {
                name,
                candidates: tied.iter().map(|m| m.signature).collect(),
            }),
        }
    }

    /// Resolve `receiver.name(args)`.
    ///
    /// Candidates are the same-named methods of the first type in the
    /// search order that declares `name`; methods of further supertypes are
    /// hidden by it.
    pub fn resolve_method_call(
        &self,
        receiver: Idx,
        name: Name,
        args: &[Idx],
    ) -> Result<MethodMatch, TypeError> {
        let mut seen_names = Vec::new();
        for owner in self.search_order(receiver) {
            let Some(body) = self.body_of(owner) else {
                continue;
            };
            let (indices, signatures): (Vec<usize>, Vec<Idx>) = body
                .methods
                .iter()
                .enumerate()
                .filter(|(_, m)| m.name == name)
                .map(|(i, m)| (i, m.signature))
                .unzip();
            if signatures.is_empty() {
                for method in &body.methods {
                    if !seen_names.contains(&method.name) {
                        seen_names.push(method.name);
                    }
                }
                continue;
            }
            let overload = self.resolve_overload(name, &signatures, args)?;
            return Ok(MethodMatch {
                owner,
                method: indices[overload.index],
                overload,
            });
        }
        Err(TypeError::MemberNotFound {
            ty: receiver,
            name,
            candidates: seen_names,
        })
    }
}
