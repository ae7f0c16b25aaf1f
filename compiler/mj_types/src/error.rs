//! Type system errors and their diagnostics.

use mj_diagnostic::{candidates_note, Diagnostic, ErrorCode};
use mj_ir::item::Operator;
use mj_ir::{Name, SourceId, TokenSpan};

use crate::pool::TypeInternError;
use crate::registry::RegistryError;
use crate::template::{ArgKind, SpecializationKey, TemplateId};
use crate::{Idx, TypeContext};

/// Errors from type queries, layout and template resolution.
///
/// Messages printed through `Display` use raw ids; diagnostics rendered by
/// [`TypeError::to_diagnostic`] spell types and names out.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("no member {name:?} on {ty:?}")]
    MemberNotFound {
        ty: Idx,
        name: Name,
        /// Names that were considered, in search order.
        candidates: Vec<Name>,
    },
    #[error("no operator {op:?} on {ty:?}")]
    OperatorNotFound { ty: Idx, op: Operator },
    #[error("call to {name:?} is ambiguous between {} candidates", .candidates.len())]
    AmbiguousCall {
        name: Name,
        /// Signatures of the equally ranked candidates.
        candidates: Vec<Idx>,
    },
    #[error("no overload of {name:?} accepts {} arguments", .args.len())]
    NoMatchingOverload {
        name: Name,
        args: Vec<Idx>,
        candidates: Vec<Idx>,
    },
    #[error("template recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        limit: usize,
        /// Specializations in progress, outermost first.
        chain: Vec<SpecializationKey>,
    },
    #[error("{template:?} takes {min}..={max} arguments, found {found}")]
    TemplateArityMismatch {
        template: TemplateId,
        min: usize,
        max: usize,
        found: usize,
    },
    #[error("argument {index} of {template:?} is a {found}, expected a {expected}")]
    TemplateArgumentMismatch {
        template: TemplateId,
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },
    #[error("{template:?} uses parameter {index} as a {expected}")]
    BadParamReference {
        template: TemplateId,
        index: u16,
        expected: ArgKind,
    },
    #[error("unknown {0:?}")]
    UnknownTemplate(TemplateId),
    #[error("{0:?} does not produce a type")]
    NotATypeTemplate(TemplateId),
    #[error("{0:?} is not a function template")]
    NotAFunctionTemplate(TemplateId),
    #[error("{ty:?} has no layout yet")]
    IncompleteType { ty: Idx },
    #[error("{ty:?} contains itself by value")]
    InfiniteSize { ty: Idx },
    #[error("{ty:?} is {bits} bits wide, which is not a whole power-of-two number of bytes")]
    UnsupportedWidth { ty: Idx, bits: u8 },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Intern(#[from] TypeInternError),
}

impl TypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeError::MemberNotFound { .. } | TypeError::OperatorNotFound { .. } => {
                ErrorCode::E2001
            }
            TypeError::AmbiguousCall { .. } => ErrorCode::E2002,
            TypeError::NoMatchingOverload { .. } => ErrorCode::E2003,
            TypeError::RecursionLimitExceeded { .. } => ErrorCode::E2004,
            TypeError::TemplateArityMismatch { .. } => ErrorCode::E2005,
            TypeError::TemplateArgumentMismatch { .. }
            | TypeError::BadParamReference { .. }
            | TypeError::NotATypeTemplate(_)
            | TypeError::NotAFunctionTemplate(_) => ErrorCode::E2006,
            TypeError::UnknownTemplate(_) => ErrorCode::E2007,
            TypeError::IncompleteType { .. } | TypeError::UnsupportedWidth { .. } => {
                ErrorCode::E2011
            }
            TypeError::InfiniteSize { .. } => ErrorCode::E2012,
            TypeError::Registry(RegistryError::Duplicate { .. }) => ErrorCode::E2008,
            TypeError::Registry(_) | TypeError::Intern(_) => ErrorCode::E9004,
        }
    }

    /// Lower to a diagnostic labelled at `span` in `source`.
    #[cold]
    pub fn to_diagnostic(&self, ctx: &TypeContext, source: SourceId, span: TokenSpan) -> Diagnostic {
        let name = |n: Name| ctx.name(n).to_owned();
        let signatures = |sigs: &[Idx]| -> Vec<String> {
            sigs.iter().map(|&s| ctx.display(s)).collect()
        };

        let (message, label, notes): (String, &str, Vec<String>) = match self {
            TypeError::MemberNotFound {
                ty,
                name: member,
                candidates,
            } => {
                let names: Vec<String> = candidates.iter().map(|&c| name(c)).collect();
                (
                    format!("no member `{}` on `{}`", name(*member), ctx.display(*ty)),
                    "unknown member",
                    candidates_note(&names).into_iter().collect(),
                )
            }
            TypeError::OperatorNotFound { ty, op } => (
                format!("`{}` has no `{op:?}` operator", ctx.display(*ty)),
                "operator not defined",
                Vec::new(),
            ),
            TypeError::AmbiguousCall {
                name: callee,
                candidates,
            } => (
                format!("call to `{}` is ambiguous", name(*callee)),
                "ambiguous call",
                candidates_note(&signatures(candidates)).into_iter().collect(),
            ),
            TypeError::NoMatchingOverload {
                name: callee,
                args,
                candidates,
            } => (
                format!(
                    "no overload of `{}` accepts ({})",
                    name(*callee),
                    signatures(args).join(", ")
                ),
                "no matching overload",
                candidates_note(&signatures(candidates)).into_iter().collect(),
            ),
            TypeError::RecursionLimitExceeded { limit, chain } => {
                let mut notes: Vec<String> = chain
                    .iter()
                    .rev()
                    .take(4)
                    .map(|key| format!("while specializing `{}`", ctx.display_key(key)))
                    .collect();
                if chain.len() > notes.len() {
                    notes.push(format!("... and {} more", chain.len() - notes.len()));
                }
                (
                    format!("template recursion limit of {limit} exceeded"),
                    "specialized here",
                    notes,
                )
            }
            TypeError::TemplateArityMismatch {
                template,
                min,
                max,
                found,
            } => {
                let expected = if min == max {
                    min.to_string()
                } else {
                    format!("{min} to {max}")
                };
                (
                    format!(
                        "`{}` takes {expected} template arguments but {found} were given",
                        ctx.template_name(*template)
                    ),
                    "wrong number of arguments",
                    Vec::new(),
                )
            }
            TypeError::TemplateArgumentMismatch {
                template,
                index,
                expected,
                found,
            } => (
                format!(
                    "template argument {} of `{}` must be a {expected}, found a {found}",
                    index + 1,
                    ctx.template_name(*template)
                ),
                "wrong kind of argument",
                Vec::new(),
            ),
            TypeError::BadParamReference {
                template,
                index,
                expected,
            } => (
                format!(
                    "`{}` uses its parameter {} as a {expected}",
                    ctx.template_name(*template),
                    index + 1
                ),
                "in this specialization",
                Vec::new(),
            ),
            TypeError::UnknownTemplate(template) => (
                format!("unknown template {template:?}"),
                "not a template",
                Vec::new(),
            ),
            TypeError::NotATypeTemplate(template) => (
                format!("`{}` is a function template", ctx.template_name(*template)),
                "expected a type",
                Vec::new(),
            ),
            TypeError::NotAFunctionTemplate(template) => (
                format!("`{}` is not a function template", ctx.template_name(*template)),
                "expected a function",
                Vec::new(),
            ),
            TypeError::IncompleteType { ty } => (
                format!("`{}` is incomplete", ctx.display(*ty)),
                "size not known here",
                Vec::new(),
            ),
            TypeError::UnsupportedWidth { ty, bits } => (
                format!("`{}` has no layout for a {bits}-bit scalar", ctx.display(*ty)),
                "unsupported width",
                Vec::new(),
            ),
            TypeError::InfiniteSize { ty } => (
                format!("`{}` contains itself by value", ctx.display(*ty)),
                "recursive without indirection",
                vec!["insert a pointer to break the cycle".to_owned()],
            ),
            TypeError::Registry(RegistryError::Duplicate { name: dup, .. }) => (
                format!("`{}` is defined more than once", name(*dup)),
                "redefined here",
                Vec::new(),
            ),
            TypeError::Registry(_) | TypeError::Intern(_) => {
                (self.to_string(), "internal error", Vec::new())
            }
        };

        notes.into_iter().fold(
            Diagnostic::error(self.code())
                .with_message(message)
                .with_label(source, span, label),
            |diag, note| diag.with_note(note),
        )
    }
}
