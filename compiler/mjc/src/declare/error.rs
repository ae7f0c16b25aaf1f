//! Errors of the declaration pass.

use mj_diagnostic::{Diagnostic, ErrorCode};
use mj_ir::{Name, SourceId, TokenSpan};
use mj_types::template::TemplateDefError;
use mj_types::{TypeContext, TypeError};

use super::spelling::SpellingError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclareError {
    #[error("unknown type `{spelling}`")]
    UnknownType { spelling: String },
    #[error("`{spelling}` is not a valid type: {error}")]
    Malformed {
        spelling: String,
        error: SpellingError,
    },
    #[error("`{name}` has no declared type")]
    MissingType { name: String },
    #[error("{what} cannot be templates")]
    UnsupportedTemplate { what: &'static str },
    #[error("`{name}` is not a template")]
    NotATemplate { name: String },
    #[error("value of `{name}` must be an integer literal")]
    ConstantValue { name: String },
    #[error("{name:?} is defined more than once")]
    Duplicate { name: Name },
    #[error(transparent)]
    Template(#[from] TemplateDefError),
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl DeclareError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DeclareError::UnknownType { .. }
            | DeclareError::Malformed { .. }
            | DeclareError::MissingType { .. }
            | DeclareError::NotATemplate { .. } => ErrorCode::E2007,
            DeclareError::Duplicate { .. } => ErrorCode::E2008,
            DeclareError::ConstantValue { .. } => ErrorCode::E1001,
            DeclareError::Template(_) | DeclareError::UnsupportedTemplate { .. } => {
                ErrorCode::E2006
            }
            DeclareError::Type(err) => err.code(),
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, ctx: &TypeContext, source: SourceId, span: TokenSpan) -> Diagnostic {
        match self {
            DeclareError::Type(err) => err.to_diagnostic(ctx, source, span),
            DeclareError::Duplicate { name } => Diagnostic::error(self.code())
                .with_message(format!("`{}` is defined more than once", ctx.name(*name)))
                .with_label(source, span, "redefined here"),
            DeclareError::UnknownType { .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(source, span, "not found in this module or its imports"),
            _ => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(source, span, "in this declaration"),
        }
    }
}
