//! Interface to the parser collaborator.
//!
//! The recursive-descent parser lives outside the core. It hands back an
//! [`ItemTree`] (or nothing, when the input is beyond repair) together with
//! the module's imports and every syntax error it recovered from.

use mj_diagnostic::{Diagnostic, ErrorCode};
use mj_ir::item::views;
use mj_ir::{ItemTree, Name, SourceFile, SourceId, StringInterner, TokenSpan, TokenStream};

/// Builds the item tree of one source file.
pub trait Parser: Send + Sync {
    fn parse(&self, source: &SourceFile, tokens: &TokenStream, interner: &StringInterner)
        -> ParseOutput;
}

/// An `import` directive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportRef {
    /// Name of the imported module.
    pub path: Name,
    /// The directive, for diagnostics.
    pub span: TokenSpan,
}

/// A recovered syntax error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: TokenSpan,
    pub message: String,
}

impl ParseError {
    pub fn new(span: TokenSpan, message: impl Into<String>) -> Self {
        ParseError {
            span,
            message: message.into(),
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, source: SourceId) -> Diagnostic {
        Diagnostic::error(ErrorCode::E1001)
            .with_message(self.message.clone())
            .with_label(source, self.span, "syntax error")
    }
}

/// Result of parsing one file.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub tree: Option<ItemTree>,
    pub imports: Vec<ImportRef>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    /// Wrap a finished tree, taking its imports from the top-level
    /// `Import` items.
    pub fn from_tree(tree: ItemTree) -> Self {
        let imports = tree
            .root()
            .items::<views::Import<'_>>()
            .map(|import| ImportRef {
                path: import.path(),
                span: import.span(),
            })
            .collect();
        ParseOutput {
            tree: Some(tree),
            imports,
            errors: Vec::new(),
        }
    }

    /// Nothing usable was produced.
    pub fn failed(errors: Vec<ParseError>) -> Self {
        ParseOutput {
            tree: None,
            imports: Vec::new(),
            errors,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: ParseError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.tree.is_none()
    }
}
