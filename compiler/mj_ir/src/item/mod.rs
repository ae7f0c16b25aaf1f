//! Item model: the tagged tree every later phase walks.
//!
//! Items live in a per-module arena ([`ItemTree`]) and are addressed by
//! [`ItemId`]. Kind-specific behaviour goes through typed views
//! ([`views`]) selected by [`ItemRef::try_cast`] instead of per-node vtables.

mod determinism;
mod kind;
mod payload;
mod tree;
mod view;
pub mod views;

pub use kind::{ItemFamily, ItemKind, PayloadShape};
pub use payload::{Annotation, DefinitionData, ItemPayload, Operator, TemplateParamSyntax};
pub use tree::{ItemId, ItemTree, ItemTreeBuilder, TreeError};
pub use view::{InvalidCast, ItemRef, ItemView, TypedItems};
pub use views::{Definition, Expression, Statement};
