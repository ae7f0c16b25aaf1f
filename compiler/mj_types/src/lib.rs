//! Type system for Mj.
//!
//! - Types are interned: an [`Idx`] names one structural [`TypeData`] and
//!   index equality is type equality
//! - Nominal types (enumerations, structures, unions, interfaces, classes)
//!   are keyed by their definition, declared first and given a body later
//! - Qualified types are canonical: `const volatile T` has one `Idx` however
//!   it was derived
//! - Templates are specialized on demand and interned by template and
//!   argument list
//!
//! All tables live in a [`TypeContext`], shared by every thread of a session.

mod context;
mod data;
mod error;
mod flags;
mod idx;
pub mod layout;
pub mod lookup;
pub mod overload;
mod pool;
mod qualifiers;
pub mod registry;
pub mod template;

pub use context::{TypeConfig, TypeContext};
pub use data::TypeData;
pub use error::TypeError;
pub use flags::TypeFlags;
pub use idx::Idx;
pub use layout::Layout;
pub use overload::{MethodMatch, OverloadMatch, Rank};
pub use pool::{TypeInternError, TypePool};
pub use qualifiers::Qualifiers;
pub use registry::{DefBody, DefId, DefKind, DefRequest, Member, TypeDef};
pub use template::{FunctionInstance, TemplateArgument, TemplateId};

mj_ir::static_assert_size!(Idx, 4);
mj_ir::static_assert_size!(Qualifiers, 1);
