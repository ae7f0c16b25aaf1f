//! Mj IR - core data model of the Mj compiler front end.
//!
//! This crate contains the structures every later phase reads:
//! - Names and the sharded string interner
//! - The compact binary token stream
//! - Source files and the session's source registry
//! - Packed item locators
//! - The Item tree and its typed views
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier and literal text → `Name(u16)`
//! - **Flatten Everything**: items live in an arena, addressed by `ItemId(u32)`
//! - **Closed Kinds**: one `ItemKind` enum plus zero-cost typed views

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
pub mod item;
mod locator;
mod name;
pub mod source;
pub mod token;
mod token_span;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use item::{ItemId, ItemKind, ItemRef, ItemTree, ItemTreeBuilder, ItemView};
pub use locator::{ItemLocator, LocatorError};
pub use name::Name;
pub use source::{SourceError, SourceFile, SourceId, SourceInput, SourceLocation, SourceRegistry};
pub use token::{LexError, Lexer, Token, TokenKind, TokenStream};
pub use token_span::{SpanError, TokenSpan};

static_assert_size!(Name, 2);
static_assert_size!(ItemLocator, 8);
static_assert_size!(ItemId, 4);
static_assert_size!(SourceId, 2);
static_assert_size!(Token, 4);
static_assert_size!(TokenSpan, 16);
