//! Borrowed item handles and kind-checked downcasting.

use std::fmt;
use std::marker::PhantomData;

use super::kind::ItemKind;
use super::payload::ItemPayload;
use super::tree::{ItemId, ItemTree};
use crate::{ItemLocator, LocatorError, TokenSpan};

/// Attempt to view an item as a kind it does not have.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot view {found} item {item} as {expected}")]
pub struct InvalidCast {
    pub item: ItemId,
    pub expected: &'static str,
    pub found: ItemKind,
}

/// Typed view over items of one kind or family.
///
/// Implementors are thin `Copy` wrappers around an [`ItemRef`] whose kind has
/// already been checked against [`accepts`](Self::accepts).
pub trait ItemView<'t>: Copy {
    /// Name used in cast errors.
    const NAME: &'static str;

    fn accepts(kind: ItemKind) -> bool;

    /// Wrap without checking. Callers go through [`ItemRef::try_cast`].
    fn wrap(item: ItemRef<'t>) -> Self;

    fn item(self) -> ItemRef<'t>;
}

/// A borrowed item: tree plus id.
#[derive(Copy, Clone)]
pub struct ItemRef<'t> {
    tree: &'t ItemTree,
    id: ItemId,
}

impl<'t> ItemRef<'t> {
    #[inline]
    pub(super) fn new(tree: &'t ItemTree, id: ItemId) -> Self {
        ItemRef { tree, id }
    }

    #[inline]
    pub fn id(self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn tree(self) -> &'t ItemTree {
        self.tree
    }

    #[inline]
    pub fn kind(self) -> ItemKind {
        self.tree.kind_of(self.id)
    }

    #[inline]
    pub fn span(self) -> TokenSpan {
        self.tree.span_of(self.id)
    }

    #[inline]
    pub fn payload(self) -> &'t ItemPayload {
        self.tree.payload_of(self.id)
    }

    pub fn parent(self) -> Option<ItemRef<'t>> {
        self.tree
            .parent_of(self.id)
            .map(|id| ItemRef::new(self.tree, id))
    }

    /// Children in source order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = ItemRef<'t>> + ExactSizeIterator {
        let tree = self.tree;
        tree.children_of(self.id)
            .iter()
            .map(move |&id| ItemRef::new(tree, id))
    }

    pub fn child(self, index: usize) -> Option<ItemRef<'t>> {
        self.tree
            .children_of(self.id)
            .get(index)
            .map(|&id| ItemRef::new(self.tree, id))
    }

    pub fn child_count(self) -> usize {
        self.tree.children_of(self.id).len()
    }

    /// Whether this item can be viewed as `T`.
    #[inline]
    pub fn is<T: ItemView<'t>>(self) -> bool {
        T::accepts(self.kind())
    }

    pub fn try_cast<T: ItemView<'t>>(self) -> Result<T, InvalidCast> {
        if T::accepts(self.kind()) {
            Ok(T::wrap(self))
        } else {
            Err(InvalidCast {
                item: self.id,
                expected: T::NAME,
                found: self.kind(),
            })
        }
    }

    /// Downcast, treating a kind mismatch as a compiler bug.
    ///
    /// # Panics
    /// Panics with the [`InvalidCast`] message if the kind does not match.
    pub fn cast<T: ItemView<'t>>(self) -> T {
        self.try_cast::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Children viewable as `T`, filtered lazily.
    pub fn items<T: ItemView<'t>>(self) -> TypedItems<'t, T> {
        TypedItems {
            tree: self.tree,
            ids: self.tree.children_of(self.id).iter(),
            _view: PhantomData,
        }
    }

    /// Memoized determinism verdict computed when the tree was sealed.
    #[inline]
    pub fn is_deterministic(self) -> bool {
        self.tree.is_deterministic(self.id)
    }

    pub fn locator(self) -> Result<ItemLocator, LocatorError> {
        self.tree.locator_of(self.id)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = ItemRef<'t>> {
        std::iter::successors(self.parent(), |item| item.parent())
    }

    /// Nearest enclosing item viewable as `T`.
    pub fn enclosing<T: ItemView<'t>>(self) -> Option<T> {
        self.ancestors().find_map(|item| item.try_cast::<T>().ok())
    }
}

impl fmt::Debug for ItemRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{} {:?}", self.kind(), self.id, self.span())
    }
}

impl PartialEq for ItemRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for ItemRef<'_> {}

impl<'t> ItemView<'t> for ItemRef<'t> {
    const NAME: &'static str = "Item";

    fn accepts(_: ItemKind) -> bool {
        true
    }

    fn wrap(item: ItemRef<'t>) -> Self {
        item
    }

    fn item(self) -> ItemRef<'t> {
        self
    }
}

/// Lazy filter over an item's children. See [`ItemRef::items`].
pub struct TypedItems<'t, T> {
    tree: &'t ItemTree,
    ids: std::slice::Iter<'t, ItemId>,
    _view: PhantomData<T>,
}

impl<'t, T: ItemView<'t>> Iterator for TypedItems<'t, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let tree = self.tree;
        self.ids.find_map(|&id| {
            let item = ItemRef::new(tree, id);
            T::accepts(item.kind()).then(|| T::wrap(item))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

impl<'t, T: ItemView<'t>> DoubleEndedIterator for TypedItems<'t, T> {
    fn next_back(&mut self) -> Option<T> {
        let tree = self.tree;
        self.ids.by_ref().rev().find_map(|&id| {
            let item = ItemRef::new(tree, id);
            T::accepts(item.kind()).then(|| T::wrap(item))
        })
    }
}
