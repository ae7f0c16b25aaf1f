//! Arena storage for one module's items.

use std::fmt;

use super::determinism::compute_determinism;
use super::kind::{ItemKind, PayloadShape};
use super::payload::{Annotation, ItemPayload};
use super::view::{InvalidCast, ItemRef};
use crate::source::{SourceError, SourceId, SourceLocation, SourceRegistry};
use crate::{ItemLocator, LocatorError, TokenSpan};

/// Index of an item inside its [`ItemTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ItemId(u32);

impl ItemId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ItemId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contiguous range into the tree's child list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct ChildRange {
    start: u32,
    len: u32,
}

#[derive(Clone, Debug)]
struct ItemNode {
    kind: ItemKind,
    span: TokenSpan,
    parent: Option<ItemId>,
    children: ChildRange,
    payload: ItemPayload,
}

/// Errors while assembling an [`ItemTree`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("{kind} items take a {expected:?} payload, found {found:?}")]
    PayloadMismatch {
        kind: ItemKind,
        expected: PayloadShape,
        found: PayloadShape,
    },
    #[error("child {0} does not exist")]
    UnknownChild(ItemId),
    #[error("child {child} already belongs to {parent}")]
    ChildAlreadyAttached { child: ItemId, parent: ItemId },
    #[error("child {0} listed twice")]
    DuplicateChild(ItemId),
    #[error("root {0} does not exist")]
    UnknownRoot(ItemId),
    #[error("root {root} has parent {parent}")]
    RootHasParent { root: ItemId, parent: ItemId },
    #[error("item {0} is not reachable from the root")]
    Orphan(ItemId),
    #[error("item arena is full")]
    TooManyItems,
    #[error(transparent)]
    Annotation(#[from] InvalidCast),
}

/// Builds an [`ItemTree`] bottom-up: children are pushed before parents.
pub struct ItemTreeBuilder {
    source: SourceId,
    nodes: Vec<ItemNode>,
    child_ids: Vec<ItemId>,
}

impl ItemTreeBuilder {
    pub fn new(source: SourceId) -> Self {
        ItemTreeBuilder {
            source,
            nodes: Vec::new(),
            child_ids: Vec::new(),
        }
    }

    /// Add an item that adopts `children` in order.
    ///
    /// Every child must already exist and must not have a parent yet.
    pub fn push(
        &mut self,
        kind: ItemKind,
        span: TokenSpan,
        payload: ItemPayload,
        children: &[ItemId],
    ) -> Result<ItemId, TreeError> {
        let expected = kind.payload_shape();
        let found = payload.shape();
        if expected != found {
            return Err(TreeError::PayloadMismatch {
                kind,
                expected,
                found,
            });
        }

        let id = u32::try_from(self.nodes.len())
            .map(ItemId)
            .map_err(|_| TreeError::TooManyItems)?;

        for (i, &child) in children.iter().enumerate() {
            let node = self
                .nodes
                .get(child.index())
                .ok_or(TreeError::UnknownChild(child))?;
            if let Some(parent) = node.parent {
                return Err(TreeError::ChildAlreadyAttached { child, parent });
            }
            if children[..i].contains(&child) {
                return Err(TreeError::DuplicateChild(child));
            }
        }
        for &child in children {
            self.nodes[child.index()].parent = Some(id);
        }

        let start =
            u32::try_from(self.child_ids.len()).map_err(|_| TreeError::TooManyItems)?;
        let len = u32::try_from(children.len()).map_err(|_| TreeError::TooManyItems)?;
        self.child_ids.extend_from_slice(children);
        self.nodes.push(ItemNode {
            kind,
            span,
            parent: None,
            children: ChildRange { start, len },
            payload,
        });
        Ok(id)
    }

    /// Attach a doc comment or attribute. Only definitions accept them.
    pub fn annotate(&mut self, id: ItemId, annotation: Annotation) -> Result<(), TreeError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownChild(id))?;
        match &mut node.payload {
            ItemPayload::Definition(data) => {
                data.annotations.push(annotation);
                Ok(())
            }
            _ => Err(TreeError::Annotation(InvalidCast {
                item: id,
                expected: "Definition",
                found: node.kind,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Seal the tree under `root` and compute per-item determinism.
    #[tracing::instrument(level = "debug", skip_all, fields(source = self.source.raw(), items = self.nodes.len()))]
    pub fn finish(self, root: ItemId) -> Result<ItemTree, TreeError> {
        let root_node = self
            .nodes
            .get(root.index())
            .ok_or(TreeError::UnknownRoot(root))?;
        if let Some(parent) = root_node.parent {
            return Err(TreeError::RootHasParent { root, parent });
        }
        if let Some(orphan) = self
            .nodes
            .iter()
            .enumerate()
            .find(|&(i, node)| node.parent.is_none() && i != root.index())
            .map(|(i, _)| i)
        {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "node count was checked against u32 on push"
            )]
            let orphan = ItemId(orphan as u32);
            return Err(TreeError::Orphan(orphan));
        }

        let mut tree = ItemTree {
            source: self.source,
            root,
            nodes: self.nodes,
            child_ids: self.child_ids,
            deterministic: Vec::new(),
        };
        tree.deterministic = compute_determinism(&tree);
        Ok(tree)
    }
}

/// Immutable item arena for one module, published read-only once built.
///
/// Parent links are arena indices, so the tree has no ownership cycles.
pub struct ItemTree {
    source: SourceId,
    root: ItemId,
    nodes: Vec<ItemNode>,
    child_ids: Vec<ItemId>,
    deterministic: Vec<bool>,
}

impl ItemTree {
    #[inline]
    pub fn source(&self) -> SourceId {
        self.source
    }

    #[inline]
    pub fn root(&self) -> ItemRef<'_> {
        ItemRef::new(self, self.root)
    }

    #[inline]
    pub fn root_id(&self) -> ItemId {
        self.root
    }

    /// Borrow an item.
    ///
    /// # Panics
    /// Panics if `id` is not in this tree.
    #[inline]
    pub fn get(&self, id: ItemId) -> ItemRef<'_> {
        assert!(id.index() < self.nodes.len(), "{id:?} is not in this tree");
        ItemRef::new(self, id)
    }

    pub fn try_get(&self, id: ItemId) -> Option<ItemRef<'_>> {
        (id.index() < self.nodes.len()).then(|| ItemRef::new(self, id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every item in allocation order (children before parents).
    pub fn iter(&self) -> impl Iterator<Item = ItemRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "node count was checked against u32 on push"
            )]
            let id = ItemId(i as u32);
            ItemRef::new(self, id)
        })
    }

    /// Packed address of an item.
    pub fn locator_of(&self, id: ItemId) -> Result<ItemLocator, LocatorError> {
        let node = &self.nodes[id.index()];
        ItemLocator::new(node.kind, self.source, node.span.start)
    }

    /// Full source location of an item, resolved through the registry.
    pub fn location_of(
        &self,
        id: ItemId,
        registry: &SourceRegistry,
    ) -> Result<SourceLocation, SourceError> {
        let file = registry.source_of(self.source)?;
        let span = self.nodes[id.index()].span;
        SourceLocation::new(file, span)
    }

    // Raw accessors for ItemRef and the determinism pass.

    #[inline]
    pub(super) fn kind_of(&self, id: ItemId) -> ItemKind {
        self.nodes[id.index()].kind
    }

    #[inline]
    pub(super) fn span_of(&self, id: ItemId) -> TokenSpan {
        self.nodes[id.index()].span
    }

    #[inline]
    pub(super) fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub(super) fn payload_of(&self, id: ItemId) -> &ItemPayload {
        &self.nodes[id.index()].payload
    }

    #[inline]
    pub(super) fn children_of(&self, id: ItemId) -> &[ItemId] {
        let ChildRange { start, len } = self.nodes[id.index()].children;
        &self.child_ids[start as usize..(start + len) as usize]
    }

    #[inline]
    pub(super) fn is_deterministic(&self, id: ItemId) -> bool {
        self.deterministic[id.index()]
    }
}

impl fmt::Debug for ItemTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemTree")
            .field("source", &self.source)
            .field("root", &self.root)
            .field("items", &self.nodes.len())
            .finish()
    }
}
