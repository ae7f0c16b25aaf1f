//! Stack growth for recursive front-end passes.
//!
//! Template specialization and layout computation recurse through nested
//! type expressions, and import cycle reporting recurses along import chains.
//! Specialization depth is bounded by the session's recursion limit, but a
//! few hundred frames can still exhaust a small worker-thread stack, and
//! import chains are as long as the build; those entry points run through
//! [`ensure_sufficient_stack`].
//!
//! On native targets the `stacker` crate allocates a new stack segment when
//! the remaining space drops below [`RED_ZONE`]. On `wasm32` the closure is
//! called directly.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn materialize(&mut self, expr: &TypeExpr) -> Result<Idx, TypeError> {
///     ensure_sufficient_stack(|| match expr {
///         TypeExpr::Pointer(inner) => { let i = self.materialize(inner)?; ... }
///         ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` has no segmented stacks; run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
