//! The wrappers returned by [`Memoize`](crate::Memoize) and
//! [`MemoizeMethod`](crate::MemoizeMethod).
//!
//! Each wrapper keeps the original function reachable through `wrapped()`, so
//! callers can always tell what a wrapper decorates.

mod futures;
mod sync;

pub use futures::{AsyncMemoized, AsyncMemoizedMethod};
pub use sync::{Memoized, MemoizedMethod};

/// The default lock accessor for method wrappers.
pub(crate) fn no_lock<S: ?Sized>(_receiver: &S) -> &crate::NoLock {
  &crate::NoLock
}
