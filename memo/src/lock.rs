//! Scoped locking around cache access.
//!
//! A wrapper acquires its lock once to read the cache and, on a miss, once
//! more to write the fresh value. The lock is never held while the wrapped
//! function runs. Release happens when the guard drops, which covers normal
//! return, unwinding and (for [`AsyncLock`]) cancellation of the caller.
//!
//! Blocking and suspending locks are separate traits so a blocking wrapper can
//! only be built with a [`Lock`] and a suspending one only with an
//! [`AsyncLock`]. [`NoLock`] implements both.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, Ready};
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockWriteGuard};

/// A lock acquired by blocking the current thread.
pub trait Lock {
  /// Held for the duration of one cache operation.
  type Guard<'a>
  where
    Self: 'a;

  fn acquire(&self) -> Self::Guard<'_>;
}

/// A lock acquired by awaiting, without blocking the thread.
pub trait AsyncLock {
  /// Held for the duration of one cache operation.
  type Guard<'a>
  where
    Self: 'a;

  /// The future returned by [`acquire_async`](AsyncLock::acquire_async).
  type Acquire<'a>: Future<Output = Self::Guard<'a>>
  where
    Self: 'a;

  fn acquire_async(&self) -> Self::Acquire<'_>;
}

/// A lock that is always immediately granted and never contended.
///
/// This is the default for every wrapper when no lock is configured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoLock;

impl Lock for NoLock {
  type Guard<'a> = ();

  #[inline]
  fn acquire(&self) {}
}

impl AsyncLock for NoLock {
  type Guard<'a> = ();
  type Acquire<'a> = Ready<()>;

  #[inline]
  fn acquire_async(&self) -> Ready<()> {
    future::ready(())
  }
}

// --- Blocking locks ---

impl<T: ?Sized> Lock for Mutex<T> {
  type Guard<'a> = MutexGuard<'a, T> where Self: 'a;

  fn acquire(&self) -> MutexGuard<'_, T> {
    self.lock()
  }
}

/// Takes the write side, so accesses are fully serialized.
impl<T: ?Sized> Lock for RwLock<T> {
  type Guard<'a> = RwLockWriteGuard<'a, T> where Self: 'a;

  fn acquire(&self) -> RwLockWriteGuard<'_, T> {
    self.write()
  }
}

impl<L: Lock + ?Sized> Lock for &L {
  type Guard<'a> = L::Guard<'a> where Self: 'a;

  #[inline]
  fn acquire(&self) -> Self::Guard<'_> {
    (**self).acquire()
  }
}

impl<L: Lock + ?Sized> Lock for Arc<L> {
  type Guard<'a> = L::Guard<'a> where Self: 'a;

  #[inline]
  fn acquire(&self) -> Self::Guard<'_> {
    (**self).acquire()
  }
}

// --- Suspending locks ---

impl<T> AsyncLock for futures_util::lock::Mutex<T> {
  type Guard<'a> = futures_util::lock::MutexGuard<'a, T> where Self: 'a;
  type Acquire<'a> = futures_util::lock::MutexLockFuture<'a, T> where Self: 'a;

  fn acquire_async(&self) -> Self::Acquire<'_> {
    self.lock()
  }
}

#[cfg(feature = "tokio")]
impl<T: Send> AsyncLock for tokio::sync::Mutex<T> {
  type Guard<'a> = tokio::sync::MutexGuard<'a, T> where Self: 'a;
  type Acquire<'a> = future::BoxFuture<'a, Self::Guard<'a>> where Self: 'a;

  fn acquire_async(&self) -> Self::Acquire<'_> {
    Box::pin(self.lock())
  }
}

/// Takes the write side, so accesses are fully serialized.
#[cfg(feature = "tokio")]
impl<T: Send + Sync> AsyncLock for tokio::sync::RwLock<T> {
  type Guard<'a> = tokio::sync::RwLockWriteGuard<'a, T> where Self: 'a;
  type Acquire<'a> = future::BoxFuture<'a, Self::Guard<'a>> where Self: 'a;

  fn acquire_async(&self) -> Self::Acquire<'_> {
    Box::pin(self.write())
  }
}

impl<L: AsyncLock + ?Sized> AsyncLock for &L {
  type Guard<'a> = L::Guard<'a> where Self: 'a;
  type Acquire<'a> = L::Acquire<'a> where Self: 'a;

  #[inline]
  fn acquire_async(&self) -> Self::Acquire<'_> {
    (**self).acquire_async()
  }
}

impl<L: AsyncLock + ?Sized> AsyncLock for Arc<L> {
  type Guard<'a> = L::Guard<'a> where Self: 'a;
  type Acquire<'a> = L::Acquire<'a> where Self: 'a;

  #[inline]
  fn acquire_async(&self) -> Self::Acquire<'_> {
    (**self).acquire_async()
  }
}
