use crate::handles::{no_lock, AsyncMemoized, AsyncMemoizedMethod, Memoized, MemoizedMethod};
use crate::key::HashKey;
use crate::lock::{AsyncLock, Lock, NoLock};

use core::fmt;
use std::marker::PhantomData;

/// Starts configuring a memoizing wrapper around `cache`.
///
/// `cache` is usually a reference or an `Arc` to a cache the caller keeps,
/// e.g. `memoize(&cache)` or `memoize(cache.clone())`.
pub fn memoize<C>(cache: C) -> Memoize<C> {
  Memoize::new(Some(cache))
}

/// Starts configuring a memoizing wrapper for methods.
///
/// `cache_accessor` picks the cache out of the receiver on every call, which
/// allows one cache per instance. Returning `None` turns memoization off for
/// that receiver.
pub fn memoize_method<S, C, CA>(cache_accessor: CA) -> MemoizeMethod<S, C, CA>
where
  S: ?Sized,
  C: ?Sized,
  CA: Fn(&S) -> Option<&C>,
{
  MemoizeMethod {
    cache_accessor,
    key_fn: HashKey,
    lock_accessor: no_lock::<S>,
    _marker: PhantomData,
  }
}

// --- Memoize ---

/// A builder for [`Memoized`] and [`AsyncMemoized`] wrappers.
///
/// Defaults to the [`HashKey`] key function and no lock.
#[derive(Clone)]
pub struct Memoize<C, KF = HashKey, L = NoLock> {
  cache: Option<C>,
  key_fn: KF,
  lock: L,
}

impl<C> Memoize<C> {
  /// Creates a builder. With `None`, wrappers built from it still wrap their
  /// function but never cache: every call goes straight through.
  pub fn new(cache: Option<C>) -> Self {
    Self {
      cache,
      key_fn: HashKey,
      lock: NoLock,
    }
  }

  /// A builder whose wrappers never cache.
  pub fn passthrough() -> Self {
    Self::new(None)
  }
}

impl<C, KF, L> Memoize<C, KF, L> {
  /// Sets the function that derives a cache key from the call arguments.
  pub fn key<KF2>(self, key_fn: KF2) -> Memoize<C, KF2, L> {
    Memoize {
      cache: self.cache,
      key_fn,
      lock: self.lock,
    }
  }

  /// Sets the lock taken around each cache read and each cache write.
  ///
  /// Use a blocking [`Lock`] with [`wrap`](Self::wrap) and an [`AsyncLock`]
  /// with [`wrap_async`](Self::wrap_async). The lock must not be the same
  /// object as the cache if the cache locks itself non-reentrantly.
  pub fn lock<L2>(self, lock: L2) -> Memoize<C, KF, L2> {
    Memoize {
      cache: self.cache,
      key_fn: self.key_fn,
      lock,
    }
  }

  /// Wraps a blocking function.
  pub fn wrap<F>(self, func: F) -> Memoized<F, C, KF, L>
  where
    L: Lock,
  {
    Memoized {
      func,
      cache: self.cache,
      key_fn: self.key_fn,
      lock: self.lock,
    }
  }

  /// Wraps an async function.
  pub fn wrap_async<F>(self, func: F) -> AsyncMemoized<F, C, KF, L>
  where
    L: AsyncLock,
  {
    AsyncMemoized {
      func,
      cache: self.cache,
      key_fn: self.key_fn,
      lock: self.lock,
    }
  }
}

impl<C, KF, L> fmt::Debug for Memoize<C, KF, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Memoize")
      .field("has_cache", &self.cache.is_some())
      .field("key_fn", &std::any::type_name::<KF>())
      .field("lock", &std::any::type_name::<L>())
      .finish()
  }
}

// --- MemoizeMethod ---

/// A builder for [`MemoizedMethod`] and [`AsyncMemoizedMethod`] wrappers.
///
/// Both the cache and the lock are resolved from the receiver on each call.
/// The receiver is not part of the cache key.
pub struct MemoizeMethod<S: ?Sized, C: ?Sized, CA, KF = HashKey, L: ?Sized = NoLock, LA = fn(&S) -> &L> {
  cache_accessor: CA,
  key_fn: KF,
  lock_accessor: LA,
  _marker: PhantomData<fn(&S) -> (&C, &L)>,
}

impl<S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> MemoizeMethod<S, C, CA, KF, L, LA> {
  /// Sets the function that derives a cache key from the call arguments
  /// (excluding the receiver).
  pub fn key<KF2>(self, key_fn: KF2) -> MemoizeMethod<S, C, CA, KF2, L, LA> {
    MemoizeMethod {
      cache_accessor: self.cache_accessor,
      key_fn,
      lock_accessor: self.lock_accessor,
      _marker: PhantomData,
    }
  }

  /// Sets how the lock is picked out of the receiver.
  pub fn lock<L2, LA2>(self, lock_accessor: LA2) -> MemoizeMethod<S, C, CA, KF, L2, LA2>
  where
    L2: ?Sized,
    LA2: Fn(&S) -> &L2,
  {
    MemoizeMethod {
      cache_accessor: self.cache_accessor,
      key_fn: self.key_fn,
      lock_accessor,
      _marker: PhantomData,
    }
  }

  /// Wraps a blocking method, e.g. `Service::lookup` for
  /// `fn lookup(&self, id: u64) -> Record`.
  pub fn wrap<M>(self, method: M) -> MemoizedMethod<M, S, C, CA, KF, L, LA>
  where
    L: Lock,
  {
    MemoizedMethod {
      method,
      cache_accessor: self.cache_accessor,
      key_fn: self.key_fn,
      lock_accessor: self.lock_accessor,
      _marker: PhantomData,
    }
  }

  /// Wraps an async method, e.g. `Service::fetch` for
  /// `async fn fetch(&self, id: u64) -> Record`.
  pub fn wrap_async<M>(self, method: M) -> AsyncMemoizedMethod<M, S, C, CA, KF, L, LA>
  where
    L: AsyncLock,
  {
    AsyncMemoizedMethod {
      method,
      cache_accessor: self.cache_accessor,
      key_fn: self.key_fn,
      lock_accessor: self.lock_accessor,
      _marker: PhantomData,
    }
  }
}

impl<S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> fmt::Debug for MemoizeMethod<S, C, CA, KF, L, LA> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoizeMethod")
      .field("key_fn", &std::any::type_name::<KF>())
      .field("lock", &std::any::type_name::<L>())
      .finish_non_exhaustive()
  }
}
