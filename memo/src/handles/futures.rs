use crate::cache::Cache;
use crate::callable::{AsyncCallable, AsyncMethod};
use crate::key::{HashKey, KeyFn};
use crate::lock::{AsyncLock, NoLock};
use crate::protocol;

use core::fmt;
use std::any;
use std::marker::PhantomData;

use tracing::debug;

// --- AsyncMemoized ---

/// An async function wrapped with a cache.
///
/// Built by [`Memoize::wrap_async`](crate::Memoize::wrap_async). The lock, if
/// any, is awaited rather than blocked on, and is released before the wrapped
/// future is polled.
#[derive(Clone)]
pub struct AsyncMemoized<F, C, KF = HashKey, L = NoLock> {
  pub(crate) func: F,
  pub(crate) cache: Option<C>,
  pub(crate) key_fn: KF,
  pub(crate) lock: L,
}

impl<F, C, KF, L> AsyncMemoized<F, C, KF, L> {
  /// The function being memoized.
  pub fn wrapped(&self) -> &F {
    &self.func
  }

  /// The type name of the function being memoized, for diagnostics.
  pub fn wrapped_name(&self) -> &'static str {
    any::type_name::<F>()
  }

  /// Unwraps the memoized function.
  pub fn into_inner(self) -> F {
    self.func
  }

  /// The cache results are stored in, or `None` if calls pass straight through.
  pub fn cache(&self) -> Option<&C> {
    self.cache.as_ref()
  }

  pub fn key_fn(&self) -> &KF {
    &self.key_fn
  }

  pub fn lock(&self) -> &L {
    &self.lock
  }
}

impl<F, C, KF, L: AsyncLock> AsyncMemoized<F, C, KF, L> {
  /// Awaits the wrapped function, or returns the cached result for `args`.
  ///
  /// Dropping the returned future cancels the call; any lock it holds at that
  /// point is released and nothing is stored.
  pub async fn call<Args>(&self, args: Args) -> F::Output
  where
    F: AsyncCallable<Args>,
    F::Output: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, F::Output>,
  {
    let Some(cache) = &self.cache else {
      return AsyncCallable::invoke(&self.func, args).await;
    };
    let key = self.key_fn.key(&args);
    protocol::run_async(cache, &self.lock, key, self.wrapped_name(), || {
      AsyncCallable::invoke(&self.func, args)
    })
    .await
  }

  /// Awaits a fallible wrapped function. Only `Ok` values are cached.
  pub async fn try_call<Args, T, E>(&self, args: Args) -> Result<T, E>
  where
    F: AsyncCallable<Args, Output = Result<T, E>>,
    T: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, T>,
  {
    let Some(cache) = &self.cache else {
      return AsyncCallable::invoke(&self.func, args).await;
    };
    let key = self.key_fn.key(&args);
    protocol::try_run_async(cache, &self.lock, key, self.wrapped_name(), || {
      AsyncCallable::invoke(&self.func, args)
    })
    .await
  }
}

impl<F, C, KF, L> fmt::Debug for AsyncMemoized<F, C, KF, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AsyncMemoized")
      .field("wrapped", &self.wrapped_name())
      .field("has_cache", &self.cache.is_some())
      .finish_non_exhaustive()
  }
}

// --- AsyncMemoizedMethod ---

/// An async method wrapped with a per-receiver cache.
///
/// Built by [`MemoizeMethod::wrap_async`](crate::MemoizeMethod::wrap_async).
/// Like [`MemoizedMethod`](crate::MemoizedMethod), the receiver is not part
/// of the key and a receiver without a cache is called through uncached.
pub struct AsyncMemoizedMethod<M, S: ?Sized, C: ?Sized, CA, KF = HashKey, L: ?Sized = NoLock, LA = fn(&S) -> &L> {
  pub(crate) method: M,
  pub(crate) cache_accessor: CA,
  pub(crate) key_fn: KF,
  pub(crate) lock_accessor: LA,
  pub(crate) _marker: PhantomData<fn(&S) -> (&C, &L)>,
}

impl<M, S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> AsyncMemoizedMethod<M, S, C, CA, KF, L, LA> {
  /// The method being memoized.
  pub fn wrapped(&self) -> &M {
    &self.method
  }

  /// The type name of the method being memoized, for diagnostics.
  pub fn wrapped_name(&self) -> &'static str {
    any::type_name::<M>()
  }

  /// Unwraps the memoized method.
  pub fn into_inner(self) -> M {
    self.method
  }

  pub fn key_fn(&self) -> &KF {
    &self.key_fn
  }
}

impl<M, S, C, CA, KF, L, LA> AsyncMemoizedMethod<M, S, C, CA, KF, L, LA>
where
  S: ?Sized,
  C: ?Sized,
  L: AsyncLock + ?Sized,
  CA: Fn(&S) -> Option<&C>,
  LA: Fn(&S) -> &L,
{
  /// The cache used for `receiver`, if it has one.
  pub fn cache<'s>(&self, receiver: &'s S) -> Option<&'s C> {
    (self.cache_accessor)(receiver)
  }

  /// The lock used for `receiver`.
  pub fn lock<'s>(&self, receiver: &'s S) -> &'s L {
    (self.lock_accessor)(receiver)
  }

  /// Awaits the wrapped method on `receiver`, or returns the result cached
  /// for `args` in the receiver's cache.
  pub async fn call<'s, Args>(
    &self,
    receiver: &'s S,
    args: Args,
  ) -> <M as AsyncMethod<'s, S, Args>>::Output
  where
    M: AsyncMethod<'s, S, Args>,
    <M as AsyncMethod<'s, S, Args>>::Output: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, <M as AsyncMethod<'s, S, Args>>::Output>,
  {
    let Some(cache) = (self.cache_accessor)(receiver) else {
      debug!(wrapped = self.wrapped_name(), "no cache for receiver, calling through");
      return <M as AsyncMethod<'s, S, Args>>::invoke(&self.method, receiver, args).await;
    };
    let lock = (self.lock_accessor)(receiver);
    let key = self.key_fn.key(&args);
    protocol::run_async(cache, lock, key, self.wrapped_name(), || {
      <M as AsyncMethod<'s, S, Args>>::invoke(&self.method, receiver, args)
    })
    .await
  }

  /// Awaits a fallible wrapped method. Only `Ok` values are cached.
  pub async fn try_call<'s, Args, T, E>(&self, receiver: &'s S, args: Args) -> Result<T, E>
  where
    M: AsyncMethod<'s, S, Args, Output = Result<T, E>>,
    T: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, T>,
  {
    let Some(cache) = (self.cache_accessor)(receiver) else {
      debug!(wrapped = self.wrapped_name(), "no cache for receiver, calling through");
      return <M as AsyncMethod<'s, S, Args>>::invoke(&self.method, receiver, args).await;
    };
    let lock = (self.lock_accessor)(receiver);
    let key = self.key_fn.key(&args);
    protocol::try_run_async(cache, lock, key, self.wrapped_name(), || {
      <M as AsyncMethod<'s, S, Args>>::invoke(&self.method, receiver, args)
    })
    .await
  }
}

impl<M, S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> fmt::Debug for AsyncMemoizedMethod<M, S, C, CA, KF, L, LA> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AsyncMemoizedMethod")
      .field("wrapped", &self.wrapped_name())
      .finish_non_exhaustive()
  }
}
