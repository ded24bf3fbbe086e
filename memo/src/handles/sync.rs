use crate::cache::Cache;
use crate::callable::{Callable, Method};
use crate::key::{HashKey, KeyFn};
use crate::lock::{Lock, NoLock};
use crate::protocol;

use core::fmt;
use std::any;
use std::marker::PhantomData;

use tracing::debug;

// --- Memoized ---

/// A blocking function wrapped with a cache.
///
/// Built by [`Memoize::wrap`](crate::Memoize::wrap).
#[derive(Clone)]
pub struct Memoized<F, C, KF = HashKey, L = NoLock> {
  pub(crate) func: F,
  pub(crate) cache: Option<C>,
  pub(crate) key_fn: KF,
  pub(crate) lock: L,
}

impl<F, C, KF, L> Memoized<F, C, KF, L> {
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

impl<F, C, KF, L: Lock> Memoized<F, C, KF, L> {
  /// Calls the wrapped function, or returns the cached result for `args`.
  ///
  /// The result must be `Clone`: one copy goes into the cache and the other
  /// to the caller. Wrap large values in an `Arc` to keep this cheap.
  pub fn call<Args>(&self, args: Args) -> F::Output
  where
    F: Callable<Args>,
    F::Output: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, F::Output>,
  {
    let Some(cache) = &self.cache else {
      return Callable::invoke(&self.func, args);
    };
    let key = self.key_fn.key(&args);
    protocol::run(cache, &self.lock, key, self.wrapped_name(), || {
      Callable::invoke(&self.func, args)
    })
  }

  /// Calls a fallible wrapped function. Only `Ok` values are cached; an `Err`
  /// is returned as is and nothing is stored.
  pub fn try_call<Args, T, E>(&self, args: Args) -> Result<T, E>
  where
    F: Callable<Args, Output = Result<T, E>>,
    T: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, T>,
  {
    let Some(cache) = &self.cache else {
      return Callable::invoke(&self.func, args);
    };
    let key = self.key_fn.key(&args);
    protocol::try_run(cache, &self.lock, key, self.wrapped_name(), || {
      Callable::invoke(&self.func, args)
    })
  }
}

impl<F, C, KF, L> fmt::Debug for Memoized<F, C, KF, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Memoized")
      .field("wrapped", &self.wrapped_name())
      .field("has_cache", &self.cache.is_some())
      .finish_non_exhaustive()
  }
}

// --- MemoizedMethod ---

/// A blocking method wrapped with a per-receiver cache.
///
/// Built by [`MemoizeMethod::wrap`](crate::MemoizeMethod::wrap). The cache and
/// lock are looked up from the receiver on every call; a receiver without a
/// cache gets the plain, uncached method. The receiver itself is never part
/// of the key.
pub struct MemoizedMethod<M, S: ?Sized, C: ?Sized, CA, KF = HashKey, L: ?Sized = NoLock, LA = fn(&S) -> &L> {
  pub(crate) method: M,
  pub(crate) cache_accessor: CA,
  pub(crate) key_fn: KF,
  pub(crate) lock_accessor: LA,
  pub(crate) _marker: PhantomData<fn(&S) -> (&C, &L)>,
}

impl<M, S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> MemoizedMethod<M, S, C, CA, KF, L, LA> {
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

impl<M, S, C, CA, KF, L, LA> MemoizedMethod<M, S, C, CA, KF, L, LA>
where
  S: ?Sized,
  C: ?Sized,
  L: Lock + ?Sized,
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

  /// Calls the wrapped method on `receiver`, or returns the result cached
  /// for `args` in the receiver's cache.
  pub fn call<Args>(&self, receiver: &S, args: Args) -> M::Output
  where
    M: Method<S, Args>,
    M::Output: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, M::Output>,
  {
    let Some(cache) = (self.cache_accessor)(receiver) else {
      debug!(wrapped = self.wrapped_name(), "no cache for receiver, calling through");
      return Method::invoke(&self.method, receiver, args);
    };
    let lock = (self.lock_accessor)(receiver);
    let key = self.key_fn.key(&args);
    protocol::run(cache, lock, key, self.wrapped_name(), || {
      Method::invoke(&self.method, receiver, args)
    })
  }

  /// Calls a fallible wrapped method. Only `Ok` values are cached.
  pub fn try_call<Args, T, E>(&self, receiver: &S, args: Args) -> Result<T, E>
  where
    M: Method<S, Args, Output = Result<T, E>>,
    T: Clone,
    KF: KeyFn<Args>,
    C: Cache<KF::Key, T>,
  {
    let Some(cache) = (self.cache_accessor)(receiver) else {
      debug!(wrapped = self.wrapped_name(), "no cache for receiver, calling through");
      return Method::invoke(&self.method, receiver, args);
    };
    let lock = (self.lock_accessor)(receiver);
    let key = self.key_fn.key(&args);
    protocol::try_run(cache, lock, key, self.wrapped_name(), || {
      Method::invoke(&self.method, receiver, args)
    })
  }
}

impl<M, S: ?Sized, C: ?Sized, CA, KF, L: ?Sized, LA> fmt::Debug for MemoizedMethod<M, S, C, CA, KF, L, LA> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoizedMethod")
      .field("wrapped", &self.wrapped_name())
      .finish_non_exhaustive()
  }
}
