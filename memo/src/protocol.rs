//! The lookup / compute / store sequence shared by every wrapper.
//!
//! 1. Acquire the lock, read the cache, release.
//! 2. On a hit, return the cached value. The wrapped function is not run.
//! 3. On a miss, run the wrapped function with no lock held.
//! 4. Acquire the lock, store the result, release. A rejected store is
//!    logged and otherwise ignored.
//! 5. Return the result.
//!
//! Two callers missing on the same key at once will both compute and both
//! store; the later store wins.

use crate::cache::Cache;
use crate::lock::{AsyncLock, Lock};

use std::future::Future;

use tracing::{debug, trace};

// --- Blocking ---

fn lookup<K, V, C, L>(cache: &C, lock: &L, key: &K, wrapped: &str) -> Option<V>
where
  C: Cache<K, V> + ?Sized,
  L: Lock + ?Sized,
{
  let found = {
    let _guard = lock.acquire();
    cache.get(key)
  };
  trace_lookup(found.is_some(), wrapped);
  found
}

fn store<K, V, C, L>(cache: &C, lock: &L, key: K, value: &V, wrapped: &str)
where
  V: Clone,
  C: Cache<K, V> + ?Sized,
  L: Lock + ?Sized,
{
  let outcome = {
    let _guard = lock.acquire();
    cache.set(key, value.clone())
  };
  match outcome {
    Ok(()) => trace!(wrapped, "memoized result stored"),
    Err(reason) => debug!(wrapped, %reason, "cache declined memoized result"),
  }
}

pub(crate) fn run<K, V, C, L>(
  cache: &C,
  lock: &L,
  key: K,
  wrapped: &str,
  compute: impl FnOnce() -> V,
) -> V
where
  V: Clone,
  C: Cache<K, V> + ?Sized,
  L: Lock + ?Sized,
{
  if let Some(hit) = lookup(cache, lock, &key, wrapped) {
    return hit;
  }
  let value = compute();
  store(cache, lock, key, &value, wrapped);
  value
}

/// Like [`run`], but only an `Ok` result is stored.
pub(crate) fn try_run<K, T, E, C, L>(
  cache: &C,
  lock: &L,
  key: K,
  wrapped: &str,
  compute: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
  T: Clone,
  C: Cache<K, T> + ?Sized,
  L: Lock + ?Sized,
{
  if let Some(hit) = lookup(cache, lock, &key, wrapped) {
    return Ok(hit);
  }
  let value = compute()?;
  store(cache, lock, key, &value, wrapped);
  Ok(value)
}

// --- Suspending ---

async fn lookup_async<K, V, C, L>(cache: &C, lock: &L, key: &K, wrapped: &str) -> Option<V>
where
  C: Cache<K, V> + ?Sized,
  L: AsyncLock + ?Sized,
{
  let found = {
    let _guard = lock.acquire_async().await;
    cache.get(key)
  };
  trace_lookup(found.is_some(), wrapped);
  found
}

async fn store_async<K, V, C, L>(cache: &C, lock: &L, key: K, value: &V, wrapped: &str)
where
  V: Clone,
  C: Cache<K, V> + ?Sized,
  L: AsyncLock + ?Sized,
{
  let outcome = {
    let _guard = lock.acquire_async().await;
    cache.set(key, value.clone())
  };
  match outcome {
    Ok(()) => trace!(wrapped, "memoized result stored"),
    Err(reason) => debug!(wrapped, %reason, "cache declined memoized result"),
  }
}

pub(crate) async fn run_async<K, V, C, L, Fut>(
  cache: &C,
  lock: &L,
  key: K,
  wrapped: &str,
  compute: impl FnOnce() -> Fut,
) -> V
where
  V: Clone,
  C: Cache<K, V> + ?Sized,
  L: AsyncLock + ?Sized,
  Fut: Future<Output = V>,
{
  if let Some(hit) = lookup_async(cache, lock, &key, wrapped).await {
    return hit;
  }
  let value = compute().await;
  store_async(cache, lock, key, &value, wrapped).await;
  value
}

/// Like [`run_async`], but only an `Ok` result is stored.
pub(crate) async fn try_run_async<K, T, E, C, L, Fut>(
  cache: &C,
  lock: &L,
  key: K,
  wrapped: &str,
  compute: impl FnOnce() -> Fut,
) -> Result<T, E>
where
  T: Clone,
  C: Cache<K, T> + ?Sized,
  L: AsyncLock + ?Sized,
  Fut: Future<Output = Result<T, E>>,
{
  if let Some(hit) = lookup_async(cache, lock, &key, wrapped).await {
    return Ok(hit);
  }
  let value = compute().await?;
  store_async(cache, lock, key, &value, wrapped).await;
  Ok(value)
}

fn trace_lookup(hit: bool, wrapped: &str) {
  if hit {
    trace!(wrapped, "memo hit");
  } else {
    trace!(wrapped, "memo miss");
  }
}
