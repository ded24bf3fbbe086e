//! Memoizing wrappers for sync and async functions and methods.
//!
//! A wrapper consults a caller-supplied [`Cache`] before running the wrapped
//! function and stores the fresh result afterwards. The cache itself (its
//! capacity, eviction and expiry rules) is entirely up to the caller; this
//! crate only drives it through the [`Cache`] contract.
//!
//! # Features
//! - **Sync & Async**: `wrap` produces a blocking wrapper, `wrap_async` a
//!   suspending one. Both run the same lookup/compute/store sequence.
//! - **Scoped Locking**: An optional [`Lock`] (or [`AsyncLock`]) is acquired
//!   around the cache read and again around the cache write, never across the
//!   wrapped computation.
//! - **Per-Instance Caches**: [`memoize_method`] resolves the cache and lock
//!   from the receiver on every call. An instance without a cache is simply
//!   not memoized.
//! - **Pluggable Keys**: [`HashKey`] (the default) and [`TypedKey`], or any
//!   `Fn(&Args) -> K`.
//!
//! # Example
//!
//! ```
//! use fibre_memo::{memoize, ArgsKey, SharedMap};
//!
//! fn square(x: u64) -> u64 {
//!   x * x
//! }
//!
//! let cache: SharedMap<ArgsKey, u64> = SharedMap::default();
//! let square = memoize(&cache).wrap(square);
//!
//! assert_eq!(square.call((4,)), 16);
//! assert_eq!(square.call((4,)), 16); // served from the cache
//! assert_eq!(cache.lock().len(), 1);
//! ```

// Public modules that form the API
pub mod builder;
pub mod cache;
pub mod callable;
pub mod error;
pub mod handles;
pub mod key;
pub mod lock;

// Internal, crate-only modules
mod protocol;

// Re-export the primary user-facing types for convenience
pub use builder::{memoize, memoize_method, Memoize, MemoizeMethod};
pub use cache::{Cache, LocalMap, SharedMap};
pub use callable::{AsyncCallable, AsyncMethod, Callable, Method};
pub use error::Rejected;
pub use handles::{AsyncMemoized, AsyncMemoizedMethod, Memoized, MemoizedMethod};
pub use key::{ArgsKey, HashKey, KeyArgs, KeyFn, KeyPart, KeyValue, TypedArgsKey, TypedKey};
pub use lock::{AsyncLock, Lock, NoLock};
