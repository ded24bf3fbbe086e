use thiserror::Error;

/// Returned by [`Cache::set`](crate::Cache::set) when the cache declines to
/// store a value.
///
/// A rejection is not a failure of the memoized call: the wrapper logs it and
/// still hands the freshly computed value back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
  /// The value is larger than the cache is willing to hold.
  #[error("value is too large to be cached")]
  TooLarge,
  /// The cache is at capacity and chose not to make room.
  #[error("cache is full")]
  Full,
  /// Any other cache-specific reason.
  #[error("value refused by cache: {0}")]
  Refused(String),
}
