use crate::error::Rejected;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// The mapping contract a memoizing wrapper drives.
///
/// A cache is owned by the caller and shared by every call through the same
/// wrapper, so both operations take `&self`; any mutation happens through the
/// implementation's own interior mutability. Capacity, eviction and expiry
/// are the implementation's business.
pub trait Cache<K, V> {
  /// Returns a copy of the value stored for `key`, or `None` on a miss.
  fn get(&self, key: &K) -> Option<V>;

  /// Stores `value` under `key`.
  ///
  /// An implementation may decline with [`Rejected`] (e.g. the value is too
  /// large). Wrappers treat this as a normal outcome, not an error.
  fn set(&self, key: K, value: V) -> Result<(), Rejected>;
}

/// A plain key-value map that can back one of the ready-made caches below.
pub trait Map<K, V> {
  fn lookup(&self, key: &K) -> Option<&V>;
  fn store(&mut self, key: K, value: V);
}

/// An unbounded, thread-safe cache over an `ahash` map.
pub type SharedMap<K, V> = Mutex<ahash::HashMap<K, V>>;

/// An unbounded cache for single-threaded use, e.g. inside a local executor.
pub type LocalMap<K, V> = RefCell<ahash::HashMap<K, V>>;

impl<K, V, S> Map<K, V> for HashMap<K, V, S>
where
  K: Eq + Hash,
  S: BuildHasher,
{
  fn lookup(&self, key: &K) -> Option<&V> {
    HashMap::get(self, key)
  }

  fn store(&mut self, key: K, value: V) {
    self.insert(key, value);
  }
}

impl<K: Ord, V> Map<K, V> for BTreeMap<K, V> {
  fn lookup(&self, key: &K) -> Option<&V> {
    BTreeMap::get(self, key)
  }

  fn store(&mut self, key: K, value: V) {
    self.insert(key, value);
  }
}

// --- Ready-made caches over plain maps ---
// None of these ever reject a value.

impl<K, V: Clone, M: Map<K, V>> Cache<K, V> for Mutex<M> {
  fn get(&self, key: &K) -> Option<V> {
    self.lock().lookup(key).cloned()
  }

  fn set(&self, key: K, value: V) -> Result<(), Rejected> {
    self.lock().store(key, value);
    Ok(())
  }
}

impl<K, V: Clone, M: Map<K, V>> Cache<K, V> for RwLock<M> {
  fn get(&self, key: &K) -> Option<V> {
    self.read().lookup(key).cloned()
  }

  fn set(&self, key: K, value: V) -> Result<(), Rejected> {
    self.write().store(key, value);
    Ok(())
  }
}

impl<K, V: Clone, M: Map<K, V>> Cache<K, V> for RefCell<M> {
  fn get(&self, key: &K) -> Option<V> {
    self.borrow().lookup(key).cloned()
  }

  fn set(&self, key: K, value: V) -> Result<(), Rejected> {
    self.borrow_mut().store(key, value);
    Ok(())
  }
}

// --- Forwarding impls for shared handles ---

macro_rules! forward_cache {
  ($($ptr:ty),+ $(,)?) => {
    $(
      impl<K, V, C: Cache<K, V> + ?Sized> Cache<K, V> for $ptr {
        #[inline]
        fn get(&self, key: &K) -> Option<V> {
          (**self).get(key)
        }

        #[inline]
        fn set(&self, key: K, value: V) -> Result<(), Rejected> {
          (**self).set(key, value)
        }
      }
    )+
  };
}

forward_cache!(&C, Box<C>, Rc<C>, Arc<C>);
