#![allow(dead_code)]

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use fibre_memo::{AsyncLock, Cache, KeyPart, KeyValue, Lock, Rejected};
use futures_util::future::{self, Ready};
use parking_lot::Mutex;

// A number that may be an integer or a float, so a single function can be
// called with both `1` and `1.0`.
#[derive(Debug, Clone, Copy)]
pub enum Num {
  I(i64),
  F(f64),
}

impl KeyPart for Num {
  fn key_part(&self) -> KeyValue {
    match self {
      Num::I(v) => v.key_part(),
      Num::F(v) => v.key_part(),
    }
  }

  fn type_tag(&self) -> &'static str {
    match self {
      Num::I(v) => v.type_tag(),
      Num::F(v) => v.type_tag(),
    }
  }
}

// Hands out 0, 1, 2, ... on successive calls.
#[derive(Debug, Default)]
pub struct Counter(AtomicUsize);

impl Counter {
  pub fn next(&self) -> usize {
    self.0.fetch_add(1, Ordering::SeqCst)
  }

  pub fn count(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

// A cache holding at most `capacity` entries. Once full, new keys are
// rejected instead of evicting anything.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
  capacity: usize,
  map: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> BoundedCache<K, V> {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      map: Mutex::new(HashMap::new()),
    }
  }

  pub fn len(&self) -> usize {
    self.map.lock().len()
  }

  pub fn contains(&self, key: &K) -> bool {
    self.map.lock().contains_key(key)
  }
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> for BoundedCache<K, V> {
  fn get(&self, key: &K) -> Option<V> {
    self.map.lock().get(key).cloned()
  }

  fn set(&self, key: K, value: V) -> Result<(), Rejected> {
    let mut map = self.map.lock();
    if map.len() >= self.capacity && !map.contains_key(&key) {
      return Err(Rejected::Full);
    }
    map.insert(key, value);
    Ok(())
  }
}

// Which cache operation a `FaultyCache` panics in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  Get,
  Set,
}

// A cache that panics in one of its operations and otherwise stores nothing.
#[derive(Debug)]
pub struct FaultyCache {
  fault: Fault,
}

impl FaultyCache {
  pub fn new(fault: Fault) -> Self {
    Self { fault }
  }
}

impl<K, V> Cache<K, V> for FaultyCache {
  fn get(&self, _key: &K) -> Option<V> {
    if self.fault == Fault::Get {
      panic!("cache lookup failed");
    }
    None
  }

  fn set(&self, _key: K, _value: V) -> Result<(), Rejected> {
    if self.fault == Fault::Set {
      panic!("cache store failed");
    }
    Ok(())
  }
}

// A lock that never blocks but counts how often it was entered.
#[derive(Debug, Default)]
pub struct CountingLock {
  enters: AtomicUsize,
}

impl CountingLock {
  pub fn enters(&self) -> usize {
    self.enters.load(Ordering::SeqCst)
  }
}

impl Lock for CountingLock {
  type Guard<'a> = ();

  fn acquire(&self) {
    self.enters.fetch_add(1, Ordering::SeqCst);
  }
}

impl AsyncLock for CountingLock {
  type Guard<'a> = ();
  type Acquire<'a> = Ready<()>;

  fn acquire_async(&self) -> Ready<()> {
    self.enters.fetch_add(1, Ordering::SeqCst);
    future::ready(())
  }
}
