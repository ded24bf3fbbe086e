//! Cache keys derived from call arguments.
//!
//! A [`KeyFn`] turns the argument tuple of a call into the key under which its
//! result is cached. Any `Fn(&Args) -> K` is a key function; the two standard
//! ones are:
//!
//! - [`HashKey`] (the default): compares arguments by value only. `1u8`,
//!   `1i64` and `1.0f64` produce the same key, as do `true` and `1`.
//! - [`TypedKey`]: additionally records each argument's type, so `1i64` and
//!   `1.0f64` are different keys.
//!
//! Both work on tuples (up to eight elements) of [`KeyPart`] values.

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

/// Computes the cache key for one call from its arguments.
pub trait KeyFn<Args: ?Sized> {
  type Key;

  fn key(&self, args: &Args) -> Self::Key;
}

impl<Args: ?Sized, K, F> KeyFn<Args> for F
where
  F: Fn(&Args) -> K,
{
  type Key = K;

  #[inline]
  fn key(&self, args: &Args) -> K {
    self(args)
  }
}

/// A normalized, hashable view of a single argument value.
///
/// Numbers are folded onto one scale: every integral, finite float in the
/// `i128` or `u128` range becomes the matching `Int` or `WideUint`, so `2`,
/// `2u8` and `2.0` are equal. Floats with a fractional part keep their bit
/// pattern, `-0.0` equals `0`, and all NaNs compare equal to each other.
/// Characters are one-character strings: `'a'` equals `"a"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
  /// `None`.
  Nil,
  Int(i128),
  /// A `u128` above `i128::MAX`.
  WideUint(u128),
  Float(u64),
  Str(String),
  Seq(Vec<KeyValue>),
}

/// 2^127, the first integer past `i128::MAX`.
const TWO_POW_127: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl KeyValue {
  fn from_f64(v: f64) -> Self {
    if v.is_nan() {
      return KeyValue::Float(f64::NAN.to_bits());
    }
    if v.is_finite() && v.fract() == 0.0 {
      // Must agree with the integer impls, which use `Int` up to `i128::MAX`
      // and `WideUint` above it.
      if (-TWO_POW_127..TWO_POW_127).contains(&v) {
        return KeyValue::Int(v as i128);
      }
      if (TWO_POW_127..2.0 * TWO_POW_127).contains(&v) {
        return KeyValue::WideUint(v as u128);
      }
    }
    KeyValue::Float(v.to_bits())
  }
}

/// A value that can take part in a cache key.
pub trait KeyPart {
  fn key_part(&self) -> KeyValue;

  /// The type recorded by [`TypedKey`]. Smart pointers and references report
  /// the type they point to.
  fn type_tag(&self) -> &'static str {
    std::any::type_name::<Self>()
  }
}

macro_rules! int_key_part {
  ($($t:ty),+) => {
    $(
      impl KeyPart for $t {
        #[inline]
        fn key_part(&self) -> KeyValue {
          KeyValue::Int(*self as i128)
        }
      }
    )+
  };
}

int_key_part!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl KeyPart for u128 {
  fn key_part(&self) -> KeyValue {
    match i128::try_from(*self) {
      Ok(v) => KeyValue::Int(v),
      Err(_) => KeyValue::WideUint(*self),
    }
  }
}

impl KeyPart for f64 {
  fn key_part(&self) -> KeyValue {
    KeyValue::from_f64(*self)
  }
}

impl KeyPart for f32 {
  fn key_part(&self) -> KeyValue {
    KeyValue::from_f64(f64::from(*self))
  }
}

impl KeyPart for bool {
  fn key_part(&self) -> KeyValue {
    KeyValue::Int(i128::from(*self))
  }
}

impl KeyPart for char {
  fn key_part(&self) -> KeyValue {
    KeyValue::Str(self.to_string())
  }
}

impl KeyPart for str {
  fn key_part(&self) -> KeyValue {
    KeyValue::Str(self.to_owned())
  }
}

impl KeyPart for String {
  fn key_part(&self) -> KeyValue {
    KeyValue::Str(self.clone())
  }

  fn type_tag(&self) -> &'static str {
    "str"
  }
}

impl KeyPart for Cow<'_, str> {
  fn key_part(&self) -> KeyValue {
    KeyValue::Str(self.as_ref().to_owned())
  }

  fn type_tag(&self) -> &'static str {
    "str"
  }
}

impl<T: KeyPart> KeyPart for Option<T> {
  fn key_part(&self) -> KeyValue {
    match self {
      Some(v) => v.key_part(),
      None => KeyValue::Nil,
    }
  }

  fn type_tag(&self) -> &'static str {
    match self {
      Some(v) => v.type_tag(),
      None => "None",
    }
  }
}

impl<T: KeyPart> KeyPart for [T] {
  fn key_part(&self) -> KeyValue {
    KeyValue::Seq(self.iter().map(KeyPart::key_part).collect())
  }
}

impl<T: KeyPart> KeyPart for Vec<T> {
  fn key_part(&self) -> KeyValue {
    self.as_slice().key_part()
  }
}

impl<T: KeyPart, const N: usize> KeyPart for [T; N] {
  fn key_part(&self) -> KeyValue {
    self.as_slice().key_part()
  }
}

macro_rules! pointer_key_part {
  ($($ptr:ty),+) => {
    $(
      impl<T: KeyPart + ?Sized> KeyPart for $ptr {
        #[inline]
        fn key_part(&self) -> KeyValue {
          (**self).key_part()
        }

        #[inline]
        fn type_tag(&self) -> &'static str {
          (**self).type_tag()
        }
      }
    )+
  };
}

pointer_key_part!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

/// An argument tuple that can be turned into a key.
pub trait KeyArgs {
  fn key_parts(&self) -> Vec<KeyValue>;
  fn typed_key_parts(&self) -> Vec<(&'static str, KeyValue)>;
}

macro_rules! tuple_keys {
  ($($name:ident),*) => {
    impl<$($name: KeyPart),*> KeyArgs for ($($name,)*) {
      #[allow(non_snake_case)]
      fn key_parts(&self) -> Vec<KeyValue> {
        let ($($name,)*) = self;
        vec![$($name.key_part()),*]
      }

      #[allow(non_snake_case)]
      fn typed_key_parts(&self) -> Vec<(&'static str, KeyValue)> {
        let ($($name,)*) = self;
        vec![$(($name.type_tag(), $name.key_part())),*]
      }
    }

    impl<$($name: KeyPart),*> KeyPart for ($($name,)*) {
      fn key_part(&self) -> KeyValue {
        KeyValue::Seq(self.key_parts())
      }
    }
  };
}

tuple_keys!();
tuple_keys!(A);
tuple_keys!(A, B);
tuple_keys!(A, B, C);
tuple_keys!(A, B, C, D);
tuple_keys!(A, B, C, D, E);
tuple_keys!(A, B, C, D, E, F);
tuple_keys!(A, B, C, D, E, F, G);
tuple_keys!(A, B, C, D, E, F, G, H);

// --- Standard key functions ---

/// The key produced by [`HashKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgsKey(pub Vec<KeyValue>);

/// The key produced by [`TypedKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedArgsKey(pub Vec<(&'static str, KeyValue)>);

/// The default key function. Sensitive to argument values but not to their types.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashKey;

/// A key function sensitive to both argument values and their types.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedKey;

impl<Args: KeyArgs + ?Sized> KeyFn<Args> for HashKey {
  type Key = ArgsKey;

  fn key(&self, args: &Args) -> ArgsKey {
    hash_key(args)
  }
}

impl<Args: KeyArgs + ?Sized> KeyFn<Args> for TypedKey {
  type Key = TypedArgsKey;

  fn key(&self, args: &Args) -> TypedArgsKey {
    typed_key(args)
  }
}

/// Builds the [`HashKey`] key for an argument tuple.
pub fn hash_key<Args: KeyArgs + ?Sized>(args: &Args) -> ArgsKey {
  ArgsKey(args.key_parts())
}

/// Builds the [`TypedKey`] key for an argument tuple.
pub fn typed_key<Args: KeyArgs + ?Sized>(args: &Args) -> TypedArgsKey {
  TypedArgsKey(args.typed_key_parts())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::hash_map::DefaultHasher;
  use std::hash::{Hash, Hasher};

  fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
  }

  #[test]
  fn hash_key_ignores_numeric_type() {
    assert_eq!(hash_key(&(1i32,)), hash_key(&(1.0f64,)));
    assert_eq!(hash_key(&(1u8,)), hash_key(&(1i64,)));
    assert_eq!(hash_key(&(true,)), hash_key(&(1,)));
    assert_eq!(hash_of(&hash_key(&(1i32,))), hash_of(&hash_key(&(1.0f64,))));
  }

  #[test]
  fn hash_key_distinguishes_values() {
    assert_ne!(hash_key(&(0,)), hash_key(&(1.0,)));
    assert_ne!(hash_key(&(1,)), hash_key(&(1.5,)));
    assert_ne!(hash_key(&(1,)), hash_key(&("1",)));
    assert_ne!(hash_key(&(1, 2)), hash_key(&(2, 1)));
    assert_ne!(hash_key(&(1,)), hash_key(&(1, 1)));
  }

  #[test]
  fn typed_key_distinguishes_int_from_float() {
    assert_ne!(typed_key(&(1i64,)), typed_key(&(1.0f64,)));
    assert_ne!(typed_key(&(true,)), typed_key(&(1i64,)));
    assert_eq!(typed_key(&(1i64,)), typed_key(&(1i64,)));
  }

  #[test]
  fn references_and_owned_values_share_keys() {
    let owned = String::from("abc");
    assert_eq!(hash_key(&(owned.clone(),)), hash_key(&("abc",)));
    assert_eq!(typed_key(&(&owned,)), typed_key(&(Arc::new(owned.clone()),)));
    assert_eq!(typed_key(&(&7u32,)), typed_key(&(7u32,)));
  }

  #[test]
  fn float_edge_cases() {
    assert_eq!(hash_key(&(-0.0f64,)), hash_key(&(0,)));
    assert_eq!(hash_key(&(f64::NAN,)), hash_key(&(-f64::NAN,)));
    assert_eq!(hash_key(&(0.5f32,)), hash_key(&(0.5f64,)));
    assert_ne!(hash_key(&(f64::INFINITY,)), hash_key(&(f64::NEG_INFINITY,)));
  }

  #[test]
  fn wide_integers() {
    assert_eq!(hash_key(&(5u128,)), hash_key(&(5i8,)));
    assert_ne!(hash_key(&(u128::MAX,)), hash_key(&(i128::MAX,)));

    assert_eq!(hash_key(&(i128::MIN,)), hash_key(&(-(2f64.powi(127)),)));
    assert_eq!(hash_key(&(1u128 << 127,)), hash_key(&(2f64.powi(127),)));
    let near_max = 2f64.powi(128) - 2f64.powi(75);
    assert_eq!(hash_key(&(near_max as u128,)), hash_key(&(near_max,)));
    assert_ne!(hash_key(&(u128::MAX,)), hash_key(&(2f64.powi(128),)));
  }

  #[test]
  fn chars_are_one_character_strings() {
    assert_eq!(hash_key(&('a',)), hash_key(&("a",)));
    assert_eq!(hash_key(&(vec!['x', 'y'],)), hash_key(&(["x", "y"],)));
    assert_ne!(hash_key(&('a',)), hash_key(&("ab",)));
    assert_ne!(typed_key(&('a',)), typed_key(&("a",)));
  }

  #[test]
  fn nested_and_optional_arguments() {
    assert_eq!(hash_key(&(vec![1, 2],)), hash_key(&([1.0, 2.0],)));
    assert_eq!(hash_key(&(Some(3),)), hash_key(&(3,)));
    assert_eq!(hash_key(&(None::<i32>,)), hash_key(&(None::<&str>,)));
    assert_ne!(hash_key(&(None::<i32>,)), hash_key(&(0,)));
    assert_eq!(hash_key(&((1, "a"),)), hash_key(&((1.0, String::from("a")),)));
  }

  #[test]
  fn key_generation_is_reflexive() {
    let args = (42u64, "name", Some(2.5f32), vec!['x', 'y']);
    assert_eq!(hash_key(&args), hash_key(&args.clone()));
    assert_eq!(typed_key(&args), typed_key(&args.clone()));
    assert_eq!(hash_of(&hash_key(&args)), hash_of(&hash_key(&args.clone())));
  }

  #[test]
  fn closures_are_key_functions() {
    let by_first = |args: &(u32, &str)| args.0;
    assert_eq!(KeyFn::key(&by_first, &(7, "ignored")), 7);
    assert_eq!(KeyFn::key(&HashKey, &(7,)), hash_key(&(7,)));
  }
}
