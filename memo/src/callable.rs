//! Adapters that let plain functions and closures be wrapped.
//!
//! Arguments travel as a tuple, so a function `fn add(a: u32, b: u32)` is
//! called through its wrapper as `wrapper.call((1, 2))`. Functions of up to
//! eight arguments are supported.
//!
//! Whether a wrapper blocks or suspends is decided when it is built, by
//! choosing `wrap` or `wrap_async`; the traits here only describe how each kind
//! is invoked.

use std::future::Future;

/// A function that returns its result directly.
pub trait Callable<Args> {
  type Output;

  fn invoke(&self, args: Args) -> Self::Output;
}

/// A function that returns a future of its result.
pub trait AsyncCallable<Args> {
  type Output;
  type Future: Future<Output = Self::Output>;

  fn invoke(&self, args: Args) -> Self::Future;
}

/// A method taking `&S` as its receiver and returning its result directly.
pub trait Method<S: ?Sized, Args> {
  type Output;

  fn invoke(&self, receiver: &S, args: Args) -> Self::Output;
}

/// A method taking `&'s S` as its receiver and returning a future, which may
/// borrow the receiver for `'s`. `async fn` methods on `&self` fit this shape.
pub trait AsyncMethod<'s, S: ?Sized, Args> {
  type Output;
  type Future: Future<Output = Self::Output>;

  fn invoke(&self, receiver: &'s S, args: Args) -> Self::Future;
}

macro_rules! impl_callables {
  ($($ty:ident $arg:ident),*) => {
    impl<Func, R, $($ty),*> Callable<($($ty,)*)> for Func
    where
      Func: Fn($($ty),*) -> R,
    {
      type Output = R;

      #[inline]
      fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> R {
        self($($arg),*)
      }
    }

    impl<Func, Fut, $($ty),*> AsyncCallable<($($ty,)*)> for Func
    where
      Func: Fn($($ty),*) -> Fut,
      Fut: Future,
    {
      type Output = Fut::Output;
      type Future = Fut;

      #[inline]
      fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> Fut {
        self($($arg),*)
      }
    }

    impl<Func, S: ?Sized, R, $($ty),*> Method<S, ($($ty,)*)> for Func
    where
      Func: Fn(&S, $($ty),*) -> R,
    {
      type Output = R;

      #[inline]
      fn invoke(&self, receiver: &S, ($($arg,)*): ($($ty,)*)) -> R {
        self(receiver, $($arg),*)
      }
    }

    impl<'s, Func, S: ?Sized + 's, Fut, $($ty),*> AsyncMethod<'s, S, ($($ty,)*)> for Func
    where
      Func: Fn(&'s S, $($ty),*) -> Fut,
      Fut: Future,
    {
      type Output = Fut::Output;
      type Future = Fut;

      #[inline]
      fn invoke(&self, receiver: &'s S, ($($arg,)*): ($($ty,)*)) -> Fut {
        self(receiver, $($arg),*)
      }
    }
  };
}

impl_callables!();
impl_callables!(A a);
impl_callables!(A a, B b);
impl_callables!(A a, B b, C c);
impl_callables!(A a, B b, C c, D d);
impl_callables!(A a, B b, C c, D d, E e);
impl_callables!(A a, B b, C c, D d, E e, F f);
impl_callables!(A a, B b, C c, D d, E e, F f, G g);
impl_callables!(A a, B b, C c, D d, E e, F f, G g, H h);
