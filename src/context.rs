// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

/// A deferred-computation context.
///
/// Resolvers either return a value that is already available or a computation
/// packaged in the context's `Deferred` type. The core never runs deferred
/// computations; it only carries them (and maps over them) so that the
/// execution engine can.
///
/// # Example
/// ```rust
/// use shapeql::{Context, Thunk};
///
/// let deferred = Thunk::map(Thunk::pure(20), |n| n + 1);
/// assert_eq!(deferred(), 21);
/// ```
pub trait Context: Sized + Send + Sync + 'static {
    type Deferred<T: Send + 'static>: Send + 'static;

    /// Lifts an available value into the context.
    fn pure<T: Send + 'static>(value: T) -> Self::Deferred<T>;

    /// Post-transforms the result of a deferred computation.
    fn map<A, B, F>(deferred: Self::Deferred<A>, f: F) -> Self::Deferred<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static;
}

/// A structure-preserving conversion from one context to another.
pub trait ContextMap<C: Context, D: Context>: Send + Sync + 'static {
    fn map<T: Send + 'static>(&self, deferred: C::Deferred<T>) -> D::Deferred<T>;
}

/// The identity conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<C: Context> ContextMap<C, C> for Identity {
    fn map<T: Send + 'static>(&self, deferred: C::Deferred<T>) -> C::Deferred<T> {
        deferred
    }
}

/// Synchronous context: a deferred value is a boxed closure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thunk;

impl Context for Thunk {
    type Deferred<T: Send + 'static> = Box<dyn FnOnce() -> T + Send>;

    fn pure<T: Send + 'static>(value: T) -> Self::Deferred<T> {
        Box::new(move || value)
    }

    fn map<A, B, F>(deferred: Self::Deferred<A>, f: F) -> Self::Deferred<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Box::new(move || f(deferred()))
    }
}

#[cfg(feature = "async")]
mod asynchronous {
    use super::*;
    use futures::future::{self, BoxFuture, FutureExt};

    /// Asynchronous context: a deferred value is a boxed `Send` future.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Async;

    impl Context for Async {
        type Deferred<T: Send + 'static> = BoxFuture<'static, T>;

        fn pure<T: Send + 'static>(value: T) -> Self::Deferred<T> {
            future::ready(value).boxed()
        }

        fn map<A, B, F>(deferred: Self::Deferred<A>, f: F) -> Self::Deferred<B>
        where
            A: Send + 'static,
            B: Send + 'static,
            F: FnOnce(A) -> B + Send + 'static,
        {
            deferred.map(f).boxed()
        }
    }

    /// Retargets synchronous resolvers to the asynchronous context. The thunk
    /// runs when the future is first polled.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Lift;

    impl ContextMap<Thunk, Async> for Lift {
        fn map<T: Send + 'static>(
            &self,
            deferred: Box<dyn FnOnce() -> T + Send>,
        ) -> BoxFuture<'static, T> {
            future::lazy(move |_| deferred()).boxed()
        }
    }
}

#[cfg(feature = "async")]
pub use asynchronous::{Async, Lift};

/// The outcome of evaluating a field.
pub enum Resolution<C: Context, T: Send + 'static> {
    /// The value is already available.
    Pure(T),
    /// The value requires running the context's deferred computation.
    Deferred(C::Deferred<T>),
}

impl<C: Context, T: Send + 'static> Resolution<C, T> {
    pub fn deferred(computation: C::Deferred<T>) -> Self {
        Resolution::Deferred(computation)
    }

    pub fn is_pure(&self) -> bool {
        matches!(self, Resolution::Pure(_))
    }

    pub fn map<U, F>(self, f: F) -> Resolution<C, U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Resolution::Pure(value) => Resolution::Pure(f(value)),
            Resolution::Deferred(d) => Resolution::Deferred(C::map(d, f)),
        }
    }

    /// Folds both cases into the context.
    pub fn into_deferred(self) -> C::Deferred<T> {
        match self {
            Resolution::Pure(value) => C::pure(value),
            Resolution::Deferred(d) => d,
        }
    }

    /// Converts the embedded computation, if any. `Pure` values are untouched.
    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: &N) -> Resolution<D, T> {
        match self {
            Resolution::Pure(value) => Resolution::Pure(value),
            Resolution::Deferred(d) => Resolution::Deferred(nat.map(d)),
        }
    }
}

impl<C: Context, T: Send + fmt::Debug + 'static> fmt::Debug for Resolution<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Pure(value) => f.debug_tuple("Pure").field(value).finish(),
            Resolution::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thunk_map_composes() {
        let d = Thunk::map(Thunk::map(Thunk::pure(2), |n| n * 10), |n: i32| n.to_string());
        assert_eq!(d(), "20");
    }

    #[test]
    fn resolution_map_keeps_case() {
        let pure: Resolution<Thunk, i32> = Resolution::Pure(1);
        assert!(pure.map(|n| n + 1).is_pure());

        let deferred = Resolution::<Thunk, i32>::deferred(Box::new(|| 4));
        let mapped = deferred.map(|n| n * 2);
        assert!(!mapped.is_pure());
        assert_eq!((mapped.into_deferred())(), 8);
    }

    #[test]
    fn identity_remap_is_noop() {
        let r = Resolution::<Thunk, &str>::deferred(Box::new(|| "ok"));
        let r: Resolution<Thunk, &str> = r.remap(&Identity);
        assert_eq!((r.into_deferred())(), "ok");
    }

    #[cfg(feature = "async")]
    #[test]
    fn lift_runs_thunk_inside_future() {
        let r = Resolution::<Thunk, i32>::deferred(Box::new(|| 7));
        let r: Resolution<Async, i32> = r.remap(&Lift);
        assert_eq!(futures::executor::block_on(r.into_deferred()), 7);
    }
}
