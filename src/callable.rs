//! Callables of every supported calling convention.

use crate::{failable, Body, Completion, Error, Generator, Thenable};

/// What a synchronous call hands back.
pub enum Returned<'a, V> {
    /// Success with a single value.
    Value(V),
    /// An error returned rather than thrown. It fails the invocation exactly
    /// as an `Err` would, which surprises callers expecting it as a value.
    Error(Error),
    /// A pending result; the invocation settles when it does.
    Thenable(Box<dyn Thenable<'a, V> + 'a>),
}

impl<'a, V> Returned<'a, V> {
    pub fn thenable<T>(thenable: T) -> Self
    where
        T: Thenable<'a, V> + 'a,
    {
        Returned::Thenable(Box::new(thenable))
    }
}

pub type SyncFn<'a, C, V> = dyn Fn(&C, Vec<V>) -> Result<Returned<'a, V>, Error> + 'a;
pub type CallbackFn<'a, C, V> = dyn Fn(&C, Vec<V>, Completion<'a, V>) -> Result<(), Error> + 'a;
pub type GeneratorFn<'a, C, V> = dyn Fn(&C, Vec<V>) -> Generator<'a, V> + 'a;
pub type UntypedFn<'a, C, V> =
    dyn Fn(&C, Vec<V>, Option<Completion<'a, V>>) -> Result<Returned<'a, V>, Error> + 'a;

/// A callable tagged with its calling convention.
///
/// Every variant receives the receiver explicitly as `&C`. Returning `Err`
/// from any of them is a synchronous throw.
pub enum Callable<'a, C, V: 'a> {
    /// No callable: arguments pass straight through to the continuation.
    Absent,
    Sync(Box<SyncFn<'a, C, V>>),
    /// Takes a trailing done callback and signals through it.
    Callback(Box<CallbackFn<'a, C, V>>),
    /// Builds a generator body that the driver runs to completion.
    Generator(Box<GeneratorFn<'a, C, V>>),
    /// A callable of unknown convention with a declared parameter count.
    ///
    /// When `arity` exceeds the number of arguments supplied, the spare
    /// slot is taken to be a done callback and the call receives
    /// `Some(completion)`; its return value is then ignored. Otherwise it
    /// is called synchronously with `None`.
    Untyped { arity: usize, call: Box<UntypedFn<'a, C, V>> },
}

/// The execution strategy chosen for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Absent,
    /// May escalate to a thenable subscription if the call returns one.
    Synchronous,
    CallbackAsync,
    GeneratorBased,
}

impl<'a, C, V: 'a> Callable<'a, C, V> {
    pub fn absent() -> Self {
        Callable::Absent
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&C, Vec<V>) -> Result<Returned<'a, V>, Error> + 'a,
    {
        Callable::Sync(Box::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&C, Vec<V>, Completion<'a, V>) -> Result<(), Error> + 'a,
    {
        Callable::Callback(Box::new(f))
    }

    /// A generator-based callable; `f` builds a fresh body per invocation.
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&C, Vec<V>) -> Body<'a, V> + 'a,
    {
        Callable::Generator(Box::new(move |ctx: &C, args: Vec<V>| {
            failable::to_coroutine(f(ctx, args))
        }))
    }

    pub fn untyped<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&C, Vec<V>, Option<Completion<'a, V>>) -> Result<Returned<'a, V>, Error> + 'a,
    {
        Callable::Untyped {
            arity,
            call: Box::new(f),
        }
    }

    /// Picks the strategy for a call with `argc` arguments.
    pub fn classify(&self, argc: usize) -> Strategy {
        match self {
            Callable::Absent => Strategy::Absent,
            Callable::Generator(_) => Strategy::GeneratorBased,
            Callable::Callback(_) => Strategy::CallbackAsync,
            Callable::Untyped { arity, .. } if *arity > argc => Strategy::CallbackAsync,
            Callable::Sync(_) | Callable::Untyped { .. } => Strategy::Synchronous,
        }
    }
}

impl<'a, C, V: 'a> Default for Callable<'a, C, V> {
    fn default() -> Self {
        Callable::Absent
    }
}

impl<'a, C, V: 'a> From<Option<Callable<'a, C, V>>> for Callable<'a, C, V> {
    fn from(callable: Option<Callable<'a, C, V>>) -> Self {
        callable.unwrap_or_default()
    }
}
