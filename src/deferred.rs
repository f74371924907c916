//! Deferred operations: what a generator yields and what a synchronous
//! callable may return in place of a value.

use crate::{Callback, Reject, Resolve};

/// An object that can be subscribed to for its eventual outcome.
///
/// Implementations call at most one of the two handles, once; calling more
/// is harmless, the handles share a guard. Any `FnOnce(Resolve, Reject)`
/// closure is a thenable.
pub trait Thenable<'a, V> {
    fn then(self: Box<Self>, on_fulfilled: Resolve<'a, V>, on_rejected: Reject<'a, V>);
}

impl<'a, V, F> Thenable<'a, V> for F
where
    F: FnOnce(Resolve<'a, V>, Reject<'a, V>) + 'a,
{
    fn then(self: Box<Self>, on_fulfilled: Resolve<'a, V>, on_rejected: Reject<'a, V>) {
        (*self)(on_fulfilled, on_rejected)
    }
}

/// A value yielded by a generator.
pub enum Deferred<'a, V> {
    /// Started by handing it a callback, which it calls once with the outcome.
    Thunk(Box<dyn FnOnce(Callback<'a, V>) + 'a>),
    Thenable(Box<dyn Thenable<'a, V> + 'a>),
    /// Anything else. Yielding it fails the run.
    Value(V),
}

impl<'a, V> Deferred<'a, V> {
    pub fn thunk<F>(f: F) -> Self
    where
        F: FnOnce(Callback<'a, V>) + 'a,
    {
        Deferred::Thunk(Box::new(f))
    }

    pub fn thenable<T>(thenable: T) -> Self
    where
        T: Thenable<'a, V> + 'a,
    {
        Deferred::Thenable(Box::new(thenable))
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Deferred::Thunk(_) => "thunk",
            Deferred::Thenable(_) => "thenable",
            Deferred::Value(_) => "value",
        }
    }
}
