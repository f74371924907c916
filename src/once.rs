//! At-most-once signal handles.
//!
//! Every completion path in the crate goes through a [Once]: the first
//! signal runs the wrapped function, later ones are dropped with a debug log.
//! The handles are cheap to clone so a misbehaving callable can hold on to
//! several copies without being able to fire twice.

use std::{cell::RefCell, rc::Rc};

use log::debug;

use crate::Error;

const LOG: &str = "wrap_fn::once";

/// What a continuation receives: the spread result values, or the error.
pub type Outcome<V> = Result<Vec<V>, Error>;

/// What a deferred operation settles with, and what a generator is resumed
/// with. `Err` is injected into the generator as a throw.
pub type Resume<V> = Result<V, Error>;

type Slot<'a, T> = Rc<RefCell<Option<Box<dyn FnOnce(T) + 'a>>>>;

pub(crate) struct Once<'a, T> {
    slot: Slot<'a, T>,
}

impl<'a, T> Clone for Once<'a, T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<'a, T> Once<'a, T> {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce(T) + 'a,
    {
        Self {
            slot: Rc::new(RefCell::new(Some(Box::new(f)))),
        }
    }

    /// Runs the wrapped function if nothing has fired yet.
    pub(crate) fn fire(&self, value: T) -> bool {
        // released before the call, the callee may signal again
        let f = self.slot.borrow_mut().take();
        match f {
            Some(f) => {
                f(value);
                true
            }
            None => {
                debug!(target: LOG, "once.suppressed");
                false
            }
        }
    }

    pub(crate) fn is_spent(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

/// The single completion of an invocation.
///
/// Callback-style callables receive a clone of it as their trailing done
/// callback. Only the first signal is honored; the return value says
/// whether this one was.
pub struct Completion<'a, V> {
    once: Once<'a, Outcome<V>>,
}

impl<'a, V> Clone for Completion<'a, V> {
    fn clone(&self) -> Self {
        Self {
            once: self.once.clone(),
        }
    }
}

impl<'a, V> Completion<'a, V> {
    pub fn new<F>(continuation: F) -> Self
    where
        F: FnOnce(Outcome<V>) + 'a,
    {
        Self {
            once: Once::new(continuation),
        }
    }

    pub fn complete(&self, outcome: Outcome<V>) -> bool {
        self.once.fire(outcome)
    }

    pub fn ok(&self, values: Vec<V>) -> bool {
        self.complete(Ok(values))
    }

    pub fn fail(&self, err: impl Into<Error>) -> bool {
        self.complete(Err(err.into()))
    }

    pub fn is_completed(&self) -> bool {
        self.once.is_spent()
    }
}

/// The callback handed to a thunk.
pub struct Callback<'a, V> {
    once: Once<'a, Resume<V>>,
}

impl<'a, V> Clone for Callback<'a, V> {
    fn clone(&self) -> Self {
        Self {
            once: self.once.clone(),
        }
    }
}

impl<'a, V> Callback<'a, V> {
    pub(crate) fn new(once: Once<'a, Resume<V>>) -> Self {
        Self { once }
    }

    pub fn call(&self, resume: Resume<V>) -> bool {
        self.once.fire(resume)
    }

    pub fn ok(&self, value: V) -> bool {
        self.call(Ok(value))
    }

    pub fn fail(&self, err: impl Into<Error>) -> bool {
        self.call(Err(err.into()))
    }
}

/// Fulfillment side of a thenable subscription.
pub struct Resolve<'a, V> {
    once: Once<'a, Resume<V>>,
}

impl<'a, V> Clone for Resolve<'a, V> {
    fn clone(&self) -> Self {
        Self {
            once: self.once.clone(),
        }
    }
}

impl<'a, V> Resolve<'a, V> {
    pub fn call(&self, value: V) -> bool {
        self.once.fire(Ok(value))
    }
}

/// Rejection side of a thenable subscription.
///
/// Shares its guard with the matching [Resolve].
pub struct Reject<'a, V> {
    once: Once<'a, Resume<V>>,
}

impl<'a, V> Clone for Reject<'a, V> {
    fn clone(&self) -> Self {
        Self {
            once: self.once.clone(),
        }
    }
}

impl<'a, V> Reject<'a, V> {
    /// Reasons that are not an [Error] are coerced into one.
    pub fn call(&self, reason: impl Into<Error>) -> bool {
        self.once.fire(Err(reason.into()))
    }
}

pub(crate) fn settlement<'a, V>(once: Once<'a, Resume<V>>) -> (Resolve<'a, V>, Reject<'a, V>) {
    let resolve = Resolve { once: once.clone() };
    let reject = Reject { once };
    (resolve, reject)
}
