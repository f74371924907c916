//! The call-style normalizer.
//!
//! Whatever convention a [Callable] uses, invoking it through an [Invoker]
//! or a [Wrapped] ends in exactly one call of the continuation with an
//! [Outcome]. Nothing a callable does, throwing included, escapes to the
//! caller of the invoker.

use log::trace;

use crate::{
    driver,
    once::{settlement, Once},
    Callable, Completion, Error, Outcome, Resume, Returned, Strategy, Thenable,
};

const LOG: &str = "wrap_fn::normalize";

/// A callable bound to a single continuation.
///
/// The continuation is guarded when the invoker is created, so even an
/// invoker that is called again completes at most once.
pub struct Invoker<'a, C, V: 'a> {
    callable: Callable<'a, C, V>,
    completion: Completion<'a, V>,
}

impl<'a, C, V: 'a> Invoker<'a, C, V> {
    /// Invokes the callable with `ctx` bound as its receiver.
    pub fn invoke(&self, ctx: &C, args: Vec<V>) {
        dispatch(&self.callable, ctx, args, self.completion.clone());
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_completed()
    }
}

/// Binds `callable` to `continuation`
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use wrap_fn::*;
///
/// let seen = Rc::new(RefCell::new(None));
/// let sink = Rc::clone(&seen);
/// let add: Callable<(), i32> =
///     Callable::sync(|_, args: Vec<i32>| Ok(Returned::Value(args.iter().sum())));
///
/// let invoker = normalize(add, move |outcome| *sink.borrow_mut() = Some(outcome));
/// invoker.invoke(&(), vec![1, 2]);
///
/// assert_eq!(seen.borrow_mut().take().unwrap().unwrap(), vec![3]);
/// ```
pub fn normalize<'a, C, V, F>(callable: Callable<'a, C, V>, continuation: F) -> Invoker<'a, C, V>
where
    V: 'a,
    F: FnOnce(Outcome<V>) + 'a,
{
    Invoker {
        callable,
        completion: Completion::new(continuation),
    }
}

/// A callable whose continuation is supplied with every call.
pub struct Wrapped<'a, C, V: 'a> {
    callable: Callable<'a, C, V>,
}

impl<'a, C, V: 'a> Wrapped<'a, C, V> {
    /// Invokes the callable with `ctx` bound, completing through `next`.
    ///
    /// Each call guards its own `next`.
    pub fn call<F>(&self, ctx: &C, args: Vec<V>, next: F)
    where
        F: FnOnce(Outcome<V>) + 'a,
    {
        dispatch(&self.callable, ctx, args, Completion::new(next));
    }
}

/// Wraps `callable` without fixing a continuation
pub fn wrap<'a, C, V: 'a>(callable: Callable<'a, C, V>) -> Wrapped<'a, C, V> {
    Wrapped { callable }
}

fn dispatch<'a, C, V: 'a>(
    callable: &Callable<'a, C, V>,
    ctx: &C,
    args: Vec<V>,
    completion: Completion<'a, V>,
) {
    let strategy = callable.classify(args.len());
    trace!(target: LOG, "invoke.classified {:?} argc={}", strategy, args.len());

    match callable {
        Callable::Absent => {
            completion.ok(args);
        }
        Callable::Sync(call) => settle_returned(call(ctx, args), completion),
        Callable::Callback(call) => {
            let thrown = call(ctx, args, completion.clone());
            settle_thrown(thrown, completion);
        }
        Callable::Untyped { call, .. } if strategy == Strategy::CallbackAsync => {
            let thrown = call(ctx, args, Some(completion.clone())).map(drop);
            settle_thrown(thrown, completion);
        }
        Callable::Untyped { call, .. } => settle_returned(call(ctx, args, None), completion),
        Callable::Generator(start) => driver::drive(start(ctx, args), completion),
    }
}

/// A throw while starting a callback-style call fails the invocation,
/// unless the callable already signalled through its done callback.
fn settle_thrown<'a, V>(thrown: Result<(), Error>, completion: Completion<'a, V>) {
    if let Err(err) = thrown {
        trace!(target: LOG, "invoke.thrown {}", err);
        completion.fail(err);
    }
}

fn settle_returned<'a, V: 'a>(
    returned: Result<Returned<'a, V>, Error>,
    completion: Completion<'a, V>,
) {
    match returned {
        Ok(Returned::Value(value)) => {
            completion.ok(vec![value]);
        }
        Ok(Returned::Error(err)) => {
            trace!(target: LOG, "invoke.returned_error {}", err);
            completion.fail(err);
        }
        Ok(Returned::Thenable(thenable)) => {
            trace!(target: LOG, "invoke.thenable");
            subscribe(thenable, completion);
        }
        Err(err) => {
            trace!(target: LOG, "invoke.thrown {}", err);
            completion.fail(err);
        }
    }
}

fn subscribe<'a, V: 'a>(thenable: Box<dyn Thenable<'a, V> + 'a>, completion: Completion<'a, V>) {
    let once = Once::new(move |resume: Resume<V>| {
        completion.complete(resume.map(|value| vec![value]));
    });
    let (resolve, reject) = settlement(once);
    thenable.then(resolve, reject);
}
