//! The generator driver.
//!
//! Steps a generator with [run_step], starts each deferred operation it
//! yields, and resumes it with the outcome once that settles. Resumptions
//! are strictly sequential: the generator is parked in [RunState::Awaiting]
//! while an operation is in flight and nothing else can step it.
//!
//! Operations that settle synchronously do not recurse into the driver;
//! their outcome is parked in an inbox and picked up by the running loop.

use std::{
    cell::{Cell, RefCell},
    mem,
    rc::Rc,
};

use log::{debug, trace};

use crate::{
    once::{settlement, Once},
    run_step, Callback, Completion, Coroutine, Deferred, Error, Resume, StepResult,
};

const LOG: &str = "wrap_fn::driver";

/// A generator, as the driver sees it.
///
/// It yields [Deferred] operations, is resumed with their [Resume]
/// outcome, and finishes with `Ok(value)` or throws with `Err(error)`.
pub type Generator<'a, V> = Coroutine<'a, Resume<V>, Deferred<'a, V>, Result<V, Error>>;

enum RunState<'a, V> {
    /// Being stepped by the driver loop.
    Running,
    /// Parked behind a yielded operation that has not settled.
    Awaiting(Generator<'a, V>),
    /// Finished; the value has gone to the completion.
    Completed,
    /// Finished; the error has gone to the completion.
    Failed,
}

/// What one advance of the generator produced
enum Event<'a, V> {
    Yielded(Deferred<'a, V>, Generator<'a, V>),
    Completed(V),
    Failed(Error),
}

struct Driver<'a, V> {
    state: RefCell<RunState<'a, V>>,
    inbox: RefCell<Option<Resume<V>>>,
    stepping: Cell<bool>,
    completion: Completion<'a, V>,
}

/// Runs `generator` to completion, reporting through `completion`
///
/// The completion fires exactly once: with `Ok(vec![value])` when the
/// generator returns, or with the error it throws. Errors from yielded
/// operations are thrown into the generator first and only fail the run
/// if the body does not recover from them.
pub fn drive<'a, V: 'a>(generator: Generator<'a, V>, completion: Completion<'a, V>) {
    trace!(target: LOG, "driver.start");
    let driver = Rc::new(Driver {
        state: RefCell::new(RunState::Running),
        inbox: RefCell::new(None),
        stepping: Cell::new(false),
        completion,
    });
    driver.run(next_event(generator));
}

impl<'a, V: 'a> Driver<'a, V> {
    fn run(self: &Rc<Self>, mut event: Event<'a, V>) {
        self.stepping.set(true);
        loop {
            let (op, next) = match event {
                Event::Completed(value) => {
                    trace!(target: LOG, "driver.completed");
                    self.finish(RunState::Completed, Ok(vec![value]));
                    break;
                }
                Event::Failed(err) => {
                    trace!(target: LOG, "driver.failed {}", err);
                    self.finish(RunState::Failed, Err(err));
                    break;
                }
                Event::Yielded(op, next) => (op, next),
            };

            trace!(target: LOG, "driver.yield {}", op.describe());
            *self.state.borrow_mut() = RunState::Awaiting(next);
            if let Err(err) = self.start(op) {
                debug!(target: LOG, "driver.invalid_yield");
                self.finish(RunState::Failed, Err(err));
                break;
            }

            let settled = self.inbox.borrow_mut().take();
            let Some(resume) = settled else {
                trace!(target: LOG, "driver.suspended");
                break;
            };
            let Some(generator) = self.take_awaiting() else {
                break;
            };
            event = resume_with(generator, resume);
        }
        self.stepping.set(false);
    }

    /// Starts a yielded operation, wiring its outcome back to [Self::settle].
    fn start(self: &Rc<Self>, op: Deferred<'a, V>) -> Result<(), Error> {
        let driver = Rc::clone(self);
        let once = Once::new(move |resume: Resume<V>| driver.settle(resume));
        match op {
            Deferred::Thunk(thunk) => thunk(Callback::new(once)),
            Deferred::Thenable(thenable) => {
                let (resolve, reject) = settlement(once);
                thenable.then(resolve, reject);
            }
            Deferred::Value(_) => return Err(Error::invalid_yield()),
        }
        Ok(())
    }

    fn settle(self: &Rc<Self>, resume: Resume<V>) {
        if self.stepping.get() {
            trace!(target: LOG, "driver.settled_inline");
            *self.inbox.borrow_mut() = Some(resume);
            return;
        }
        match self.take_awaiting() {
            Some(generator) => {
                trace!(target: LOG, "driver.resume");
                self.run(resume_with(generator, resume));
            }
            None => debug!(target: LOG, "driver.settle_ignored"),
        }
    }

    fn take_awaiting(&self) -> Option<Generator<'a, V>> {
        let mut state = self.state.borrow_mut();
        match mem::replace(&mut *state, RunState::Running) {
            RunState::Awaiting(generator) => Some(generator),
            other => {
                *state = other;
                None
            }
        }
    }

    fn finish(&self, state: RunState<'a, V>, outcome: Result<Vec<V>, Error>) {
        *self.state.borrow_mut() = state;
        self.completion.complete(outcome);
    }
}

/// Advances a generator that is not waiting on anything
fn next_event<'a, V: 'a>(generator: Generator<'a, V>) -> Event<'a, V> {
    event_of(run_step(generator))
}

fn event_of<'a, V>(
    step: StepResult<'a, Resume<V>, Deferred<'a, V>, Result<V, Error>>,
) -> Event<'a, V> {
    match step {
        StepResult::Done(Ok(value)) => Event::Completed(value),
        StepResult::Done(Err(err)) => Event::Failed(err),
        StepResult::Yield { output, next } => Event::Yielded(output, *next),
        StepResult::Next(_) => Event::Failed(Error::missing_yield()),
    }
}

/// Resumes a generator parked behind a yield
///
/// A generator that moves on without receiving ignores a value, but an
/// error it never receives is thrown at the yield and fails the run.
fn resume_with<'a, V: 'a>(generator: Generator<'a, V>, resume: Resume<V>) -> Event<'a, V> {
    match run_step(generator) {
        StepResult::Next(receive) => next_event(receive(resume)),
        step => match resume {
            Ok(_) => event_of(step),
            Err(err) => Event::Failed(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{failable, recover, ret, throw, yield_, Body, Outcome};

    type Outcomes = Rc<RefCell<Vec<Outcome<i32>>>>;

    fn run(body: Body<'static, i32>) -> Outcomes {
        let outcomes: Outcomes = Rc::default();
        let sink = Rc::clone(&outcomes);
        let completion = Completion::new(move |outcome| sink.borrow_mut().push(outcome));
        drive(failable::to_coroutine(body), completion);
        outcomes
    }

    fn ready(value: i32) -> Deferred<'static, i32> {
        Deferred::thunk(move |callback: Callback<i32>| {
            callback.ok(value);
        })
    }

    fn failing(message: &'static str) -> Deferred<'static, i32> {
        Deferred::thunk(move |callback: Callback<i32>| {
            callback.fail(Error::new(message));
        })
    }

    #[test]
    fn returns_without_yielding() {
        let outcomes = run(ret(4));
        assert_eq!(outcomes.borrow().len(), 1);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![4]);
    }

    #[test]
    fn resumes_with_inline_settlements() {
        let body = yield_(ready(1)).and_then(|a| yield_(ready(2)).and_then(move |b| ret(a + b)));
        let outcomes = run(body);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![3]);
    }

    #[test]
    fn long_recursive_body_runs_flat() {
        fn count(n: i32) -> Body<'static, i32> {
            if n == 0 {
                return ret(0);
            }
            yield_(ready(1))
                .and_then(move |one| count(n - 1).and_then(move |rest| ret(one + rest)))
        }
        let outcomes = run(count(100_000));
        assert_eq!(outcomes.borrow().len(), 1);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![100_000]);
    }

    #[test]
    fn long_and_then_chain_runs_flat() {
        let mut body: Body<'static, i32> = ret(0);
        for _ in 0..100_000 {
            body = body.and_then(|acc| yield_(ready(1)).and_then(move |one| ret(acc + one)));
        }
        let outcomes = run(body);
        assert_eq!(outcomes.borrow().len(), 1);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![100_000]);
    }

    #[test]
    fn long_chain_settled_later_resumes_flat() {
        let parked: Rc<RefCell<Vec<Callback<'static, i32>>>> = Rc::default();
        let mut body: Body<'static, i32> = ret(0);
        for _ in 0..100_000 {
            let slot = Rc::clone(&parked);
            body = body.and_then(move |acc| {
                let op = Deferred::thunk(move |callback| slot.borrow_mut().push(callback));
                yield_(op).and_then(move |one| ret(acc + one))
            });
        }
        let outcomes = run(body);

        loop {
            let pending = parked.borrow_mut().pop();
            let Some(callback) = pending else { break };
            callback.ok(1);
        }
        assert_eq!(outcomes.borrow().len(), 1);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![100_000]);
    }

    #[test]
    fn unrecovered_failure_fails_the_run() {
        let outcomes = run(yield_(failing("boom")).and_then(|_| ret(1)));
        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].as_ref().unwrap_err().to_string(), "boom");
    }

    #[test]
    fn failure_is_catchable_inside_the_body() {
        let body = recover(yield_(failing("boom")), |_| ret(9));
        let outcomes = run(body);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![9]);
    }

    #[test]
    fn throw_before_any_yield() {
        let outcomes = run(throw("early"));
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap_err().to_string(), "early");
    }

    #[test]
    fn plain_value_yield_fails() {
        let outcomes = run(yield_(Deferred::Value(5)).and_then(|v| ret(v)));
        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0].as_ref().unwrap_err().kind(),
            crate::ErrorKind::InvalidYield
        ));
    }

    #[test]
    fn receiving_without_yield_fails() {
        let generator: Generator<'static, i32> = crate::receive();
        let outcomes: Outcomes = Rc::default();
        let sink = Rc::clone(&outcomes);
        drive(generator, Completion::new(move |o| sink.borrow_mut().push(o)));
        assert!(matches!(
            outcomes.borrow()[0].as_ref().unwrap_err().kind(),
            crate::ErrorKind::MissingYield
        ));
    }

    #[test]
    fn ignored_error_is_thrown_at_the_yield() {
        let generator: Generator<'static, i32> =
            crate::bind(crate::send(failing("lost")), |()| crate::result(Ok(1)));
        let outcomes: Outcomes = Rc::default();
        let sink = Rc::clone(&outcomes);
        drive(generator, Completion::new(move |o| sink.borrow_mut().push(o)));
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap_err().to_string(), "lost");
    }

    #[test]
    fn parked_until_settled() {
        let parked: Rc<RefCell<Option<Callback<'static, i32>>>> = Rc::default();
        let slot = Rc::clone(&parked);
        let op = Deferred::thunk(move |callback| *slot.borrow_mut() = Some(callback));
        let outcomes = run(yield_(op).and_then(|v| ret(v * 2)));
        assert!(outcomes.borrow().is_empty());

        let callback = parked.borrow_mut().take().unwrap();
        assert!(callback.ok(21));
        assert!(!callback.ok(22));
        assert_eq!(outcomes.borrow().len(), 1);
        assert_eq!(outcomes.borrow()[0].as_ref().unwrap(), &vec![42]);
    }
}
