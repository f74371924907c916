#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use wrap_fn::{Callback, Deferred, Error, Outcome, Reject, Resolve};

pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// The receiver handed to every invocation.
#[derive(Debug)]
pub struct Ctx {
    pub ctx: &'static str,
}

impl Ctx {
    pub fn new() -> Self {
        Self { ctx: "ctx" }
    }
}

/// A single-threaded stand-in for `process.nextTick`.
///
/// Deferred work queues up here and only runs when the test calls
/// [Ticks::run], which lets tests observe the suspended state in between.
#[derive(Clone, Default)]
pub struct Ticks {
    queue: Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>,
}

impl Ticks {
    pub fn defer(&self, f: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(f));
    }

    /// Runs queued work, including work queued while running. Returns how
    /// many tasks ran.
    pub fn run(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// A thunk that calls back with `value` on the next tick.
    pub fn thunk<V: 'static>(&self, value: V) -> Deferred<'static, V> {
        let ticks = self.clone();
        Deferred::thunk(move |callback: Callback<'static, V>| {
            ticks.defer(move || {
                callback.ok(value);
            })
        })
    }

    /// A thunk that fails with `message` on the next tick.
    pub fn failing_thunk<V: 'static>(&self, message: &'static str) -> Deferred<'static, V> {
        let ticks = self.clone();
        Deferred::thunk(move |callback: Callback<'static, V>| {
            ticks.defer(move || {
                callback.fail(Error::new(message));
            })
        })
    }

    /// A thenable that fulfills with `value` on the next tick.
    pub fn resolving<V: 'static>(&self, value: V) -> Deferred<'static, V> {
        let ticks = self.clone();
        Deferred::thenable(move |resolve: Resolve<'static, V>, _reject: Reject<'static, V>| {
            ticks.defer(move || {
                resolve.call(value);
            })
        })
    }

    /// A thenable that rejects with `message` on the next tick.
    pub fn rejecting<V: 'static>(&self, message: &'static str) -> Deferred<'static, V> {
        let ticks = self.clone();
        Deferred::thenable(move |_resolve: Resolve<'static, V>, reject: Reject<'static, V>| {
            ticks.defer(move || {
                reject.call(Error::new(message));
            })
        })
    }
}

/// Collects every outcome a continuation is called with.
pub struct Recorder<V> {
    outcomes: Rc<RefCell<Vec<Outcome<V>>>>,
}

impl<V: 'static> Recorder<V> {
    pub fn new() -> Self {
        Self {
            outcomes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn next(&self) -> impl FnOnce(Outcome<V>) + 'static {
        let outcomes = Rc::clone(&self.outcomes);
        move |outcome| outcomes.borrow_mut().push(outcome)
    }

    pub fn calls(&self) -> usize {
        self.outcomes.borrow().len()
    }

    /// The single outcome, asserting there was exactly one.
    pub fn only(&self) -> Outcome<V> {
        let mut outcomes = self.outcomes.borrow_mut();
        assert_eq!(outcomes.len(), 1, "continuation must fire exactly once");
        outcomes.remove(0)
    }

    pub fn values(&self) -> Vec<V> {
        match self.only() {
            Ok(values) => values,
            Err(err) => panic!("expected success, got error: {err}"),
        }
    }

    pub fn error(&self) -> Error {
        match self.only() {
            Ok(_) => panic!("expected an error"),
            Err(err) => err,
        }
    }
}
