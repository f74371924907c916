//! Compatibility with do-notation
//!
//! Rust has no generic 'bind', so `do_notation::m!` leans on `and_then`
//! and `Lift` instead. Nothing here is required, but it keeps longer
//! generator bodies out of callback hell.
//!```
//! use wrap_fn::*;
//! use ::do_notation::m;
//!
//! // awaits two inputs and yields their sum
//! let co: Coroutine<i32, String, ()> = m! {
//!     a <- receive();
//!     b <- receive();
//!     let sum = i32::wrapping_add(a, b);
//!     send(sum.to_string())
//! };
//!
//! let StepResult::Next(feed) = run_step(co) else { panic!() };
//! let StepResult::Next(feed) = run_step(feed(1)) else { panic!() };
//! assert!(matches!(run_step(feed(2)), StepResult::Yield { .. }));
//!```
use crate::*;

impl<'a, I: 'a, O: 'a, R: 'a> ::do_notation::Lift<R> for Coroutine<'a, I, O, R> {
    /// see [result](function@result)
    fn lift(a: R) -> Self {
        result(a)
    }
}

impl<'a, I: 'a, O: 'a, R: 'a> Coroutine<'a, I, O, R> {
    /// Chains coroutines
    ///
    /// see [bind](function@bind)
    pub fn and_then<F: 'a, B: 'a>(self, f: F) -> Coroutine<'a, I, O, B>
    where
        F: FnOnce(R) -> Coroutine<'a, I, O, B>,
    {
        bind(self, f)
    }
}
