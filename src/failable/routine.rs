use crate::Coroutine;

/// A coroutine that can terminate with an error
///
/// A thin wrapper over a coroutine returning `Result`, where bind
/// short-circuits on `Err`.
pub struct ResultCoroutine<'a, I, O, R, E> {
    co: Coroutine<'a, I, O, Result<R, E>>,
}

/// Finishes successfully with `a`
///
/// See [result](function@crate::result)
pub fn result<'a, I: 'a, O: 'a, A: 'a, E: 'a>(a: A) -> ResultCoroutine<'a, I, O, A, E> {
    let co = crate::result(Ok(a));
    ResultCoroutine { co }
}

/// Fails; further binds are skipped
pub fn err<'a, I: 'a, O: 'a, A: 'a, E: 'a>(e: E) -> ResultCoroutine<'a, I, O, A, E> {
    let co = crate::result(Err(e));
    ResultCoroutine { co }
}

/// Lifts a coroutine of results into a result coroutine
pub fn lift<I, O, R, E>(co: Coroutine<I, O, Result<R, E>>) -> ResultCoroutine<I, O, R, E> {
    ResultCoroutine { co }
}

/// The opposite of [lift]
pub fn to_coroutine<I, O, R, E>(
    co: ResultCoroutine<I, O, R, E>,
) -> Coroutine<I, O, Result<R, E>> {
    co.co
}

/// Bind with result semantics: an earlier failure propagates untouched
pub fn bind<'a, I: 'a, O: 'a, A: 'a, B: 'a, E: 'a, F: 'a>(
    result: ResultCoroutine<'a, I, O, A, E>,
    binder: F,
) -> ResultCoroutine<'a, I, O, B, E>
where
    F: FnOnce(A) -> ResultCoroutine<'a, I, O, B, E>,
{
    let co = crate::bind(result.co, |a| match a {
        Ok(a) => binder(a).co,
        Err(e) => crate::result(Err(e)),
    });
    ResultCoroutine { co }
}

/// Runs `handler` on a failure of `body`, a successful body passes through
///
/// This is the try/recover of a generator body: the handler may yield
/// again, return a value, or fail with the same or another error.
pub fn recover<'a, I: 'a, O: 'a, A: 'a, E: 'a, F: 'a>(
    body: ResultCoroutine<'a, I, O, A, E>,
    handler: F,
) -> ResultCoroutine<'a, I, O, A, E>
where
    F: FnOnce(E) -> ResultCoroutine<'a, I, O, A, E>,
{
    let co = crate::bind(body.co, |r| match r {
        Ok(ok) => crate::result(Ok(ok)),
        Err(e) => handler(e).co,
    });
    ResultCoroutine { co }
}

impl<'a, I: 'a, O: 'a, A: 'a, E: 'a> ResultCoroutine<'a, I, O, A, E> {
    /// Continues with `f` once this finishes successfully.
    ///
    /// Method form of [bind], which is what `do_notation::m!` expands
    /// each `x <- body;` line into.
    pub fn and_then<B: 'a, F: 'a>(self, f: F) -> ResultCoroutine<'a, I, O, B, E>
    where
        F: FnOnce(A) -> ResultCoroutine<'a, I, O, B, E>,
    {
        bind(self, f)
    }
}

/// A bare expression at the end of an `m!` block is a successful finish.
impl<'a, I: 'a, O: 'a, A: 'a, E: 'a> do_notation::Lift<A> for ResultCoroutine<'a, I, O, A, E> {
    fn lift(a: A) -> Self {
        result(a)
    }
}
