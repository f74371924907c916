use super::{err, lift, ResultCoroutine};
use crate::{Deferred, Error, Resume};

/// The body of a generator: it yields [Deferred] operations, is resumed
/// with their outcome, and finishes with a value or an error.
pub type Body<'a, V, R = V> = ResultCoroutine<'a, Resume<V>, Deferred<'a, V>, R, Error>;

/// Yields `op` and pauses until it settles
///
/// A fulfilled operation resumes the body with its value. A failed one is
/// thrown at this point: the rest of the body is skipped unless the yield
/// sits inside [recover](super::recover).
pub fn yield_<'a, V: 'a>(op: Deferred<'a, V>) -> Body<'a, V, V> {
    lift(crate::bind(crate::send(op), |()| crate::receive()))
}

/// Like [yield_], but hands the outcome to the body instead of throwing
pub fn settle<'a, V: 'a>(op: Deferred<'a, V>) -> Body<'a, V, Resume<V>> {
    lift(crate::map(
        crate::bind(crate::send(op), |()| crate::receive()),
        Ok,
    ))
}

/// Fails the body with `e`
pub fn throw<'a, V: 'a, R: 'a>(e: impl Into<Error>) -> Body<'a, V, R> {
    err(e.into())
}

/// Finishes the body with `value`
pub fn ret<'a, V: 'a, R: 'a>(value: R) -> Body<'a, V, R> {
    super::result(value)
}
