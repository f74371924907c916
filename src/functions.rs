//! Small helpers built on top of the coroutine primitives.

use super::*;

/// Pauses until an input arrives and returns it
///
/// This is the resumption half of a generator `yield`.
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<i32, (), i32> = receive();
/// ```
pub fn receive<'a, I: 'a, O: 'a>() -> Coroutine<'a, I, O, I> {
    suspend(result)
}

/// Maps the result of the coroutine
///
/// Sugar over bind and result
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<i32, (), String> = map(receive(), |a| a.to_string());
/// ```
pub fn map<'a, I: 'a, O: 'a, A: 'a, B: 'a, F>(
    co: Coroutine<'a, I, O, A>,
    map: F,
) -> Coroutine<'a, I, O, B>
where
    F: FnOnce(A) -> B + 'a,
{
    bind(co, move |a| result(map(a)))
}
