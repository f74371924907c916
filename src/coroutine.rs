use std::{cell::RefCell, mem, rc::Rc};

/// A suspendable computation that yields outputs, awaits inputs,
/// and finally terminates with a result.
///
/// This is the shape generator bodies are written in. Nothing runs until
/// something steps it with [run_step]; a yield or an await pauses the
/// coroutine until the driver consumes the output or supplies the input.
///
/// For a generator the output is the deferred operation being waited on,
/// and the input is the outcome that operation settled with.
///
/// Binds are lazy and are unwound by [run_step] in a flat loop, so neither
/// long chains of binds nor deep recursion through them grow the stack.
pub struct Coroutine<'a, Input, Output, Result> {
    resume: CoroutineState<'a, Input, Output, Result>,
}

/// Receives the result of a coroutine
type Continuation<'a, I, O, R> = Box<dyn FnOnce(R) -> Step<'a, I, O> + 'a>;

/// The internal state of the machine
enum CoroutineState<'a, I, O, R> {
    /// Not started; runs once it is given somewhere to send its result
    Ready(Box<dyn FnOnce(Continuation<'a, I, O, R>) -> Step<'a, I, O> + 'a>),
    /// Part-way through, finishing into `exit`
    Paused(Step<'a, I, O>, Rc<RefCell<Exit<'a, I, O, R>>>),
}

/// One instruction of a running coroutine.
///
/// Each instruction does a bounded amount of work before handing back the
/// next one.
enum Step<'a, I, O> {
    More(Box<dyn FnOnce() -> Step<'a, I, O> + 'a>),
    Yield(O, Box<dyn FnOnce() -> Step<'a, I, O> + 'a>),
    Await(Box<dyn FnOnce(I) -> Step<'a, I, O> + 'a>),
    /// The result is waiting in the exit
    Halt,
}

/// Where a paused coroutine sends its result
enum Exit<'a, I, O, R> {
    Open,
    Returned(R),
    Bound(Continuation<'a, I, O, R>),
}

impl<'a, I: 'a, O: 'a, R: 'a> Coroutine<'a, I, O, R> {
    fn ready<F>(start: F) -> Self
    where
        F: FnOnce(Continuation<'a, I, O, R>) -> Step<'a, I, O> + 'a,
    {
        let resume = CoroutineState::Ready(Box::new(start));
        Coroutine { resume }
    }

    fn paused(step: Step<'a, I, O>, exit: Rc<RefCell<Exit<'a, I, O, R>>>) -> Self {
        let resume = CoroutineState::Paused(step, exit);
        Coroutine { resume }
    }

    /// The first instruction, with the result going to `k`
    fn run(self, k: Continuation<'a, I, O, R>) -> Step<'a, I, O> {
        match self.resume {
            CoroutineState::Ready(start) => start(k),
            CoroutineState::Paused(step, exit) => {
                *exit.borrow_mut() = Exit::Bound(k);
                step
            }
        }
    }
}

fn deliver<'a, I, O, R>(exit: &RefCell<Exit<'a, I, O, R>>, r: R) -> Step<'a, I, O> {
    let previous = mem::replace(&mut *exit.borrow_mut(), Exit::Open);
    match previous {
        Exit::Bound(k) => k(r),
        Exit::Open | Exit::Returned(_) => {
            *exit.borrow_mut() = Exit::Returned(r);
            Step::Halt
        }
    }
}

/// Creates a finished coroutine holding `r`
///
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<(), (), i32> = result(1);
/// assert!(matches!(run_step(co), StepResult::Done(1)));
/// ```
pub fn result<'a, I: 'a, O: 'a, R: 'a>(r: R) -> Coroutine<'a, I, O, R> {
    Coroutine::ready(move |k| k(r))
}

/// Pauses until an input arrives, then continues with `f(input)`
///
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<i32, (), String> = suspend(|input: i32| result(input.to_string()));
/// ```
pub fn suspend<'a, I: 'a, O: 'a, R: 'a, F>(f: F) -> Coroutine<'a, I, O, R>
where
    F: FnOnce(I) -> Coroutine<'a, I, O, R> + 'a,
{
    Coroutine::ready(move |k| Step::Await(Box::new(move |input: I| f(input).run(k))))
}

/// Hands `o` to whoever is stepping the coroutine
///
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<(), &str, ()> = send("tick");
/// assert!(matches!(run_step(co), StepResult::Yield { output: "tick", .. }));
/// ```
pub fn send<'a, I: 'a, O: 'a>(o: O) -> Coroutine<'a, I, O, ()> {
    Coroutine::ready(move |k| Step::Yield(o, Box::new(move || k(()))))
}

/// Sequences two coroutines, feeding the result of `m` into `f`
///
/// Pending yields and awaits of `m` are kept in front of the continuation.
/// ```
/// use wrap_fn::*;
/// // awaits two inputs and adds them
/// let co: Coroutine<i32, (), i32> =
///     bind(receive(), |a: i32| bind(receive(), move |b: i32| result(a + b)));
/// ```
pub fn bind<'a, I: 'a, O: 'a, A: 'a, B: 'a, F>(
    m: Coroutine<'a, I, O, A>,
    f: F,
) -> Coroutine<'a, I, O, B>
where
    F: FnOnce(A) -> Coroutine<'a, I, O, B> + 'a,
{
    Coroutine::ready(move |k| {
        Step::More(Box::new(move || {
            m.run(Box::new(move |a: A| Step::More(Box::new(move || f(a).run(k)))))
        }))
    })
}

/// What a single step of a coroutine produced
pub enum StepResult<'a, Input, Output, Result> {
    /// The coroutine finished with this value
    Done(Result),
    /// The coroutine produced an output and paused behind it
    Yield {
        output: Output,
        next: Box<Coroutine<'a, Input, Output, Result>>,
    },
    /// The coroutine needs an input before it can go on
    Next(Box<dyn FnOnce(Input) -> Coroutine<'a, Input, Output, Result> + 'a>),
}

/// Runs the coroutine up to its next pause
///
/// ```
/// use wrap_fn::*;
/// let co: Coroutine<i32, (), i32> = receive();
/// assert!(matches!(run_step(co), StepResult::Next(_)));
/// ```
pub fn run_step<'a, I: 'a, O: 'a, R: 'a>(
    routine: Coroutine<'a, I, O, R>,
) -> StepResult<'a, I, O, R> {
    let (mut step, exit) = match routine.resume {
        CoroutineState::Paused(step, exit) => (step, exit),
        CoroutineState::Ready(start) => {
            let exit = Rc::new(RefCell::new(Exit::Open));
            let out = Rc::clone(&exit);
            (start(Box::new(move |r: R| deliver(&out, r))), exit)
        }
    };

    loop {
        step = match step {
            Step::More(next) => next(),
            Step::Yield(output, rest) => {
                let next = Box::new(Coroutine::paused(Step::More(rest), exit));
                return StepResult::Yield { output, next };
            }
            Step::Await(feed) => {
                let next = move |input: I| Coroutine::paused(feed(input), exit);
                return StepResult::Next(Box::new(next));
            }
            Step::Halt => {
                let finished = mem::replace(&mut *exit.borrow_mut(), Exit::Open);
                let Exit::Returned(r) = finished else {
                    unreachable!("coroutine halted without a result");
                };
                return StepResult::Done(r);
            }
        };
    }
}
