#![doc = include_str!("../README.md")]

mod callable;
mod compat;
mod coroutine;
mod deferred;
mod driver;
mod error;
mod functions;
mod normalize;
mod once;

pub use callable::*;
pub use coroutine::*;
pub use deferred::*;
pub use driver::{drive, Generator};
pub use error::{Error, ErrorKind};
pub use failable::{recover, ret, settle, throw, yield_, Body, ResultCoroutine};
pub use functions::*;
pub use normalize::*;
pub use once::{Callback, Completion, Outcome, Reject, Resolve, Resume};

pub mod failable;
