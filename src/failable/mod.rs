//! Coroutines that can fail.
//!
//! Generator bodies are written as [ResultCoroutine]s: an `Err` anywhere
//! short-circuits the rest of the body, the way a throw unwinds it, unless
//! it is caught with [recover].

mod functions;
mod routine;

pub use functions::*;
pub use routine::*;
