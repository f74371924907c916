/// The error a completion reports.
///
/// Errors display as their message alone, so a callable that fails with
/// `"some error"` completes with an error whose `to_string()` is exactly that.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// An error raised by a callable, either thrown (`Err`) or returned.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Message(message.into()),
        }
    }

    /// Wraps a foreign error.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: ErrorKind::Other(Box::new(err)),
        }
    }

    pub(crate) fn reason(reason: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Reason(reason.into()),
        }
    }

    pub(crate) fn invalid_yield() -> Self {
        Self {
            kind: ErrorKind::InvalidYield,
        }
    }

    pub(crate) fn missing_yield() -> Self {
        Self {
            kind: ErrorKind::MissingYield,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// Rejection reasons that are not already an [Error] are coerced into one.
impl From<&str> for Error {
    fn from(reason: &str) -> Self {
        Error::reason(reason)
    }
}

impl From<String> for Error {
    fn from(reason: String) -> Self {
        Error::reason(reason)
    }
}

/// The kind of failure behind an [Error].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A callable threw or returned an error.
    #[error("{0}")]
    Message(String),
    /// A thenable rejected with a reason that was not an error.
    #[error("{0}")]
    Reason(String),
    /// A generator yielded something that is neither a thunk nor a thenable.
    #[error("generator yielded a value that is neither a thunk nor a thenable")]
    InvalidYield,
    /// A generator asked to be resumed while nothing was pending.
    #[error("generator awaited a resumption without yielding a deferred operation")]
    MissingYield,
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
