use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure surfaced by the kernel is one of these; domain error enums
/// convert into it at module boundaries.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an executor-origin invalid-argument error.
    pub(crate) fn executor_invalid_argument(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Executor,
            message.into(),
        )
    }

    /// Construct an executor-origin unsupported error.
    pub(crate) fn executor_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Executor,
            message.into(),
        )
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message.into(),
        )
    }

    /// Construct a store-origin invariant violation.
    pub(crate) fn store_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Store,
            message.into(),
        )
    }

    /// Construct a cursor lifecycle misuse error.
    pub(crate) fn cursor_misuse(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::StateMisuse, ErrorOrigin::Cursor, message.into())
    }

    /// Construct a comparison failure for values that have no common order.
    pub(crate) fn incomparable(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Incomparable, origin, message.into())
    }

    pub fn store_not_found(what: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("not found in store: {}", what.into()),
        )
    }

    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self.class, ErrorClass::Cancelled | ErrorClass::TimedOut)
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self.class, ErrorClass::InvalidArgument)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Configuration errors are `InvalidArgument`; lifecycle misuse is `StateMisuse`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArgument,
    Incomparable,
    Cancelled,
    TimedOut,
    StateMisuse,
    Unsupported,
    InvariantViolation,
    NotFound,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Incomparable => "incomparable",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::StateMisuse => "state_misuse",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Index,
    Store,
    Cursor,
    Executor,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Index => "index",
            Self::Store => "store",
            Self::Cursor => "cursor",
            Self::Executor => "executor",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
