//! The typed, status-coded error every recovered failure normalizes into.

use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use thiserror::Error;

/// An error which can be converted into an HTTP response.
///
/// The status is structurally valid HTTP (the `StatusCode` type admits
/// nothing outside 100-599) and the message is never empty when built
/// through the public constructors. Immutable after construction. The
/// wrapped cause, when present, feeds the causal chain via
/// [`std::error::Error::source`]; it is diagnostic data and never reaches
/// the wire.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    message: String,
    status: StatusCode,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HttpError {
    /// Returns a new error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { message: message.into(), status, source: None }
    }

    /// Returns a new error wrapping `cause` with the given status code and
    /// message.
    pub fn with_cause(
        cause: impl Into<Box<dyn StdError + Send + Sync>>,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self { message: message.into(), status, source: Some(cause.into()) }
    }

    /// The error's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status corresponding to the error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status as a bare integer.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

/// Wire form: `{"message": <string>, "code": <integer>}`. Empty fields are
/// omitted rather than emitted as null, and the cause is not part of the
/// contract.
impl Serialize for HttpError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.message.is_empty() { 1 } else { 2 };
        let mut state = serializer.serialize_struct("HttpError", fields)?;
        if !self.message.is_empty() {
            state.serialize_field("message", &self.message)?;
        }
        state.serialize_field("code", &self.status.as_u16())?;
        state.end()
    }
}

/// Builds an [`HttpError`] with a formatted message.
#[macro_export]
macro_rules! http_error {
    ($status:expr, $($arg:tt)+) => {
        $crate::HttpError::new($status, format!($($arg)+))
    };
}

/// Builds an [`HttpError`] wrapping a cause, with a formatted message.
#[macro_export]
macro_rules! http_error_with_cause {
    ($cause:expr, $status:expr, $($arg:tt)+) => {
        $crate::HttpError::with_cause($cause, $status, format!($($arg)+))
    };
}
