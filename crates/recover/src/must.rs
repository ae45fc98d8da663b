//! Escalation helpers: unwrap a `Result` or panic with a typed error
//! payload, to be re-formed into a response at the recovery boundary.

use crate::HttpError;
use http::StatusCode;
use std::error::Error;
use std::panic::panic_any;

/// Unwraps `result` or panics with an [`HttpError`] payload carrying status
/// 500. Equivalent to [`must_status`] with `StatusCode::INTERNAL_SERVER_ERROR`.
pub fn must<T, E>(result: Result<T, E>) -> T
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    must_status(result, StatusCode::INTERNAL_SERVER_ERROR)
}

/// Unwraps `result` or panics with an [`HttpError`] payload carrying the
/// given status.
///
/// An error which already is an [`HttpError`] panics as-is, keeping its own
/// status; anything else is wrapped with its message and retained as cause.
pub fn must_status<T, E>(result: Result<T, E>, status: StatusCode) -> T
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    match result {
        Ok(value) => value,
        Err(e) => {
            let e: Box<dyn Error + Send + Sync> = e.into();
            match e.downcast::<HttpError>() {
                Ok(err) => panic_any(*err),
                Err(e) => {
                    let message = e.to_string();
                    panic_any(HttpError::with_cause(e, status, message));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn ok_values_pass_through() {
        let result: Result<u32, io::Error> = Ok(7);
        assert_eq!(must(result), 7);
    }

    #[test]
    fn generic_errors_panic_as_wrapped_http_errors() {
        let payload = catch_unwind(AssertUnwindSafe(|| {
            let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "disk offline"));
            must(result)
        }))
        .unwrap_err();

        let err = payload.downcast_ref::<HttpError>().expect("payload should be an HttpError");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "disk offline");
        assert!(std::error::Error::source(err).is_some());
    }

    #[test]
    fn typed_errors_keep_their_own_status() {
        let payload = catch_unwind(AssertUnwindSafe(|| {
            let result: Result<(), HttpError> = Err(HttpError::new(StatusCode::NOT_FOUND, "not found"));
            must_status(result, StatusCode::BAD_REQUEST)
        }))
        .unwrap_err();

        let err = payload.downcast_ref::<HttpError>().expect("payload should be an HttpError");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "not found");
    }
}
