//! Conversion of recovered panic payloads into typed errors.

use crate::HttpError;
use crate::stack::Stack;
use http::StatusCode;
use std::any::Any;
use std::error::Error;

/// What `catch_unwind` hands back when the downstream panicked.
pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// Converts a panic payload into an [`HttpError`].
///
/// Total by construction, so the recovery pipeline can never fail here.
/// In priority order:
///
/// - an [`HttpError`] payload is returned unchanged
/// - a `Box<dyn Error + Send + Sync>` payload becomes a 500 carrying the
///   error's message; the original is discarded
/// - anything else becomes a 500 with a `Panic: <text>` message
pub fn wrap(payload: PanicPayload, stack: &Stack) -> HttpError {
    wrap_policy(payload, stack, false)
}

/// Like [`wrap`], but a generic error is retained as the cause of the
/// produced error instead of being discarded.
pub fn wrap_with_cause(payload: PanicPayload, stack: &Stack) -> HttpError {
    wrap_policy(payload, stack, true)
}

fn wrap_policy(payload: PanicPayload, _stack: &Stack, keep_cause: bool) -> HttpError {
    let payload = match payload.downcast::<HttpError>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };

    let payload = match payload.downcast::<Box<dyn Error + Send + Sync>>() {
        Ok(err) => {
            let message = err.to_string();
            return if keep_cause {
                HttpError::with_cause(*err, StatusCode::INTERNAL_SERVER_ERROR, message)
            } else {
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            };
        }
        Err(payload) => payload,
    };

    let message = panic_message(&payload).unwrap_or("unknown panic payload");
    HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Panic: {message}"))
}

/// The textual content of a string panic payload, if it has one.
pub fn panic_message(payload: &PanicPayload) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Some(message.as_str())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn empty_stack() -> Stack {
        Stack::default()
    }

    #[test]
    fn typed_errors_pass_through_unchanged() {
        let payload: PanicPayload = Box::new(HttpError::new(StatusCode::NOT_FOUND, "not found"));

        let err = wrap(payload, &empty_stack());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "not found");
    }

    #[test]
    fn generic_errors_become_500_without_cause() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(io::Error::new(io::ErrorKind::Other, "disk offline"));
        let payload: PanicPayload = Box::new(boxed);

        let err = wrap(payload, &empty_stack());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "disk offline");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn cause_preserving_policy_keeps_the_original() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(io::Error::new(io::ErrorKind::Other, "disk offline"));
        let payload: PanicPayload = Box::new(boxed);

        let err = wrap_with_cause(payload, &empty_stack());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "disk offline");

        let source = std::error::Error::source(&err).expect("cause should be retained");
        assert_eq!(source.to_string(), "disk offline");
    }

    #[test]
    fn string_payloads_get_the_panic_prefix() {
        let payload: PanicPayload = Box::new("boom");
        let err = wrap(payload, &empty_stack());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Panic: boom");

        let payload: PanicPayload = Box::new("boom".to_string());
        let err = wrap(payload, &empty_stack());
        assert_eq!(err.message(), "Panic: boom");
    }

    #[test]
    fn opaque_payloads_still_produce_an_error() {
        let payload: PanicPayload = Box::new(42u32);
        let err = wrap(payload, &empty_stack());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Panic: unknown panic payload");
    }

    #[test]
    fn every_policy_yields_a_valid_http_status() {
        let payloads: Vec<PanicPayload> = vec![
            Box::new(HttpError::new(StatusCode::IM_A_TEAPOT, "teapot")),
            Box::new("boom"),
            Box::new(0u8),
        ];
        for payload in payloads {
            let status = wrap(payload, &empty_stack()).status_code();
            assert!((100..=599).contains(&status));
        }
    }
}
