//! Serialization of a typed error into an outbound HTTP response.

use crate::HttpError;
use parapet_tools::{Builder, ResponseWriter, WriteError};
use serde_json::Value;

/// Writes an [`HttpError`] to a response sink.
///
/// A sink fault is returned to the caller; past that point the response
/// channel is considered unusable and nothing retries.
pub trait ErrorWriter: Send + Sync {
    fn write(&self, err: &HttpError, w: &mut dyn ResponseWriter) -> Result<(), WriteError>;
}

/// Plain-text policy: the error's status, `Content-Type: text/plain` and
/// the message verbatim as the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextWriter;

impl ErrorWriter for TextWriter {
    fn write(&self, err: &HttpError, w: &mut dyn ResponseWriter) -> Result<(), WriteError> {
        Builder::new()
            .status(err.status())
            .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref().parse().unwrap())
            .raw_body(err.message().to_owned())
            .write(w)
    }
}

/// Structured policy: the error's status and a JSON body.
///
/// By default the body is the error's wire form, for example:
///
/// ```json
/// {"message": "not found", "code": 404}
/// ```
///
/// A payload transform can substitute a richer document; the status code is
/// preserved regardless of what the transform returns.
#[derive(Default)]
pub struct JsonWriter {
    payload: Option<Box<dyn Fn(&HttpError) -> Value + Send + Sync>>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { payload: None }
    }

    /// A writer which serializes `f(err)` instead of the error itself.
    pub fn with_payload<F>(f: F) -> Self
    where
        F: Fn(&HttpError) -> Value + Send + Sync + 'static,
    {
        Self { payload: Some(Box::new(f)) }
    }
}

impl ErrorWriter for JsonWriter {
    fn write(&self, err: &HttpError, w: &mut dyn ResponseWriter) -> Result<(), WriteError> {
        match &self.payload {
            Some(payload) => Builder::new().status(err.status()).json_body(payload(err)).write(w),
            None => {
                let data = match serde_json::to_vec(err) {
                    Ok(data) => data,
                    Err(e) => return Err(WriteError::invalid_body(e)),
                };
                Builder::new()
                    .status(err.status())
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref().parse().unwrap())
                    .raw_body(data)
                    .write(w)
            }
        }
    }
}

struct FnWriter<F>(F);

impl<F> ErrorWriter for FnWriter<F>
where
    F: Fn(&HttpError, &mut dyn ResponseWriter) -> Result<(), WriteError> + Send + Sync,
{
    fn write(&self, err: &HttpError, w: &mut dyn ResponseWriter) -> Result<(), WriteError> {
        (self.0)(err, w)
    }
}

pub fn writer_fn<F>(f: F) -> impl ErrorWriter
where
    F: Fn(&HttpError, &mut dyn ResponseWriter) -> Result<(), WriteError> + Send + Sync,
{
    FnWriter(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use parapet_tools::BufferedResponse;

    #[test]
    fn text_writer_emits_the_message_verbatim() {
        let err = HttpError::new(StatusCode::BAD_REQUEST, "bad input");
        let mut w = BufferedResponse::new();
        TextWriter.write(&err, &mut w).unwrap();

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(w.headers()[http::header::CONTENT_TYPE], "text/plain");
        assert_eq!(w.body(), b"bad input");
    }

    #[test]
    fn json_writer_emits_the_wire_form() {
        let err = HttpError::new(StatusCode::NOT_FOUND, "not found");
        let mut w = BufferedResponse::new();
        JsonWriter::new().write(&err, &mut w).unwrap();

        assert_eq!(w.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(w.headers()[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(w.body(), br#"{"message":"not found","code":404}"#);
    }

    #[test]
    fn payload_transform_replaces_the_body_but_not_the_status() {
        let err = HttpError::new(StatusCode::CONFLICT, "already exists");
        let writer = JsonWriter::with_payload(|err| {
            serde_json::json!({"error": {"detail": err.message(), "status": err.status_code()}})
        });

        let mut w = BufferedResponse::new();
        writer.write(&err, &mut w).unwrap();

        assert_eq!(w.status(), Some(StatusCode::CONFLICT));
        let value: Value = serde_json::from_slice(w.body()).unwrap();
        assert_eq!(value["error"]["detail"], "already exists");
        assert_eq!(value["error"]["status"], 409);
    }

    #[test]
    fn sink_faults_are_returned_to_the_caller() {
        struct ClosedSink(http::HeaderMap);
        impl ResponseWriter for ClosedSink {
            fn headers_mut(&mut self) -> &mut http::HeaderMap {
                &mut self.0
            }
            fn write_status(&mut self, _status: StatusCode) -> Result<(), WriteError> {
                Err(WriteError::io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)))
            }
            fn write_body(&mut self, _data: &[u8]) -> Result<(), WriteError> {
                Err(WriteError::io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)))
            }
        }

        let err = HttpError::new(StatusCode::NOT_FOUND, "not found");
        let mut w = ClosedSink(http::HeaderMap::new());
        assert!(JsonWriter::new().write(&err, &mut w).is_err());
    }
}
