//! The outbound side of a request: a byte-oriented, header-settable,
//! status-settable response channel.
//!
//! Hosts adapt their connection type to [`ResponseWriter`]; everything in this
//! workspace writes responses exclusively through it. [`BufferedResponse`] is
//! the in-memory implementation used by tests and by hosts which frame the
//! response themselves.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("status line already written")]
    StatusAlreadyWritten,

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl WriteError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// A response channel in wire order: headers are staged, the status line is
/// written exactly once, body bytes follow.
pub trait ResponseWriter: Send {
    /// Returns the staged response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Writes the status line along with the staged headers.
    ///
    /// A second call is an error: the status can only leave once.
    fn write_status(&mut self, status: StatusCode) -> Result<(), WriteError>;

    /// Appends a chunk of body bytes.
    fn write_body(&mut self, data: &[u8]) -> Result<(), WriteError>;
}

/// A [`ResponseWriter`] which accumulates the response in memory.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the accumulated state into a response, defaulting to 200
    /// when no status was written.
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) -> Result<(), WriteError> {
        if self.status.is_some() {
            return Err(WriteError::StatusAlreadyWritten);
        }
        self.status = Some(status);
        Ok(())
    }

    fn write_body(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.body.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_written_once() {
        let mut w = BufferedResponse::new();
        assert!(w.write_status(StatusCode::OK).is_ok());
        assert!(matches!(w.write_status(StatusCode::NOT_FOUND), Err(WriteError::StatusAlreadyWritten)));
        assert_eq!(w.status(), Some(StatusCode::OK));
    }

    #[test]
    fn body_accumulates_chunks() {
        let mut w = BufferedResponse::new();
        w.write_body(b"hello ").unwrap();
        w.write_body(b"world").unwrap();
        assert_eq!(w.body(), b"hello world");
    }

    #[test]
    fn into_response_defaults_to_ok() {
        let mut w = BufferedResponse::new();
        w.write_body(b"data").unwrap();
        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"data");
    }

    #[test]
    fn into_response_keeps_written_state() {
        let mut w = BufferedResponse::new();
        w.headers_mut().insert(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());
        w.write_status(StatusCode::BAD_REQUEST).unwrap();
        w.write_body(b"bad input").unwrap();

        let response = w.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.body().as_ref(), b"bad input");
    }
}
