//! Response staging: collect status, headers and a body, then emit them to a
//! [`ResponseWriter`] in wire order.

use crate::body::{Body, Json, Raw};
use crate::sink::{ResponseWriter, WriteError};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use std::error::Error;
use std::panic::panic_any;

/// Stages an HTTP response before writing it.
///
/// A fresh builder is a `200 OK` with no headers and no body. Setting a body
/// also stages its content type; a later explicit [`Builder::header`] call
/// overrides it.
pub struct Builder {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Box<dyn Body>>,
}

impl Builder {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: None }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merges every header of `headers` into the staged set.
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn body(mut self, body: impl Body + 'static) -> Self {
        if let Some(content_type) = body.content_type() {
            self.headers.insert(http::header::CONTENT_TYPE, content_type);
        }
        self.body = Some(Box::new(body));
        self
    }

    /// Stages a raw text or byte body.
    pub fn raw_body(self, data: impl Into<Bytes>) -> Self {
        self.body(Raw::new(data))
    }

    /// Stages `value` serialized as JSON.
    pub fn json_body<T: Serialize + Send + Sync + 'static>(self, value: T) -> Self {
        self.body(Json::new(value))
    }

    /// Writes the staged response to `w`: status, then headers, then body.
    ///
    /// The body is rendered before the sink is touched, so a serialization
    /// failure never leaves a half-written response behind.
    pub fn write(&self, w: &mut dyn ResponseWriter) -> Result<(), WriteError> {
        let payload = match &self.body {
            Some(body) => match body.to_bytes() {
                Ok(payload) => Some(payload),
                Err(e) => return Err(WriteError::invalid_body(e)),
            },
            None => None,
        };

        for (name, value) in &self.headers {
            w.headers_mut().insert(name.clone(), value.clone());
        }
        w.write_status(self.status)?;

        if let Some(payload) = payload {
            w.write_body(&payload)?;
        }
        Ok(())
    }

    /// Writes the staged response or panics with the boxed [`WriteError`],
    /// handing the failure to the recovery boundary upstream.
    pub fn must_write(&self, w: &mut dyn ResponseWriter) {
        if let Err(err) = self.write(w) {
            let err: Box<dyn Error + Send + Sync> = Box::new(err);
            panic_any(err);
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
