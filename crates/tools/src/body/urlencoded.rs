use super::{Body, BodyError};
use bytes::Bytes;
use http::HeaderValue;
use serde::Serialize;

/// An `application/x-www-form-urlencoded` payload.
#[derive(Debug)]
pub struct Form<T> {
    value: T,
}

impl<T: Serialize> Form<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Serialize + Send + Sync> Body for Form<T> {
    fn content_type(&self) -> Option<HeaderValue> {
        Some(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref().parse().unwrap())
    }

    fn to_bytes(&self) -> Result<Bytes, BodyError> {
        Ok(Bytes::from(serde_urlencoded::to_string(&self.value)?))
    }
}
