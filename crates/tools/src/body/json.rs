use super::{Body, BodyError};
use bytes::Bytes;
use http::HeaderValue;
use serde::Serialize;

/// A JSON payload, serialized from `value` when the body is rendered.
#[derive(Debug)]
pub struct Json<T> {
    value: T,
    pretty: bool,
}

impl<T: Serialize> Json<T> {
    pub fn new(value: T) -> Self {
        Self { value, pretty: false }
    }

    /// Same as [`Json::new`] but renders indented output.
    pub fn pretty(value: T) -> Self {
        Self { value, pretty: true }
    }
}

impl<T: Serialize + Send + Sync> Body for Json<T> {
    fn content_type(&self) -> Option<HeaderValue> {
        Some(mime::APPLICATION_JSON.as_ref().parse().unwrap())
    }

    fn to_bytes(&self) -> Result<Bytes, BodyError> {
        let data = if self.pretty {
            serde_json::to_vec_pretty(&self.value)?
        } else {
            serde_json::to_vec(&self.value)?
        };
        Ok(Bytes::from(data))
    }
}
