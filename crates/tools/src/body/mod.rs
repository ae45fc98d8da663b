//! Body payloads: values which know their content type and how to render
//! themselves into wire bytes, plus the decoding direction for inbound
//! payloads.

use bytes::Bytes;
use http::HeaderValue;
use serde::de::DeserializeOwned;
use thiserror::Error;

mod json;
mod raw;
mod urlencoded;

pub use json::Json;
pub use raw::Raw;
pub use urlencoded::Form;

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("body is not utf8")]
    NotUtf8,

    #[error("json error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("form encode error: {source}")]
    FormEncode {
        #[from]
        source: serde_urlencoded::ser::Error,
    },

    #[error("form decode error: {source}")]
    FormDecode {
        #[from]
        source: serde_urlencoded::de::Error,
    },
}

/// A response or request payload.
///
/// Rendering happens at write time so that staging a body is free and a
/// serialization failure surfaces before anything reaches the wire.
pub trait Body: Send + Sync {
    /// The content type advertised alongside this body, if any.
    fn content_type(&self) -> Option<HeaderValue>;

    /// Renders the body into its wire form.
    fn to_bytes(&self) -> Result<Bytes, BodyError>;
}

/// Decodes a JSON payload.
pub fn from_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, BodyError> {
    Ok(serde_json::from_slice(data)?)
}

/// Decodes an `application/x-www-form-urlencoded` payload.
pub fn from_form<T: DeserializeOwned>(data: &[u8]) -> Result<T, BodyError> {
    Ok(serde_urlencoded::from_bytes(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        name: String,
        zip: String,
    }

    #[test]
    fn json_round_trip() {
        let user = User { name: "hello".to_string(), zip: "world".to_string() };
        let body = Json::new(&user);

        assert_eq!(body.content_type().unwrap(), "application/json");

        let data = body.to_bytes().unwrap();
        let decoded: User = from_json(&data).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn json_pretty_is_indented() {
        let data = Json::pretty(&serde_json::json!({"a": 1})).to_bytes().unwrap();
        assert_eq!(data.as_ref(), b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn form_round_trip() {
        let user = User { name: "hello".to_string(), zip: "12 34".to_string() };
        let body = Form::new(&user);

        assert_eq!(body.content_type().unwrap(), "application/x-www-form-urlencoded");

        let data = body.to_bytes().unwrap();
        assert_eq!(data.as_ref(), b"name=hello&zip=12+34");

        let decoded: User = from_form(&data).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let result: Result<User, _> = from_json(b"{not json");
        assert!(matches!(result, Err(BodyError::Json { .. })));
    }

    #[test]
    fn raw_has_no_content_type() {
        assert!(Raw::new("data".to_string()).content_type().is_none());
    }

    #[test]
    fn raw_displays_text_or_hex() {
        assert_eq!(Raw::new("plain".to_string()).to_string(), "plain");
        assert_eq!(Raw::new(vec![0xde, 0xad, 0xbe, 0xef]).to_string(), "deadbeef");
    }
}
