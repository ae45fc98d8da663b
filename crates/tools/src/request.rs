//! Request construction and reading helpers.
//!
//! [`RequestBuilder`] assembles `http::Request` values with body-aware
//! construction (the body's content type is staged automatically), which is
//! what handler tests and canned clients mostly need. [`RequestReader`]
//! borrows a request and decodes its payload.

use crate::body::{self, Body, BodyError};
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, Request, header};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid request: {source}")]
    Http {
        #[from]
        source: http::Error,
    },

    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },
}

/// Builds an `http::Request<Bytes>` with a convenient API.
pub struct RequestBuilder {
    inner: http::request::Builder,
    body: Option<Box<dyn Body>>,
}

impl RequestBuilder {
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self { inner: Request::builder().method(method).uri(uri.as_ref()), body: None }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    /// Sets an `Authorization: Bearer <token>` header.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.inner = self.inner.header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    /// Sets the request body. Its content type is applied at build time
    /// unless a content type was set explicitly.
    pub fn body(mut self, body: impl Body + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn build(self) -> Result<Request<Bytes>, BuildError> {
        let (payload, content_type) = match &self.body {
            Some(body) => (body.to_bytes()?, body.content_type()),
            None => (Bytes::new(), None),
        };

        let mut inner = self.inner;
        if let Some(content_type) = content_type {
            let already_set = inner.headers_ref().is_some_and(|h| h.contains_key(header::CONTENT_TYPE));
            if !already_set {
                inner = inner.header(header::CONTENT_TYPE, content_type);
            }
        }

        Ok(inner.body(payload)?)
    }
}

/// Borrows a request and decodes its body.
#[derive(Debug)]
pub struct RequestReader<'a> {
    req: &'a Request<Bytes>,
}

impl<'a> RequestReader<'a> {
    pub fn new(req: &'a Request<Bytes>) -> Self {
        Self { req }
    }

    pub fn bytes(&self) -> &'a Bytes {
        self.req.body()
    }

    pub fn text(&self) -> Result<&'a str, BodyError> {
        match std::str::from_utf8(self.req.body()) {
            Ok(text) => Ok(text),
            Err(_) => Err(BodyError::NotUtf8),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        body::from_json(self.req.body())
    }

    pub fn form<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        body::from_form(self.req.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Form, Json};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        name: String,
        zip: String,
    }

    #[test]
    fn builds_request_with_json_body() {
        let user = User { name: "hello".to_string(), zip: "world".to_string() };
        let req = RequestBuilder::new(Method::POST, "http://localhost/users")
            .body(Json::new(user))
            .build()
            .unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().path(), "/users");
        assert_eq!(req.headers()[header::CONTENT_TYPE], "application/json");

        let decoded: User = RequestReader::new(&req).json().unwrap();
        assert_eq!(decoded.name, "hello");
    }

    #[test]
    fn explicit_content_type_wins_over_body() {
        let req = RequestBuilder::new(Method::POST, "http://localhost/")
            .header(header::CONTENT_TYPE, "application/vnd.custom+json".parse().unwrap())
            .body(Json::new(serde_json::json!({})))
            .build()
            .unwrap();

        let values: Vec<_> = req.headers().get_all(header::CONTENT_TYPE).iter().collect();
        assert_eq!(values, ["application/vnd.custom+json"]);
    }

    #[test]
    fn bearer_auth_sets_authorization() {
        let req = RequestBuilder::new(Method::GET, "http://localhost/").bearer_auth("s3cret").build().unwrap();
        assert_eq!(req.headers()[header::AUTHORIZATION], "Bearer s3cret");
    }

    #[test]
    fn invalid_uri_surfaces_at_build() {
        let result = RequestBuilder::new(Method::GET, "not a uri").build();
        assert!(matches!(result, Err(BuildError::Http { .. })));
    }

    #[test]
    fn reader_decodes_form_and_text() {
        let req = RequestBuilder::new(Method::POST, "http://localhost/")
            .body(Form::new(User { name: "hello".to_string(), zip: "world".to_string() }))
            .build()
            .unwrap();

        let reader = RequestReader::new(&req);
        assert_eq!(reader.text().unwrap(), "name=hello&zip=world");

        let decoded: User = reader.form().unwrap();
        assert_eq!(decoded.zip, "world");
    }
}
