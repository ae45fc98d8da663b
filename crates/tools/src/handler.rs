//! The handler seam: the downstream side a host server drives and the
//! recovery middleware wraps.

use crate::body::{Body, BodyError};
use crate::response::Builder;
use crate::sink::ResponseWriter;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use std::future::Future;

/// An HTTP request handler.
///
/// A handler owns its request and writes its response through the
/// [`ResponseWriter`]. It is opaque to the rest of the stack apart from one
/// capability: it may panic, and the recovery middleware upstream converts
/// that panic into an error response.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: Request<Bytes>, w: &mut dyn ResponseWriter);
}

/// Abstracts over async functions usable as handlers.
///
/// The per-lifetime indirection lets a plain `async fn` borrow the response
/// writer for the duration of its returned future.
pub trait HandlerFn<'a>: Send + Sync {
    type Fut: Future<Output = ()> + Send + 'a;

    fn call(&self, req: Request<Bytes>, w: &'a mut dyn ResponseWriter) -> Self::Fut;
}

impl<'a, F, Fut> HandlerFn<'a> for F
where
    F: Fn(Request<Bytes>, &'a mut dyn ResponseWriter) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'a,
{
    type Fut = Fut;

    fn call(&self, req: Request<Bytes>, w: &'a mut dyn ResponseWriter) -> Fut {
        self(req, w)
    }
}

/// A [`HandlerFn`] holder which represents any matching async fn.
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> HandlerFn<'a>,
{
    FnHandler { f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: for<'a> HandlerFn<'a>,
{
    async fn handle(&self, req: Request<Bytes>, w: &mut dyn ResponseWriter) {
        self.f.call(req, w).await
    }
}

/// A handler which writes the same pre-rendered response to every request.
pub struct StaticHandler {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StaticHandler {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Renders `body` once, up front; the bytes are replayed on every
    /// request. The body's content type is captured alongside.
    pub fn body(mut self, body: &dyn Body) -> Result<Self, BodyError> {
        self.body = body.to_bytes()?;
        if let Some(content_type) = body.content_type() {
            self.headers.insert(http::header::CONTENT_TYPE, content_type);
        }
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[async_trait]
impl Handler for StaticHandler {
    async fn handle(&self, _req: Request<Bytes>, w: &mut dyn ResponseWriter) {
        let mut builder = Builder::new().status(self.status).headers(&self.headers);
        if !self.body.is_empty() {
            builder = builder.raw_body(self.body.clone());
        }
        // Write faults escalate through the panic boundary, like any other
        // handler failure.
        builder.must_write(w);
    }
}
