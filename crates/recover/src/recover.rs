//! The recovery boundary: a handler decorator which converts a panic from
//! the downstream handler into a logged, typed, serialized error response.
//!
//! Whatever the downstream throws, the client receives a well-formed HTTP
//! response and the serving process keeps running. The three recovery steps
//! (wrap, log, write) are independently substitutable strategies; the
//! orchestration itself is fixed: capture → parse → wrap → log → write.

use crate::HttpError;
use crate::log::{ErrorLogger, TracingLogger};
use crate::stack::Stack;
use crate::wrap::{self, PanicPayload};
use crate::write::ErrorWriter;
use async_trait::async_trait;
use bytes::Bytes;
use futures::FutureExt;
use http::Request;
use http::request::Parts;
use parapet_tools::{Handler, ResponseWriter};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::error;

/// Converts a panic payload into an [`HttpError`], with the request's
/// metadata available for context-aware policies.
pub trait PanicWrapper: Send + Sync {
    fn wrap(&self, req: &Parts, payload: PanicPayload, stack: &Stack) -> HttpError;
}

/// The default policy, [`wrap`](crate::wrap::wrap): typed errors pass
/// through, generic errors become a 500 and lose their cause.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWrapper;

impl PanicWrapper for DefaultWrapper {
    fn wrap(&self, _req: &Parts, payload: PanicPayload, stack: &Stack) -> HttpError {
        wrap::wrap(payload, stack)
    }
}

/// The cause-retaining policy,
/// [`wrap_with_cause`](crate::wrap::wrap_with_cause): like the default, but
/// a generic error stays reachable through the produced error's chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct CausePreservingWrapper;

impl PanicWrapper for CausePreservingWrapper {
    fn wrap(&self, _req: &Parts, payload: PanicPayload, stack: &Stack) -> HttpError {
        wrap::wrap_with_cause(payload, stack)
    }
}

struct FnWrapper<F>(F);

impl<F> PanicWrapper for FnWrapper<F>
where
    F: Fn(PanicPayload, &Stack) -> HttpError + Send + Sync,
{
    fn wrap(&self, _req: &Parts, payload: PanicPayload, stack: &Stack) -> HttpError {
        (self.0)(payload, stack)
    }
}

/// Adapts a context-free wrapping function.
pub fn wrapper_fn<F>(f: F) -> impl PanicWrapper
where
    F: Fn(PanicPayload, &Stack) -> HttpError + Send + Sync,
{
    FnWrapper(f)
}

struct ContextFnWrapper<F>(F);

impl<F> PanicWrapper for ContextFnWrapper<F>
where
    F: Fn(&Parts, PanicPayload, &Stack) -> HttpError + Send + Sync,
{
    fn wrap(&self, req: &Parts, payload: PanicPayload, stack: &Stack) -> HttpError {
        (self.0)(req, payload, stack)
    }
}

/// Adapts a wrapping function which also inspects the request metadata.
pub fn context_wrapper_fn<F>(f: F) -> impl PanicWrapper
where
    F: Fn(&Parts, PanicPayload, &Stack) -> HttpError + Send + Sync,
{
    ContextFnWrapper(f)
}

/// Wraps a [`Handler`] and guarantees that no panic escapes it.
///
/// On a normal return the middleware is transparent. On a panic it captures
/// and parses the stack, wraps the payload into an [`HttpError`], logs it,
/// and writes it to the response sink — in that order, so an operator can
/// pair every logged stack with the response the client received.
pub struct Recovery<H> {
    inner: H,
    wrapper: Box<dyn PanicWrapper>,
    logger: Box<dyn ErrorLogger>,
    writer: Box<dyn ErrorWriter>,
}

impl<H: Handler> Recovery<H> {
    /// Wraps `inner` with the given response writer, the default wrapper
    /// and the default tracing logger.
    pub fn new(inner: H, writer: impl ErrorWriter + 'static) -> Self {
        Self {
            inner,
            wrapper: Box::new(DefaultWrapper),
            logger: Box::new(TracingLogger),
            writer: Box::new(writer),
        }
    }

    /// Wraps `inner` with explicit strategies for all three recovery steps.
    pub fn custom(
        inner: H,
        writer: impl ErrorWriter + 'static,
        wrapper: impl PanicWrapper + 'static,
        logger: impl ErrorLogger + 'static,
    ) -> Self {
        Self { inner, wrapper: Box::new(wrapper), logger: Box::new(logger), writer: Box::new(writer) }
    }

    pub fn with_wrapper(mut self, wrapper: impl PanicWrapper + 'static) -> Self {
        self.wrapper = Box::new(wrapper);
        self
    }

    pub fn with_logger(mut self, logger: impl ErrorLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }
}

#[async_trait]
impl<H: Handler> Handler for Recovery<H> {
    async fn handle(&self, req: Request<Bytes>, w: &mut dyn ResponseWriter) {
        let (parts, body) = req.into_parts();
        let meta = parts.clone();
        let req = Request::from_parts(parts, body);

        let outcome = AssertUnwindSafe(self.inner.handle(req, w)).catch_unwind().await;
        let Err(payload) = outcome else {
            return;
        };

        let stack = Stack::capture();

        // A panicking custom wrapper must not defeat recovery: its own
        // payload is routed through the default policy instead.
        let err = match catch_unwind(AssertUnwindSafe(|| self.wrapper.wrap(&meta, payload, &stack))) {
            Ok(err) => err,
            Err(secondary) => wrap::wrap(secondary, &stack),
        };

        // Log before writing, so the logged stack can be paired with the
        // response the client is about to receive.
        if catch_unwind(AssertUnwindSafe(|| self.logger.log(&meta, &err, &stack))).is_err() {
            error!("logger panicked while recording a recovered error");
        }

        match catch_unwind(AssertUnwindSafe(|| self.writer.write(&err, w))) {
            Ok(Ok(())) => {}
            Ok(Err(write_err)) => error!(cause = %write_err, "error writing error response"),
            Err(_) => error!("response writer panicked while writing an error response"),
        }
    }
}
