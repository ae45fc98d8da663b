//! The logging collaborator invoked for every recovered panic.

use crate::HttpError;
use crate::stack::Stack;
use http::request::Parts;
use tracing::error;

/// Records a recovered error together with the request it belongs to and
/// the stack that produced it.
///
/// Implementations must tolerate concurrent invocation from independent
/// requests. They should not panic; the middleware swallows a panicking
/// logger, at the price of the lost entry.
pub trait ErrorLogger: Send + Sync {
    fn log(&self, req: &Parts, err: &HttpError, stack: &Stack);
}

/// The default logger: one structured error event per recovery, followed by
/// the raw stack text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log(&self, req: &Parts, err: &HttpError, stack: &Stack) {
        error!(method = %req.method, uri = %req.uri, code = err.status_code(), "{err}");
        error!("{}", stack.raw_str());
    }
}

/// A logger which does nothing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLogger;

impl ErrorLogger for NoOpLogger {
    fn log(&self, _req: &Parts, _err: &HttpError, _stack: &Stack) {}
}

struct FnLogger<F>(F);

impl<F> ErrorLogger for FnLogger<F>
where
    F: Fn(&Parts, &HttpError, &Stack) + Send + Sync,
{
    fn log(&self, req: &Parts, err: &HttpError, stack: &Stack) {
        (self.0)(req, err, stack)
    }
}

pub fn logger_fn<F>(f: F) -> impl ErrorLogger
where
    F: Fn(&Parts, &HttpError, &Stack) + Send + Sync,
{
    FnLogger(f)
}
