//! Panic recovery for HTTP services.
//!
//! This crate turns a panic raised anywhere in a request-handling call chain
//! into a logged, typed, well-formed HTTP error response — without ever
//! crashing the serving process or leaking a half-written response.
//!
//! The pieces, bottom up:
//!
//! - [`stack`]: parses a textual stack dump into threads and frames, and
//!   captures the current backtrace in that shape at recovery time
//! - [`HttpError`]: a status-coded, serializable error value with an
//!   optional internal cause
//! - [`wrap`] / [`wrap_with_cause`]: total conversion of any panic payload
//!   into an [`HttpError`]
//! - [`log`]: the logging collaborator invoked for every recovery
//! - [`write`]: serialization policies for the outbound error response
//! - [`Recovery`]: the middleware tying it all together around a
//!   [`parapet_tools::Handler`]
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::Request;
//! use parapet_recover::Recovery;
//! use parapet_recover::write::JsonWriter;
//! use parapet_tools::{BufferedResponse, Handler, ResponseWriter, handler_fn};
//!
//! async fn flaky(_req: Request<Bytes>, _w: &mut dyn ResponseWriter) {
//!     panic!("boom");
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Recovery::new(handler_fn(flaky), JsonWriter::new());
//!
//!     let mut sink = BufferedResponse::new();
//!     app.handle(Request::new(Bytes::new()), &mut sink).await;
//!
//!     // 500 {"message":"Panic: boom","code":500}
//!     println!("{:?}", sink.into_response());
//! }
//! ```

mod error;
mod must;
mod recover;
mod wrap;

pub mod log;
pub mod stack;
pub mod write;

pub use error::HttpError;
pub use must::{must, must_status};
pub use recover::{
    CausePreservingWrapper, DefaultWrapper, PanicWrapper, Recovery, context_wrapper_fn, wrapper_fn,
};
pub use stack::Stack;
pub use wrap::{PanicPayload, panic_message, wrap, wrap_with_cause};
