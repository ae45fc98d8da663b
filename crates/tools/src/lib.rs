//! Request, response and body plumbing for the parapet toolkit.
//!
//! This crate carries the pieces a host HTTP server and the recovery
//! middleware both build on: the [`ResponseWriter`] sink abstraction, the
//! response [`Builder`], body payload types, the [`Handler`] seam and
//! request helpers.

mod handler;
mod request;
mod response;
mod sink;

pub mod body;

pub use handler::{FnHandler, Handler, HandlerFn, StaticHandler, handler_fn};
pub use request::{BuildError, RequestBuilder, RequestReader};
pub use response::Builder;
pub use sink::{BufferedResponse, ResponseWriter, WriteError};
