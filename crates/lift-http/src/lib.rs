//! lift-http — the normalized HTTP model.
//!
//! Every invocation, whatever event shape it arrived in, is reduced to a
//! [`Request`] before it reaches the application, and every application
//! produces a [`Response`] that the wire codec turns back into the shape
//! the originating trigger expects.
//!
//! # Model
//!
//! ```text
//! Request
//!   ├── method, path
//!   ├── HeaderMap     ordered (name, value) pairs, duplicates allowed
//!   ├── QueryParams   ordered (key, value) pairs, duplicates allowed
//!   └── body          raw bytes
//!
//! Response
//!   ├── status
//!   ├── HeaderMap     set order preserved
//!   └── body          raw bytes
//! ```
//!
//! Both multimaps keep every value in declaration order. Collapsing to a
//! single value (headers) or to bracket-structured maps (query parameters) is
//! a view computed on demand, never a lossy step at decode time.
//!
//! The [`Application`] trait is the only contract between the runtime and
//! the code that actually serves traffic.

mod app;
mod error;
mod header;
mod query;
mod request;
mod response;

pub use app::{handler_fn, AppFuture, Application, HandlerFn, SharedApplication};
pub use error::{AppError, AppResult};
pub use header::{Header, HeaderMap};
pub use query::{QueryParams, QueryValue};
pub use request::Request;
pub use response::Response;
