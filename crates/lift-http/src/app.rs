//! The application boundary.
//!
//! The runtime knows nothing about how a request is served. It hands a
//! [`Request`] to an [`Application`] and awaits a [`Response`]; the call
//! may be in-process, a forward to a local socket, or anything else.
//!
//! The returned future must be `'static` and `Send` because the runtime
//! drives it on its own task so the deadline watchdog can abort it.
//!
//! Aborting only takes effect at an `.await`. A handler that blocks its
//! thread (`std::thread::sleep`, synchronous file or socket I/O) still
//! gets its 500 on time, but keeps running and holds a runtime worker
//! until it returns. Blocking work belongs in
//! `tokio::task::spawn_blocking`; on expiry only the await on it is
//! cancelled, the blocking closure runs to completion.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::AppResult;
use crate::request::Request;
use crate::response::Response;

/// Boxed future returned by [`Application::handle`].
pub type AppFuture = Pin<Box<dyn Future<Output = AppResult<Response>> + Send>>;

/// Something that turns a normalized request into a normalized response.
///
/// Implementations must not block the calling thread; see the module docs.
pub trait Application: Send + Sync + 'static {
    fn handle(&self, request: Request) -> AppFuture;
}

/// Shared, type-erased application handle.
pub type SharedApplication = Arc<dyn Application>;

impl<A: Application + ?Sized> Application for Arc<A> {
    fn handle(&self, request: Request) -> AppFuture {
        (**self).handle(request)
    }
}

/// An [`Application`] backed by an async closure. See [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Adapt an async closure into an [`Application`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Response>> + Send + 'static,
{
    HandlerFn { f }
}

impl<F, Fut> Application for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Response>> + Send + 'static,
{
    fn handle(&self, request: Request) -> AppFuture {
        Box::pin((self.f)(request))
    }
}
