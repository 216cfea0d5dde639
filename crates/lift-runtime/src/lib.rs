//! lift-runtime — the custom runtime invocation loop.
//!
//! Polls the Runtime API for events, turns each one into a request for
//! the hosted [`Application`](lift_http::Application), enforces the
//! execution deadline, and posts the encoded response back.
//!
//! # Architecture
//!
//! ```text
//! InvocationLoop<C: RuntimeApi>
//!   ├── C (HttpRuntimeApi in production, in-memory fake in tests)
//!   ├── SharedApplication (spawned per invocation)
//!   ├── Watchdog (one per invocation, aborts on deadline)
//!   └── ResponseValidator (per-trigger size and header checks)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod invocation;
pub mod watchdog;

pub use client::{ErrorReport, HttpRuntimeApi, NextInvocation, RuntimeApi};
pub use config::{DEFAULT_MAX_EXECUTION_TIME, RUNTIME_API_VERSION, RuntimeConfig};
pub use error::{ClientError, ClientResult, InvocationError, RuntimeError, RuntimeResult};
pub use event_loop::{DIAGNOSTIC_TARGET, InvocationLoop};
pub use invocation::{Disposition, Invocation, InvocationOutcome};
pub use watchdog::{Supervised, Watchdog, WatchdogState};

/// Report a startup failure through the init error endpoint.
///
/// Called at most once, before the first invocation is polled.
pub async fn report_init_error<C: RuntimeApi>(
    client: &C,
    error_type: &str,
    message: impl std::fmt::Display,
) -> ClientResult<()> {
    let report = ErrorReport::new(error_type, message.to_string());
    tracing::error!(error_type, message = %report.error_message, "initialization failed");
    client.post_init_error(&report).await
}
