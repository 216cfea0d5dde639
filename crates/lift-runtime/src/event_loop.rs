//! The invocation loop.
//!
//! ```text
//!   ┌─▶ next_invocation ──▶ parse ──▶ decode ──▶ spawn app ──▶ supervise
//!   │                         │         │                       │
//!   │                  not JSON│   bad  │              Finished / Expired
//!   │                         ▼  fields ▼                       ▼
//!   │                  ErrorReport   synthetic 500       encode ─▶ validate
//!   │                         │         │                       │
//!   └──── post_error ◀────────┘         └──▶ post_response ◀────┘
//! ```
//!
//! Strictly one invocation at a time: the next event is not requested
//! until the previous invocation's result has been posted. A failure in
//! one invocation never stops the loop.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

use lift_event::{DecodedEvent, EventShape, ResponseValidator, decode, encode, parse, shape_of};
use lift_http::{Application, Response, SharedApplication};

use crate::client::{ErrorReport, NextInvocation, RuntimeApi};
use crate::config::RuntimeConfig;
use crate::error::{ClientError, ClientResult, InvocationError};
use crate::invocation::{Disposition, Invocation, InvocationOutcome};
use crate::watchdog::{Supervised, Watchdog};

/// Target of the diagnostic stream (timeouts and rejected responses).
pub const DIAGNOSTIC_TARGET: &str = "lift::diagnostic";

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

enum Reply {
    Response(Bytes),
    Error(ErrorReport),
}

/// Polls the Runtime API and drives each invocation through the
/// application.
pub struct InvocationLoop<C> {
    client: C,
    app: SharedApplication,
    max_execution_time: Duration,
    validator: ResponseValidator,
}

impl<C: RuntimeApi> InvocationLoop<C> {
    pub fn new(client: C, app: SharedApplication, config: &RuntimeConfig) -> Self {
        Self {
            client,
            app,
            max_execution_time: config.max_execution_time,
            validator: ResponseValidator::with_defaults(),
        }
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Shutdown is only observed between invocations or while waiting for
    /// the next one; an invocation in flight is always finished and posted.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            max_execution_time_ms = self.max_execution_time.as_millis() as u64,
            "invocation loop started"
        );
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if *shutdown.borrow() {
                break;
            }
            let next = tokio::select! {
                next = self.client.next_invocation() => next,
                _ = shutdown.changed() => break,
            };

            match next {
                Ok(next) => {
                    backoff = INITIAL_BACKOFF;
                    if let Err(e) = self.handle(next).await {
                        error!(error = %e, "failed to post invocation result");
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "polling next invocation failed"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = shutdown.changed() => break,
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }

        info!("invocation loop stopped");
    }

    /// Poll exactly one invocation and post its result.
    pub async fn handle_next(&self) -> ClientResult<InvocationOutcome> {
        let next = self.client.next_invocation().await?;
        self.handle(next).await
    }

    /// Process an already-fetched invocation and post its result.
    pub async fn handle(&self, next: NextInvocation) -> ClientResult<InvocationOutcome> {
        let invocation = Invocation::new(next, self.max_execution_time);
        let span = info_span!(
            "invocation",
            request_id = %invocation.id,
            trace_id = invocation.trace_id.as_deref().unwrap_or_default(),
        );

        async {
            let started = Instant::now();
            let (reply, outcome) = self.process(&invocation).await;
            match reply {
                Reply::Response(payload) => {
                    self.client.post_response(&invocation.id, payload).await?
                }
                Reply::Error(report) => self.client.post_error(&invocation.id, &report).await?,
            }
            info!(
                disposition = %outcome.disposition,
                status = outcome.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "invocation finished"
            );
            Ok::<_, ClientError>(outcome)
        }
        .instrument(span)
        .await
    }

    async fn process(&self, invocation: &Invocation) -> (Reply, InvocationOutcome) {
        let id = invocation.id.clone();

        let event = match parse(&invocation.payload) {
            Ok(event) => event,
            Err(e) => return self.report(id, e.into()),
        };
        let DecodedEvent { request, shape } = match decode(&event) {
            Ok(decoded) => decoded,
            Err(e) => {
                return match shape_of(&event) {
                    Some(shape) => self.fail(id, shape, Disposition::MalformedEvent, e.into()),
                    None => self.report(id, e.into()),
                };
            }
        };

        debug!(method = request.method(), path = request.path(), "dispatching");
        let app = self.app.clone();
        let task = tokio::spawn(async move { app.handle(request).await });

        let mut watchdog = Watchdog::new();
        match watchdog.supervise(invocation.deadline, task).await {
            Supervised::Finished(Ok(response)) => self.respond(id, response, shape),
            Supervised::Finished(Err(e)) => {
                self.fail(id, shape, Disposition::ApplicationFailed, e.into())
            }
            Supervised::Panicked(message) => {
                self.report(id, InvocationError::ApplicationPanic(message))
            }
            Supervised::Expired => {
                let err = InvocationError::ExecutionTimeout {
                    seconds: self.max_execution_time.as_secs_f64(),
                };
                self.fail(id, shape, Disposition::TimedOut, err)
            }
        }
    }

    fn respond(&self, id: String, response: Response, shape: EventShape) -> (Reply, InvocationOutcome) {
        let payload = match encode(&response, shape).to_vec() {
            Ok(payload) => payload,
            Err(e) => return self.report(id, e.into()),
        };
        if let Err(rejection) = self.validator.check(&response, &payload, shape) {
            return self.fail(id, shape, Disposition::Rejected, rejection.into());
        }
        let outcome = InvocationOutcome {
            request_id: id,
            disposition: Disposition::Responded,
            status: Some(response.status()),
            diagnostic: None,
        };
        (Reply::Response(Bytes::from(payload)), outcome)
    }

    /// Answer with an empty 500 in the invocation's response shape.
    fn fail(
        &self,
        id: String,
        shape: EventShape,
        disposition: Disposition,
        err: InvocationError,
    ) -> (Reply, InvocationOutcome) {
        let diagnostic = log_failure(&err);
        match encode(&Response::empty(500), shape).to_vec() {
            Ok(payload) => {
                let outcome = InvocationOutcome {
                    request_id: id,
                    disposition,
                    status: Some(500),
                    diagnostic,
                };
                (Reply::Response(Bytes::from(payload)), outcome)
            }
            Err(e) => self.report(id, e.into()),
        }
    }

    /// Answer with an invocation error report; no proxy response exists.
    fn report(&self, id: String, err: InvocationError) -> (Reply, InvocationOutcome) {
        let diagnostic = log_failure(&err);
        let report = ErrorReport::new(err.error_type(), err.to_string());
        let outcome = InvocationOutcome {
            request_id: id,
            disposition: Disposition::Errored,
            status: None,
            diagnostic,
        };
        (Reply::Error(report), outcome)
    }
}

fn log_failure(err: &InvocationError) -> Option<String> {
    if err.is_diagnostic() {
        let line = err.to_string();
        warn!(target: DIAGNOSTIC_TARGET, "{line}");
        Some(line)
    } else {
        error!(error = %err, error_type = err.error_type(), "invocation failed");
        None
    }
}
