//! A single invocation and what became of it.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::client::NextInvocation;

/// One unit of work fetched from the Runtime API.
///
/// The deadline is fixed when the invocation is received and never moves.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: String,
    pub payload: Bytes,
    pub deadline: Instant,
    pub trace_id: Option<String>,
    pub invoked_function_arn: Option<String>,
    /// Platform deadline in epoch milliseconds, when advertised.
    pub platform_deadline_ms: Option<u64>,
}

impl Invocation {
    pub fn new(next: NextInvocation, max_execution_time: Duration) -> Self {
        Self {
            id: next.request_id,
            payload: next.body,
            deadline: Instant::now() + max_execution_time,
            trace_id: next.trace_id,
            invoked_function_arn: next.invoked_function_arn,
            platform_deadline_ms: next.deadline_ms,
        }
    }
}

/// Terminal state of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The application's response was posted.
    Responded,
    /// The watchdog expired; a synthetic 500 was posted.
    TimedOut,
    /// The response was too large or unrepresentable; a synthetic 500 was posted.
    Rejected,
    /// The application returned an error; a synthetic 500 was posted.
    ApplicationFailed,
    /// The event could not be decoded but had a recognizable shape; a
    /// synthetic 500 was posted.
    MalformedEvent,
    /// No proxy response could be produced; an error report was posted.
    Errored,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Responded => "responded",
            Self::TimedOut => "timed_out",
            Self::Rejected => "rejected",
            Self::ApplicationFailed => "application_failed",
            Self::MalformedEvent => "malformed_event",
            Self::Errored => "errored",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub request_id: String,
    pub disposition: Disposition,
    /// Status code of the posted proxy response, if one was posted.
    pub status: Option<u16>,
    /// The line written to the diagnostic stream, if any.
    pub diagnostic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_fixed_at_creation() {
        let start = Instant::now();
        let mut next = NextInvocation::new("req-1", "{}");
        next.trace_id = Some("Root=1".into());
        let invocation = Invocation::new(next, Duration::from_secs(5));

        assert_eq!(invocation.id, "req-1");
        assert_eq!(invocation.trace_id.as_deref(), Some("Root=1"));
        assert_eq!(invocation.deadline, start + Duration::from_secs(5));
    }

    #[test]
    fn disposition_display() {
        assert_eq!(Disposition::TimedOut.to_string(), "timed_out");
        assert_eq!(Disposition::Responded.as_str(), "responded");
    }
}
