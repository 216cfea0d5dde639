use lift_event::{MalformedEvent, Rejection};
use lift_http::AppError;
use thiserror::Error;

/// Failures talking to the Runtime API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid runtime API request: {0}")]
    Request(#[from] http::Error),

    #[error("runtime API unreachable: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read runtime API response: {0}")]
    Body(#[from] hyper::Error),

    #[error("runtime API returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("next invocation is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Why a single invocation did not produce the application's response.
///
/// Every variant maps to either a synthetic 500 proxy response or an
/// invocation error report; none of them stop the loop.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] MalformedEvent),

    #[error("Application took longer than {seconds} seconds to return response")]
    ExecutionTimeout { seconds: f64 },

    #[error(transparent)]
    OversizedResponse(#[from] Rejection),

    #[error("application error: {0}")]
    Application(#[from] AppError),

    #[error("application panicked: {0}")]
    ApplicationPanic(String),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl InvocationError {
    /// The `errorType` reported to the Runtime API.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "Runtime.MalformedEvent",
            Self::ExecutionTimeout { .. } => "Runtime.ExecutionTimeout",
            Self::OversizedResponse(_) => "Runtime.OversizedResponse",
            Self::Application(_) => "Runtime.ApplicationError",
            Self::ApplicationPanic(_) => "Runtime.ApplicationPanic",
            Self::Encode(_) => "Runtime.EncodeError",
        }
    }

    /// Failures that are surfaced on the diagnostic stream in addition to
    /// the regular logs.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::ExecutionTimeout { .. } | Self::OversizedResponse(_)
        )
    }
}

/// Startup failures, reported once through the init error endpoint.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lift_event::TriggerKind;

    #[test]
    fn timeout_message_uses_whole_seconds() {
        let err = InvocationError::ExecutionTimeout { seconds: 5.0 };
        assert_eq!(
            err.to_string(),
            "Application took longer than 5 seconds to return response"
        );
    }

    #[test]
    fn timeout_message_keeps_fractions() {
        let err = InvocationError::ExecutionTimeout { seconds: 0.5 };
        assert_eq!(
            err.to_string(),
            "Application took longer than 0.5 seconds to return response"
        );
    }

    #[test]
    fn oversized_message_is_transparent() {
        let err = InvocationError::from(Rejection::TooLarge {
            trigger: TriggerKind::LoadBalancer,
            size: 1_000_042,
            limit: 1_000_000,
        });
        assert_eq!(
            err.to_string(),
            "Response size is too large for ALB (1000042 bytes)"
        );
        assert!(err.is_diagnostic());
        assert_eq!(err.error_type(), "Runtime.OversizedResponse");
    }

    #[test]
    fn application_errors_are_not_diagnostics() {
        let err = InvocationError::from(AppError::handler("boom"));
        assert!(!err.is_diagnostic());
        assert_eq!(err.error_type(), "Runtime.ApplicationError");
    }
}
