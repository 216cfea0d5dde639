//! Codec and validation error types.

use thiserror::Error;

use crate::trigger::TriggerKind;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, MalformedEvent>;

/// A structural violation in an inbound event (or a proxy response being
/// parsed back).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("event is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("event is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("body is not valid base64: {0}")]
    InvalidBase64(String),
}

/// A response the originating trigger cannot carry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Response size is too large for {trigger} ({size} bytes)")]
    TooLarge {
        trigger: TriggerKind,
        size: usize,
        limit: usize,
    },

    #[error("Response header {name:?} cannot be represented by {trigger}")]
    InvalidHeader { trigger: TriggerKind, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_message_reports_exact_size() {
        let err = Rejection::TooLarge {
            trigger: TriggerKind::LoadBalancer,
            size: 1_000_167,
            limit: 1_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Response size is too large for ALB (1000167 bytes)"
        );
    }

    #[test]
    fn malformed_messages() {
        assert_eq!(
            MalformedEvent::MissingField("httpMethod").to_string(),
            "missing required field: httpMethod"
        );
        assert_eq!(
            MalformedEvent::WrongType {
                field: "path",
                expected: "a string"
            }
            .to_string(),
            "field path must be a string"
        );
    }
}
