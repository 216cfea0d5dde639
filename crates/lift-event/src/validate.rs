//! ResponseValidator — rejects responses the trigger cannot carry.
//!
//! Runs after the application has produced a complete response and the
//! codec has serialized it, since the size ceiling applies to the whole
//! posted payload (body plus encoding overhead), not just the body.

use lift_http::Response;
use tracing::warn;

use crate::error::Rejection;
use crate::trigger::{EventShape, TriggerKind};

/// Largest payload the load balancer accepts from a function.
pub const ALB_MAX_RESPONSE_BYTES: usize = 1_000_000;

/// Largest synchronous invocation payload the platform accepts.
pub const API_GATEWAY_MAX_RESPONSE_BYTES: usize = 6 * 1024 * 1024;

/// Per-trigger response limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseValidator {
    load_balancer_limit: usize,
    api_router_limit: usize,
}

impl ResponseValidator {
    /// Create a validator with explicit payload limits (bytes).
    pub fn new(load_balancer_limit: usize, api_router_limit: usize) -> Self {
        Self {
            load_balancer_limit,
            api_router_limit,
        }
    }

    /// Create a validator with the platform limits.
    pub fn with_defaults() -> Self {
        Self::new(ALB_MAX_RESPONSE_BYTES, API_GATEWAY_MAX_RESPONSE_BYTES)
    }

    pub fn limit_for(&self, trigger: TriggerKind) -> usize {
        match trigger {
            TriggerKind::LoadBalancer => self.load_balancer_limit,
            TriggerKind::ApiRouter => self.api_router_limit,
        }
    }

    /// Check a response and its serialized payload.
    pub fn check(
        &self,
        response: &Response,
        payload: &[u8],
        shape: EventShape,
    ) -> Result<(), Rejection> {
        self.check_headers(response, shape.trigger)?;
        self.check_size(payload.len(), shape.trigger)
    }

    /// Header names must be HTTP tokens; values must be free of control
    /// characters.
    pub fn check_headers(&self, response: &Response, trigger: TriggerKind) -> Result<(), Rejection> {
        for header in response.headers() {
            let name_ok = http::HeaderName::from_bytes(header.name.as_bytes()).is_ok();
            let value_ok = http::HeaderValue::from_bytes(header.value.as_bytes()).is_ok();
            if !name_ok || !value_ok {
                warn!(name = %header.name, %trigger, "unrepresentable response header");
                return Err(Rejection::InvalidHeader {
                    trigger,
                    name: header.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn check_size(&self, size: usize, trigger: TriggerKind) -> Result<(), Rejection> {
        let limit = self.limit_for(trigger);
        if size > limit {
            warn!(size, limit, %trigger, "response payload over limit");
            Err(Rejection::TooLarge {
                trigger,
                size,
                limit,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
