//! Which upstream router originated an invocation.

use std::fmt;

use serde_json::{Map, Value};

/// The upstream router that delivered an event.
///
/// Derived solely from whether the event has a `requestContext` key; its
/// value is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// HTTP API router. Responses never carry `statusDescription`.
    ApiRouter,
    /// Load balancer. Responses always carry `statusDescription`.
    LoadBalancer,
}

impl TriggerKind {
    pub fn of(event: &Map<String, Value>) -> Self {
        if event.contains_key("requestContext") {
            TriggerKind::LoadBalancer
        } else {
            TriggerKind::ApiRouter
        }
    }

    pub fn requires_status_description(self) -> bool {
        matches!(self, TriggerKind::LoadBalancer)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::ApiRouter => f.write_str("API Gateway"),
            TriggerKind::LoadBalancer => f.write_str("ALB"),
        }
    }
}

/// Everything about the inbound event that constrains the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventShape {
    pub trigger: TriggerKind,
    /// The router runs in multi-value mode: repeated response headers can
    /// be carried in `multiValueHeaders`. Otherwise only one value per
    /// header name survives.
    pub multi_value: bool,
}

impl EventShape {
    pub fn new(trigger: TriggerKind, multi_value: bool) -> Self {
        Self {
            trigger,
            multi_value,
        }
    }

    pub fn of(event: &Map<String, Value>) -> Self {
        Self {
            trigger: TriggerKind::of(event),
            multi_value: event.contains_key("multiValueHeaders")
                || event.contains_key("multiValueQueryStringParameters"),
        }
    }
}

impl Default for EventShape {
    fn default() -> Self {
        Self::new(TriggerKind::ApiRouter, false)
    }
}
