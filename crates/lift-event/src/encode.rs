//! Outbound proxy response encoding.
//!
//! Encoding is lossy by design: repeated headers either move to
//! `multiValueHeaders` (multi-value mode) or collapse to their last value,
//! so decoding a [`ProxyResponse`] back does not always reproduce the
//! application's header list exactly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use lift_http::{HeaderMap, Response};

use crate::error::{CodecResult, MalformedEvent};
use crate::trigger::EventShape;

/// The JSON payload posted back to the runtime API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    /// Present iff the invocation came from the load balancer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub multi_value_headers: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// `"<code> <reason phrase>"`, with `Unknown` for unregistered codes.
pub fn status_description(code: u16) -> String {
    let reason = StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    format!("{code} {reason}")
}

/// Encode a response in the shape the originating trigger expects.
pub fn encode(response: &Response, shape: EventShape) -> ProxyResponse {
    let mut headers = IndexMap::new();
    let mut multi_value_headers = IndexMap::new();

    for (name, values) in response.headers().grouped() {
        if shape.multi_value && values.len() > 1 {
            multi_value_headers.insert(
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        } else if let Some(last) = values.last() {
            headers.insert(name.to_string(), last.to_string());
        }
    }

    let (body, is_base64_encoded) = match std::str::from_utf8(response.body()) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (STANDARD.encode(response.body()), true),
    };

    ProxyResponse {
        status_code: response.status(),
        status_description: shape
            .trigger
            .requires_status_description()
            .then(|| status_description(response.status())),
        headers,
        multi_value_headers,
        body,
        is_base64_encoded,
    }
}

impl ProxyResponse {
    /// Serialize to the bytes that are posted (and size-checked).
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a proxy response back into the normalized model.
    ///
    /// Single-value headers come first, then multi-value headers, each in
    /// payload order.
    pub fn into_response(self) -> CodecResult<Response> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        for (name, values) in self.multi_value_headers {
            for value in values {
                headers.append(name.clone(), value);
            }
        }

        let body = if self.is_base64_encoded {
            STANDARD
                .decode(&self.body)
                .map_err(|e| MalformedEvent::InvalidBase64(e.to_string()))?
        } else {
            self.body.into_bytes()
        };

        Ok(Response::new(self.status_code, headers, body))
    }
}
