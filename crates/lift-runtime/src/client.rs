//! Runtime API client.
//!
//! ```text
//! GET  /2018-06-01/runtime/invocation/next            → event + request id
//! POST /2018-06-01/runtime/invocation/{id}/response   ← proxy response JSON
//! POST /2018-06-01/runtime/invocation/{id}/error      ← ErrorReport
//! POST /2018-06-01/runtime/init/error                 ← ErrorReport
//! ```
//!
//! The invocation loop is generic over [`RuntimeApi`] so it can be driven
//! by an in-memory fake in tests; [`HttpRuntimeApi`] is the real client.

use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use tracing::debug;

use crate::config::RUNTIME_API_VERSION;
use crate::error::{ClientError, ClientResult};

pub const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
pub const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
pub const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
pub const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
pub const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";

/// One event handed out by the Runtime API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextInvocation {
    pub request_id: String,
    /// Platform deadline in epoch milliseconds, if advertised.
    pub deadline_ms: Option<u64>,
    pub invoked_function_arn: Option<String>,
    pub trace_id: Option<String>,
    pub body: Bytes,
}

impl NextInvocation {
    pub fn new(request_id: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline_ms: None,
            invoked_function_arn: None,
            trace_id: None,
            body: body.into(),
        }
    }
}

/// Body of an invocation or init error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub error_type: String,
    pub stack_trace: Vec<String>,
}

impl ErrorReport {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
            stack_trace: Vec::new(),
        }
    }
}

/// The four Runtime API operations the loop needs.
pub trait RuntimeApi: Send + Sync {
    /// Block until the next invocation is available.
    fn next_invocation(&self) -> impl Future<Output = ClientResult<NextInvocation>> + Send;

    /// Post the serialized proxy response for `request_id`.
    fn post_response(
        &self,
        request_id: &str,
        payload: Bytes,
    ) -> impl Future<Output = ClientResult<()>> + Send;

    /// Report that `request_id` failed without a response.
    fn post_error(
        &self,
        request_id: &str,
        report: &ErrorReport,
    ) -> impl Future<Output = ClientResult<()>> + Send;

    /// Report a startup failure before any invocation is polled.
    fn post_init_error(&self, report: &ErrorReport)
    -> impl Future<Output = ClientResult<()>> + Send;
}

/// HTTP/1.1 client for the Runtime API.
#[derive(Clone)]
pub struct HttpRuntimeApi {
    base: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpRuntimeApi {
    /// Create a client for the Runtime API at `host:port`.
    pub fn new(runtime_api: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base: format!("http://{runtime_api}/{RUNTIME_API_VERSION}"),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        error_type: Option<&str>,
    ) -> ClientResult<(HeaderMap, Bytes)> {
        let url = format!("{}{}", self.base, path);
        let mut builder = http::Request::builder().method(method.clone()).uri(&url);
        if let Some(error_type) = error_type {
            builder = builder.header(ERROR_TYPE_HEADER, error_type);
        }
        if method == Method::POST {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
        }
        let req = builder.body(Full::new(body))?;

        let resp = self.client.request(req).await?;
        let status = resp.status();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await?.to_bytes();

        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(%method, path, status = status.as_u16(), "runtime API call");
        Ok((parts.headers, bytes))
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        value: &T,
        error_type: Option<&str>,
    ) -> ClientResult<()> {
        let body = Bytes::from(serde_json::to_vec(value)?);
        self.send(Method::POST, path, body, error_type).await?;
        Ok(())
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Extract the invocation metadata from a `next` response.
pub(crate) fn next_from_parts(headers: &HeaderMap, body: Bytes) -> ClientResult<NextInvocation> {
    let request_id = header_str(headers, REQUEST_ID_HEADER)
        .filter(|id| !id.is_empty())
        .ok_or(ClientError::MissingHeader("Lambda-Runtime-Aws-Request-Id"))?;
    Ok(NextInvocation {
        request_id,
        deadline_ms: header_str(headers, DEADLINE_HEADER).and_then(|v| v.parse().ok()),
        invoked_function_arn: header_str(headers, FUNCTION_ARN_HEADER),
        trace_id: header_str(headers, TRACE_ID_HEADER),
        body,
    })
}

impl RuntimeApi for HttpRuntimeApi {
    async fn next_invocation(&self) -> ClientResult<NextInvocation> {
        let (headers, body) = self
            .send(Method::GET, "/runtime/invocation/next", Bytes::new(), None)
            .await?;
        next_from_parts(&headers, body)
    }

    async fn post_response(&self, request_id: &str, payload: Bytes) -> ClientResult<()> {
        let path = format!("/runtime/invocation/{request_id}/response");
        self.send(Method::POST, &path, payload, None).await?;
        Ok(())
    }

    async fn post_error(&self, request_id: &str, report: &ErrorReport) -> ClientResult<()> {
        let path = format!("/runtime/invocation/{request_id}/error");
        self.post_json(&path, report, Some(report.error_type.as_str())).await
    }

    async fn post_init_error(&self, report: &ErrorReport) -> ClientResult<()> {
        self.post_json("/runtime/init/error", report, Some(report.error_type.as_str()))
            .await
    }
}

impl std::fmt::Debug for HttpRuntimeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRuntimeApi")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn error_report_serializes_camel_case() {
        let report = ErrorReport::new("Runtime.MalformedEvent", "bad event");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorMessage"], "bad event");
        assert_eq!(json["errorType"], "Runtime.MalformedEvent");
        assert_eq!(json["stackTrace"], serde_json::json!([]));
    }

    #[test]
    fn base_url_includes_api_version() {
        let api = HttpRuntimeApi::new("127.0.0.1:9001");
        assert_eq!(api.base_url(), "http://127.0.0.1:9001/2018-06-01");
    }

    #[test]
    fn next_invocation_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(DEADLINE_HEADER, HeaderValue::from_static("1700000000000"));
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("Root=1-abc"));

        let next = next_from_parts(&headers, Bytes::from_static(b"{}")).unwrap();
        assert_eq!(next.request_id, "req-1");
        assert_eq!(next.deadline_ms, Some(1_700_000_000_000));
        assert_eq!(next.trace_id.as_deref(), Some("Root=1-abc"));
        assert_eq!(next.invoked_function_arn, None);
        assert_eq!(next.body.as_ref(), b"{}");
    }

    #[test]
    fn next_invocation_requires_request_id() {
        let err = next_from_parts(&HeaderMap::new(), Bytes::new()).unwrap_err();
        assert!(matches!(err, ClientError::MissingHeader(_)));
    }
}
