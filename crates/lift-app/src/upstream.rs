//! Upstream forwarder — hands each request to a local HTTP process.
//!
//! The function bundle may ship its own web server (listening on a
//! loopback port). `Upstream` replays the normalized request against it
//! over HTTP/1.1 and returns the response with headers in received order.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use lift_http::{AppError, AppFuture, AppResult, Application, HeaderMap, Request, Response};
use tracing::debug;
use url::Url;

/// Connection-scoped headers that must not be forwarded in either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Forwards requests to `http://<address>`.
#[derive(Clone)]
pub struct Upstream {
    address: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl Upstream {
    /// `address` is `host:port`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Target URL for `request`. Event paths arrive percent-decoded, so
    /// the path is re-encoded here; the query string is already encoded.
    fn target(&self, request: &Request) -> AppResult<Url> {
        let mut url = Url::parse(&format!("http://{}/", self.address))
            .map_err(|e| AppError::Upstream(format!("invalid address {}: {e}", self.address)))?;
        url.set_path(request.path());
        if !request.query().is_empty() {
            url.set_query(Some(&request.query_string()));
        }
        Ok(url)
    }
}

impl Application for Upstream {
    fn handle(&self, request: Request) -> AppFuture {
        let this = self.clone();
        Box::pin(async move { this.forward(request).await })
    }
}

impl Upstream {
    async fn forward(&self, request: Request) -> AppResult<Response> {
        let url = self.target(&request)?;
        let mut builder = http::Request::builder()
            .method(request.method())
            .uri(url.as_str());
        for header in request.headers() {
            if !is_hop_by_hop(&header.name) {
                builder = builder.header(header.name.as_str(), header.value.as_str());
            }
        }
        if !request.headers().contains("host") {
            builder = builder.header(http::header::HOST, self.address.as_str());
        }
        let (method, _, _, _, body) = request.into_parts();
        let req = builder
            .body(Full::new(body))
            .map_err(|e| AppError::Upstream(format!("invalid request: {e}")))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| AppError::Upstream(format!("{} unreachable: {e}", self.address)))?;
        let status = resp.status().as_u16();
        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to read response: {e}")))?
            .to_bytes();

        let mut headers = HeaderMap::new();
        for (name, value) in parts.headers.iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            headers.append(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        debug!(%method, %url, status, bytes = body.len(), "upstream response");
        Ok(Response::new(status, headers, body))
    }
}
