use bytes::Bytes;

use crate::header::HeaderMap;
use crate::query::QueryParams;

/// A normalized HTTP request, independent of the event shape it came from.
///
/// Headers and query parameters keep every value in declaration order.
/// The body is raw bytes; base64 transport encoding has already been
/// removed by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    headers: HeaderMap,
    query: QueryParams,
    body: Bytes,
    /// Values captured from the matched route pattern.
    params: Vec<(String, String)>,
}

impl Request {
    /// Create a request with no headers, query parameters, or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HeaderMap::new(),
            query: QueryParams::new(),
            body: Bytes::new(),
            params: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Record a captured route parameter, replacing an earlier capture of
    /// the same name.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn query_string(&self) -> String {
        self.query.to_query_string()
    }

    /// Path plus query string, suitable for a request line.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }

    /// Parse a form-urlencoded body.
    ///
    /// Returns empty parameters unless the content type says the body is
    /// `application/x-www-form-urlencoded`.
    pub fn form(&self) -> QueryParams {
        let is_form = self
            .headers
            .last("content-type")
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            })
            .unwrap_or(false);
        if !is_form {
            return QueryParams::new();
        }
        QueryParams::parse(&String::from_utf8_lossy(&self.body))
    }

    pub fn into_parts(self) -> (String, String, HeaderMap, QueryParams, Bytes) {
        (self.method, self.path, self.headers, self.query, self.body)
    }
}
