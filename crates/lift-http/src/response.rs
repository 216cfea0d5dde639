use bytes::Bytes;

use crate::header::HeaderMap;

/// A normalized HTTP response as produced by an application.
///
/// Headers keep set order, including repeated names; the codec decides
/// how repetition is represented for the originating trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a response with a pre-buffered body.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a response with no headers and an empty body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    /// 200 with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, HeaderMap::new(), body)
    }

    /// Redirect to `location`.
    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self::empty(status).with_header("Location", location)
    }

    pub fn not_found() -> Self {
        Self::new(404, HeaderMap::new(), "Not Found")
    }

    /// Builder method: append a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (u16, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}
