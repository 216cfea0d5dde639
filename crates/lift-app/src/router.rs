//! Request routing — dispatches on method and path pattern.
//!
//! Patterns are literal segments plus `{name}` captures, e.g.
//! `/foo/{bar}/baz`. Routes are tried in registration order; the first
//! route whose pattern and method both match wins. A path that matches
//! only under other methods gets `405` with an `Allow` header; a path
//! that matches nothing goes to the fallback application, or `404`.

use std::sync::Arc;

use lift_http::{AppFuture, Application, Request, Response, SharedApplication};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

struct Route {
    method: String,
    pattern: String,
    segments: Vec<Segment>,
    handler: SharedApplication,
}

impl Route {
    /// Captured parameters when `path` matches this route's pattern.
    fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts = split_path(path);
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), part.to_string())),
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|part| match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(part.to_string()),
        })
        .collect()
}

/// Routes requests to handlers by method and path pattern.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    fallback: Option<SharedApplication>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `pattern`.
    pub fn route(mut self, method: &str, pattern: &str, handler: impl Application) -> Self {
        debug!(method, pattern, "registered route");
        self.routes.push(Route {
            method: method.to_ascii_uppercase(),
            pattern: pattern.to_string(),
            segments: parse_pattern(pattern),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Application) -> Self {
        self.route("GET", pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Application) -> Self {
        self.route("POST", pattern, handler)
    }

    /// Application for requests no pattern matches.
    pub fn fallback(mut self, handler: impl Application) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Registered `(method, pattern)` pairs in registration order.
    pub fn routes(&self) -> Vec<(&str, &str)> {
        self.routes
            .iter()
            .map(|r| (r.method.as_str(), r.pattern.as_str()))
            .collect()
    }

    fn dispatch(&self, mut request: Request) -> AppFuture {
        let mut allowed: Vec<&str> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.captures(request.path()) else {
                continue;
            };
            if route.method.eq_ignore_ascii_case(request.method()) {
                for (name, value) in params {
                    request.set_param(name, value);
                }
                return route.handler.handle(request);
            }
            if !allowed.contains(&route.method.as_str()) {
                allowed.push(&route.method);
            }
        }

        if !allowed.is_empty() {
            debug!(method = request.method(), path = request.path(), "method not allowed");
            let resp = Response::new(405, Default::default(), "Method Not Allowed")
                .with_header("Allow", allowed.join(", "));
            return Box::pin(async move { Ok(resp) });
        }

        match &self.fallback {
            Some(fallback) => fallback.handle(request),
            None => Box::pin(async { Ok(Response::not_found()) }),
        }
    }
}

impl Application for Router {
    fn handle(&self, request: Request) -> AppFuture {
        self.dispatch(request)
    }
}
