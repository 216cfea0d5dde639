//! In-process Runtime API double.
//!
//! Serves queued events from `GET .../invocation/next` (503 when the
//! queue is empty) and records every POST with its path, error-type
//! header, and JSON body.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tokio::net::TcpListener;

const PREFIX: &str = "/2018-06-01";

#[derive(Debug, Clone)]
pub struct Post {
    pub path: String,
    pub error_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct State {
    queue: Mutex<VecDeque<(String, Bytes)>>,
    posts: Mutex<Vec<Post>>,
}

pub struct MockRuntimeApi {
    pub addr: SocketAddr,
    state: Arc<State>,
}

impl MockRuntimeApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State::default());

        let shared = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = shared.clone();
                tokio::spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let state = state.clone();
                        async move { Ok::<_, hyper::Error>(handle(&state, req).await) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn enqueue(&self, request_id: &str, event: Value) {
        self.enqueue_raw(request_id, serde_json::to_vec(&event).unwrap());
    }

    pub fn enqueue_raw(&self, request_id: &str, payload: impl Into<Bytes>) {
        self.state
            .queue
            .lock()
            .unwrap()
            .push_back((request_id.to_string(), payload.into()));
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.posts.lock().unwrap().clone()
    }

    /// The proxy response posted for `request_id`.
    pub fn response_for(&self, request_id: &str) -> Value {
        let path = format!("{PREFIX}/runtime/invocation/{request_id}/response");
        self.posts()
            .into_iter()
            .find(|p| p.path == path)
            .map(|p| p.body)
            .unwrap_or_else(|| panic!("no response posted for {request_id}: {:?}", self.posts()))
    }

    /// The error report posted for `request_id`.
    pub fn error_for(&self, request_id: &str) -> Post {
        let path = format!("{PREFIX}/runtime/invocation/{request_id}/error");
        self.posts()
            .into_iter()
            .find(|p| p.path == path)
            .unwrap_or_else(|| panic!("no error posted for {request_id}: {:?}", self.posts()))
    }
}

async fn handle(state: &State, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let error_type = req
        .headers()
        .get("lambda-runtime-function-error-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = req.into_body().collect().await.unwrap().to_bytes();

    if method == hyper::Method::GET && path == format!("{PREFIX}/runtime/invocation/next") {
        let next = state.queue.lock().unwrap().pop_front();
        return match next {
            Some((id, payload)) => Response::builder()
                .status(200)
                .header("Lambda-Runtime-Aws-Request-Id", id)
                .header("Lambda-Runtime-Deadline-Ms", "4102444800000")
                .header("Lambda-Runtime-Trace-Id", "Root=1-00000000-000000000000000000000000")
                .header(
                    "Lambda-Runtime-Invoked-Function-Arn",
                    "arn:aws:lambda:us-east-1:123456789012:function:test",
                )
                .body(Full::new(payload))
                .unwrap(),
            None => Response::builder()
                .status(503)
                .body(Full::new(Bytes::new()))
                .unwrap(),
        };
    }

    if method == hyper::Method::POST {
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        state.posts.lock().unwrap().push(Post {
            path,
            error_type,
            body,
        });
        return Response::builder()
            .status(202)
            .body(Full::new(Bytes::from_static(br#"{"status":"OK"}"#)))
            .unwrap();
    }

    Response::builder()
        .status(404)
        .body(Full::new(Bytes::new()))
        .unwrap()
}
