//! lift-event — wire codec between proxy events and the normalized model.
//!
//! Two upstream routers deliver invocations to the runtime: an HTTP API
//! router and a load balancer. Their event payloads share field names but
//! differ in what the response must look like. This crate is pure data
//! transformation, no I/O.
//!
//! # Flow
//!
//! ```text
//! raw event (JSON)
//!   │
//!   ├── decode()            → Request + EventShape
//!   │
//!   ▼
//! application → Response
//!   │
//!   ├── encode()            → ProxyResponse (shape-specific fields)
//!   ├── ResponseValidator   → size ceiling + representable headers
//!   │
//!   ▼
//! proxy response (JSON)
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod trigger;
pub mod validate;

pub use decode::{decode, parse, shape_of, DecodedEvent};
pub use encode::{encode, status_description, ProxyResponse};
pub use error::{CodecResult, MalformedEvent, Rejection};
pub use trigger::{EventShape, TriggerKind};
pub use validate::{ResponseValidator, ALB_MAX_RESPONSE_BYTES, API_GATEWAY_MAX_RESPONSE_BYTES};
