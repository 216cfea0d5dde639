//! lift-app — ready-made [`Application`](lift_http::Application)s.
//!
//! ```text
//! Router              method + /path/{param} dispatch, 404 / 405
//!   └── fallback ──▶ DocumentRoot   files, directory index, 301 to "dir/"
//!                      └── fallback ──▶ Upstream     forward to a local HTTP process
//!                                   or StaticFile   one front-controller page
//! ```
//!
//! Each piece is an `Application` on its own and they compose through
//! their `fallback` builders.

pub mod docroot;
pub mod router;
pub mod upstream;

pub use docroot::{DEFAULT_INDEX, DocumentRoot, StaticFile, content_type};
pub use router::Router;
pub use upstream::Upstream;
