//! Builds the application the runtime hosts.
//!
//! ```text
//! DocumentRoot(document_root)
//!   └── fallback: Upstream(LIFT_UPSTREAM)      when configured
//!                 StaticFile(entry point)       when the entry point is a file
//!                 none (404)                    otherwise
//! ```

use std::sync::Arc;

use anyhow::bail;
use lift_app::{DocumentRoot, StaticFile, Upstream};
use lift_http::SharedApplication;
use lift_runtime::RuntimeConfig;
use tracing::info;

pub fn build_application(
    config: &RuntimeConfig,
    upstream: Option<&str>,
    index: &[String],
) -> anyhow::Result<SharedApplication> {
    let root = config.document_root();
    if !root.is_dir() {
        bail!("document root {} does not exist", root.display());
    }
    let entry = config.entry_point();

    let docroot = DocumentRoot::new(&root).with_index(index.iter().cloned());
    let docroot = match upstream {
        Some(address) => {
            info!(root = %root.display(), upstream = address, "serving files, forwarding the rest");
            docroot.fallback(Upstream::new(address))
        }
        None if entry.is_file() => {
            info!(root = %root.display(), entry = %entry.display(), "serving files with front controller");
            docroot.fallback(StaticFile::new(entry))
        }
        None => {
            info!(root = %root.display(), "serving files");
            docroot
        }
    };
    Ok(Arc::new(docroot))
}
