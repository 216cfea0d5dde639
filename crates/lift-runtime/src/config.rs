//! Runtime configuration.
//!
//! Values come from the process environment (parsed by the bootstrap
//! binary). The struct itself carries no parsing logic so tests can build
//! one directly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RuntimeError, RuntimeResult};

/// Version segment of every Runtime API path.
pub const RUNTIME_API_VERSION: &str = "2018-06-01";

/// Default per-invocation execution budget.
pub const DEFAULT_MAX_EXECUTION_TIME: Duration = Duration::from_secs(30);

/// Default location of the deployed function code.
pub const DEFAULT_TASK_ROOT: &str = "/var/task";

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// `host:port` of the Runtime API.
    pub runtime_api: String,
    /// Directory holding the deployed code.
    pub task_root: PathBuf,
    /// Application entry point, relative to `task_root`.
    pub handler: String,
    /// Wall-clock budget for one application call.
    pub max_execution_time: Duration,
}

impl RuntimeConfig {
    pub fn new(
        runtime_api: impl Into<String>,
        task_root: impl Into<PathBuf>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            runtime_api: runtime_api.into(),
            task_root: task_root.into(),
            handler: handler.into(),
            max_execution_time: DEFAULT_MAX_EXECUTION_TIME,
        }
    }

    pub fn with_max_execution_time(mut self, max: Duration) -> Self {
        self.max_execution_time = max;
        self
    }

    /// Absolute path of the entry point.
    pub fn entry_point(&self) -> PathBuf {
        self.task_root.join(&self.handler)
    }

    /// The directory static files are served from: the entry point itself
    /// when it is a directory, otherwise the directory containing it.
    pub fn document_root(&self) -> PathBuf {
        let entry = self.entry_point();
        if entry.is_dir() {
            return entry;
        }
        entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.task_root.clone())
    }

    /// Base URL of the versioned Runtime API.
    pub fn runtime_api_base(&self) -> String {
        format!("http://{}/{}", self.runtime_api, RUNTIME_API_VERSION)
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        if self.runtime_api.trim().is_empty() {
            return Err(RuntimeError::Config(
                "runtime API address must not be empty".into(),
            ));
        }
        if self.handler.trim().is_empty() {
            return Err(RuntimeError::Config("handler must not be empty".into()));
        }
        if self.max_execution_time.is_zero() {
            return Err(RuntimeError::Config(
                "max execution time must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
