use thiserror::Error;

/// Result type alias for application handlers.
pub type AppResult<T> = Result<T, AppError>;

/// A failure surfaced by an application instead of a response.
///
/// The runtime maps every variant to a 500 response for the invocation;
/// the variant only changes what is logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("handler failed: {0}")]
    Handler(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        Self::Handler(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        Self::Handler(s.to_string())
    }
}
