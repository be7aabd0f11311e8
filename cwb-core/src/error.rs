use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single outbound fetch, or of the cycle it belongs to.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response body (DNS, TLS, connect, read).
    #[error("request to the weather API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("weather API returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body arrived but did not have the expected shape or values.
    #[error("unexpected weather API response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::Status { .. } => ErrorKind::Status,
            FetchError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

/// Copyable tag stored in the published snapshot so the rendering layer can
/// show that the last cycle failed without holding the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Status,
    Malformed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "network error",
            ErrorKind::Status => "server error",
            ErrorKind::Malformed => "unexpected response",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
