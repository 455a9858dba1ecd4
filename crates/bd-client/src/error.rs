//! Error types for backdoor-client.

use crate::redact;

/// Result type alias for backdoor-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that a [`RetryPolicy`](crate::RetryPolicy) can classify.
///
/// Every crate in the workspace implements this for its own error type so a
/// single policy can wrap operations that span crates. Wrapping error kinds
/// delegate to the error they wrap.
pub trait Retryable {
    /// Returns true if repeating the failed operation may succeed.
    fn is_retryable(&self) -> bool;
}

/// Error type for backdoor-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a [`ErrorKind::PaginationProtocol`] error.
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaginationProtocol(message.into()))
    }

    /// Shorthand for a [`ErrorKind::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if no status code was obtained (socket, TLS, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_) | ErrorKind::Timeout)
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication { .. })
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } | ErrorKind::Authentication { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The (untruncated) response body attached to an HTTP error.
    pub fn body(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl Retryable for Error {
    fn is_retryable(&self) -> bool {
        Error::is_retryable(self)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Socket or IO failure before any status code was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Status outside the caller's acceptable set.
    #[error(
        "HTTP error: {status} (expected one of {expected:?}): {}",
        redact::for_display(.body)
    )]
    Http {
        status: u16,
        expected: Vec<u16>,
        body: String,
    },

    /// Login or token refresh was rejected.
    #[error("Authentication error ({status}): {}", redact::for_display(.message))]
    Authentication { status: u16, message: String },

    /// A page response broke the paging contract.
    #[error("Pagination protocol error: {0}")]
    PaginationProtocol(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    ///
    /// `Http` counts as retryable: policies are only ever wrapped around
    /// operations that are safe to repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Transport(_) | ErrorKind::Timeout | ErrorKind::Http { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else if err.is_decode() {
            ErrorKind::Json(err.to_string())
        } else {
            ErrorKind::Transport(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}
