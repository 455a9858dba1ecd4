//! Error types for backdoor-auth.
//!
//! Error messages never include token, cookie or password values.

use backdoor_client::{redact, Retryable};

/// Result type alias for backdoor-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for backdoor-auth operations.
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

    /// Returns true if login or refresh was rejected by the backend.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication { .. })
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Authentication { status, .. } => Some(*status),
            ErrorKind::Client(err) => err.status(),
            _ => None,
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            ErrorKind::Client(err) => err.is_retryable(),
            _ => false,
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
    /// Login or token refresh answered with an unacceptable status.
    #[error("Authentication failed ({status}): {}", redact::for_display(.message))]
    Authentication { status: u16, message: String },

    /// No second-factor code could be obtained.
    #[error("Verification code unavailable: {0}")]
    VerificationCode(String),

    /// The stored credential cannot be used for the requested flow.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Failure in the underlying request executor.
    #[error(transparent)]
    Client(backdoor_client::Error),
}

impl From<backdoor_client::Error> for Error {
    fn from(err: backdoor_client::Error) -> Self {
        Error::new(ErrorKind::Client(err))
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::with_source(ErrorKind::EnvVar(err.to_string()), err)
    }
}
