//! Error types for backdoor-api.

use backdoor_client::Retryable;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound(what.into()))
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol(message.into()))
    }

    /// The HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Client(err) => err.status(),
            ErrorKind::Auth(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            ErrorKind::Client(err) => err.is_retryable(),
            ErrorKind::Auth(err) => err.is_retryable(),
            ErrorKind::Unconverged { .. } => true,
            ErrorKind::NotFound(_) | ErrorKind::Protocol(_) => false,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(&self.kind, ErrorKind::Auth(err) if err.is_auth_error())
    }
}

impl Retryable for Error {
    fn is_retryable(&self) -> bool {
        Error::is_retryable(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Client(backdoor_client::Error),

    #[error(transparent)]
    Auth(backdoor_auth::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a shape this client does not understand.
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// A polled server-side value has not reached the expected state yet.
    #[error("{name} is {actual}, expected {expected}")]
    Unconverged {
        name: String,
        expected: String,
        actual: String,
    },
}

impl From<backdoor_client::Error> for Error {
    fn from(err: backdoor_client::Error) -> Self {
        Error::new(ErrorKind::Client(err))
    }
}

impl From<backdoor_auth::Error> for Error {
    fn from(err: backdoor_auth::Error) -> Self {
        Error::new(ErrorKind::Auth(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(backdoor_client::Error::from(err))
    }
}
