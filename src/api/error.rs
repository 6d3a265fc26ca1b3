use std::fmt;

use crate::core::query::QueryError;
use crate::core::validation::ValidationError;

/// Errors that can occur while talking to the posts API.
///
/// `Clone` because a single failed request may be observed by several
/// waiters joined on the same cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// No response reached us (timeout, DNS, connection refused).
    Network(String),
    /// The server answered with a non-2xx status.
    Server { status: u16, message: String },
    /// The response body did not match the expected shape.
    Decode(String),
    /// The query was rejected locally before any request was built.
    InvalidQuery(QueryError),
    /// A post form failed validation; nothing was sent.
    Invalid(ValidationError),
    /// The request succeeded but its session could not be stored locally.
    Session(String),
}

impl FetchError {
    /// True for a 401, which means the stored session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Server { status: 401, .. })
    }

    /// Short label used by the status bar.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Server { .. } => "server",
            FetchError::Decode(_) => "decode",
            FetchError::InvalidQuery(_) => "query",
            FetchError::Invalid(_) => "validation",
            FetchError::Session(_) => "session",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Server { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
            FetchError::InvalidQuery(e) => write!(f, "invalid query: {e}"),
            FetchError::Invalid(e) => write!(f, "invalid post: {e}"),
            FetchError::Session(msg) => write!(f, "could not store session: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<QueryError> for FetchError {
    fn from(e: QueryError) -> Self {
        FetchError::InvalidQuery(e)
    }
}

impl From<ValidationError> for FetchError {
    fn from(e: ValidationError) -> Self {
        FetchError::Invalid(e)
    }
}
