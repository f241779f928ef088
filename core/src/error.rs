//! Error types for the HTTP client core.
//!
//! # Design
//! None of these errors reach callers of `HttpClient::send`: the client folds
//! every failure into a `Response` with code 0 and the error text as content.
//! They are still typed so `Client::try_send` can report *why* a call failed,
//! and so a malformed response is never mistaken for a successful one.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A transfer that never produced an HTTP exchange (DNS, connect, TLS...).
///
/// The message is the transport's own diagnostic text, e.g.
/// `Failed to connect to localhost port 123: Connection refused`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> Self {
        // libcurl's error buffer carries the host/port detail; the generic
        // description only names the error class.
        match err.extra_description() {
            Some(extra) => Self::new(extra),
            None => Self::new(err.description()),
        }
    }
}

impl From<curl::FormError> for TransportError {
    fn from(err: curl::FormError) -> Self {
        Self::new(format!("failed to build multipart body: {err}"))
    }
}

/// The raw transfer result could not be read as an HTTP/1.x message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed response: empty response")]
    Empty,

    #[error("malformed response: invalid status line {0:?}")]
    InvalidStatusLine(String),

    #[error("malformed response: interim 100 Continue without a final response")]
    MissingFinalResponse,

    #[error("malformed response: more than {0} interim responses")]
    TooManyInterimResponses(usize),
}

/// A request body could not be assembled.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read upload file {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything `Client::try_send` and client construction can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Body(#[from] BodyError),

    /// The per-client cookie jar file could not be created or removed.
    #[error("cookie jar: {0}")]
    CookieJar(#[source] io::Error),
}
