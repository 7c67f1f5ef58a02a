use std::io;

use davy_core::DecodeError;
use reqwest::StatusCode;

/// Everything that can go wrong talking to the marketplace or handling
/// what it sends back.
///
/// HTTP status codes are classified once, in the client, before any body
/// is decoded: a 404 is always [`Error::NotFound`], whatever its body says.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication failed{}", detail(.0))]
    Authentication(String),

    #[error("Resource not found{}", detail(.0))]
    NotFound(String),

    #[error("Validation error{}", detail(.0))]
    Validation(String),

    #[error("API error: {status}{}", detail(.message))]
    Api { status: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid archive: {0}")]
    Archive(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API is unhealthy: {0}")]
    Unhealthy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}

impl Error {
    /// Maps a non-success status to its error kind.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Error::Authentication(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classifies a transport-level failure. A body cut short mid-stream
    /// (`is_body`/`is_decode`) is a network failure like any other.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else if err.is_builder() {
            Error::InvalidInput(format!("invalid request: {err}"))
        } else {
            Error::Network(err)
        }
    }

    /// True for errors that came back as an HTTP status from the server.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_) | Error::NotFound(_) | Error::Validation(_) | Error::Api { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::from_transport(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
