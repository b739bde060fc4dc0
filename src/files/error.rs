use std::fmt::{Display, Formatter};
use std::io::ErrorKind;

use crate::common::status;
use crate::common::status::Status;

/// Error for when a file request can't be served.
#[derive(Debug)]
pub enum ServeError {
    /// The resolved path lies outside the base directory.
    Forbidden,
    /// The request path has an invalid percent-encoding.
    MalformedPath,
    /// Nothing exists at the resolved path.
    NotFound,
    /// A directory was requested where a file exists.
    NotADirectory,
    /// Any other filesystem failure.
    Io(std::io::Error),
}

impl ServeError {
    /// The status sent back to the client for this error.
    pub fn status(&self) -> Status {
        match self {
            ServeError::Forbidden => status::FORBIDDEN,
            ServeError::MalformedPath | ServeError::NotADirectory => status::BAD_REQUEST,
            ServeError::NotFound => status::NOT_FOUND,
            ServeError::Io(_) => status::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeError::Forbidden => f.write_str("Forbidden"),
            ServeError::MalformedPath => f.write_str("Malformed path"),
            ServeError::NotFound => f.write_str("File not found"),
            ServeError::NotADirectory => f.write_str("Not a directory"),
            ServeError::Io(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Io(err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for ServeError {
    fn from(err: std::io::Error) -> Self {
        ServeError::Io(err)
    }
}

/// Maps a not-found IO error to None, and any other IO error to a ServeError.
pub fn not_found_to_none<T>(result: std::io::Result<T>) -> Result<Option<T>, ServeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into())
    }
}
