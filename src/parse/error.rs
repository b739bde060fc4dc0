use std::fmt::{Display, Formatter};

use crate::common::status;
use crate::common::status::Status;

/// Error for when an HTTP request can't be parsed.
#[derive(Debug, Eq, PartialEq)]
pub enum ParsingError {
    /// Invalid syntax in the message.
    BadSyntax,
    /// Message has an unsupported HTTP version.
    InvalidHttpVersion,
    /// Header has invalid value.
    InvalidHeaderValue,
    /// Size of chunk in chunked transfer encoding can not be parsed as a number.
    InvalidChunkSize,
    /// The request method is not a valid token.
    InvalidMethod,
    /// A line is longer than the line limit.
    LineTooLong,
    /// The header section is larger than the header limit.
    HeadersTooLarge,
    /// The body is larger than the configured maximum.
    BodyTooLarge,
    /// Data is not valid UTF8.
    InvalidUtf8,
}

impl ParsingError {
    /// The status sent back to the client for this error.
    pub fn status(&self) -> Status {
        match self {
            ParsingError::BodyTooLarge => status::PAYLOAD_TOO_LARGE,
            ParsingError::InvalidHttpVersion => status::HTTP_VERSION_NOT_SUPPORTED,
            _ => status::BAD_REQUEST
        }
    }
}

impl Display for ParsingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ParsingError::BadSyntax => "bad syntax",
            ParsingError::InvalidHttpVersion => "unsupported HTTP version",
            ParsingError::InvalidHeaderValue => "invalid header value",
            ParsingError::InvalidChunkSize => "invalid chunk size",
            ParsingError::InvalidMethod => "invalid method",
            ParsingError::LineTooLong => "line too long",
            ParsingError::HeadersTooLarge => "headers too large",
            ParsingError::BodyTooLarge => "body too large",
            ParsingError::InvalidUtf8 => "invalid UTF-8",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ParsingError {}
