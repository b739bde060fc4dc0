use std::fs::File;

use crate::common::header::{CONTENT_TYPE, HeaderMap, HeaderMapOps};
use crate::common::status;
use crate::common::status::Status;
use crate::header_map;

/// The content type used when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An HTTP response.
#[derive(Debug)]
pub struct Response {
    /// The status.
    pub status: Status,
    /// The headers. Content length is filled in when the response is written.
    pub headers: HeaderMap,
    /// The body.
    pub body: Body,
}

/// The body of a response.
#[derive(Debug)]
pub enum Body {
    /// No body.
    Empty,
    /// A body held in memory.
    Bytes(Vec<u8>),
    /// A file streamed to the client. The length is taken when the file is opened.
    File { file: File, len: u64 },
}

impl Body {
    /// The number of bytes in the body.
    pub fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    /// Checks if the body has no bytes to send.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the whole body into memory.
    #[cfg(test)]
    pub(crate) fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        use std::io::Read;

        match self {
            Body::Empty => Ok(vec![]),
            Body::Bytes(bytes) => Ok(bytes),
            Body::File { file, len } => {
                let mut buf = Vec::with_capacity(len as usize);
                file.take(len).read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl Response {
    /// Creates a response with the given status and body.
    pub fn new(status: Status, body: Body) -> Response {
        Response { status, headers: header_map![], body }
    }

    /// Sets the content type of the response.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Response {
        self.headers.set_header(CONTENT_TYPE, content_type.into());
        self
    }

    /// Gets the declared content type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_first_header_value(&CONTENT_TYPE).map(String::as_str)
    }
}

impl From<Status> for Response {
    /// Creates an empty response with the given status.
    fn from(status: Status) -> Self {
        Response::new(status, Body::Empty)
    }
}

impl From<String> for Response {
    /// Creates a 200 response with the given string as its body.
    fn from(body: String) -> Self {
        body.into_bytes().into()
    }
}

impl From<&str> for Response {
    /// Creates a 200 response with the given string as its body.
    fn from(body: &str) -> Self {
        body.to_string().into()
    }
}

impl From<Vec<u8>> for Response {
    /// Creates a 200 response with the given bytes as its body.
    fn from(body: Vec<u8>) -> Self {
        Response::new(status::OK, Body::Bytes(body))
    }
}
