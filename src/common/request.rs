use crate::common::header::HeaderMap;
use crate::common::method::Method;

/// An HTTP request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Request {
    /// The request target, exactly as sent. May contain a percent-encoded path and a query.
    pub uri: String,
    /// The method.
    pub method: Method,
    /// The headers.
    pub headers: HeaderMap,
    /// The body. Empty for requests whose body is streamed into an upload.
    pub body: Vec<u8>,
}
