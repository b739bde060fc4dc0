use std::io::BufRead;

use crate::common::method::Method;
use crate::common::request::Request;
use crate::common::version;
use crate::parse::error::ParsingError;
use crate::parse::headers::HeadersParser;
use crate::parse::line::CrlfLineParser;
use crate::parse::parse::{Parse, ParseResult};
use crate::parse::parse::ParseStatus::{Done, IoErr};
use crate::parse::request::RequestParser::{Headers, RequestLine};

/// Parser for the head of a request: the request line, then the headers.
/// The parsed request has an empty body. Any body is left in the reader.
pub enum RequestParser {
    RequestLine(CrlfLineParser),
    Headers(Method, String, HeadersParser),
}

impl RequestParser {
    /// Creates a new request parser.
    pub fn new() -> RequestParser {
        RequestLine(CrlfLineParser::new())
    }

    /// Returns true if this parser has read any data so far.
    pub fn has_data(&self) -> bool {
        match self {
            RequestLine(parser) => parser.read_so_far() > 0,
            Headers(..) => true
        }
    }
}

impl Parse<Request> for RequestParser {
    fn parse(self, reader: &mut impl BufRead) -> ParseResult<Request, Self> {
        let mut state = self;

        loop {
            state = match state {
                RequestLine(parser) => match parser.parse(reader)? {
                    Done(line) => {
                        let (method, uri) = parse_request_line(&line)?;
                        Headers(method, uri, HeadersParser::new())
                    }
                    IoErr(parser, err) => return Ok(IoErr(RequestLine(parser), err))
                },
                Headers(method, uri, parser) => return Ok(match parser.parse(reader)? {
                    Done(headers) => Done(Request { uri, method, headers, body: vec![] }),
                    IoErr(parser, err) => IoErr(Headers(method, uri, parser), err)
                })
            }
        }
    }
}

/// Parses the given string as a request line. Verifies the HTTP version and returns the method and request target.
fn parse_request_line(line: &str) -> Result<(Method, String), ParsingError> {
    let mut split = line.split(' ');

    let method_raw = split.next().ok_or(ParsingError::BadSyntax)?;
    let uri = split.next().filter(|uri| !uri.is_empty()).ok_or(ParsingError::BadSyntax)?;
    let http_version = split.next().ok_or(ParsingError::BadSyntax)?;

    if split.next().is_some() {
        return Err(ParsingError::BadSyntax);
    }

    if !version::is_supported(http_version) {
        return Err(ParsingError::InvalidHttpVersion);
    }

    let method = Method::try_from_str(method_raw).ok_or(ParsingError::InvalidMethod)?;

    Ok((method, uri.to_string()))
}
