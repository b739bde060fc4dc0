use std::io::{BufRead, Error, ErrorKind};

use crate::parse::error::ParsingError;
use crate::parse::limit::{is_limit_reached, ReadLimitExt};
use crate::parse::parse::{Parse, ParseResult};
use crate::parse::parse::ParseStatus::{Done, IoErr};

/// Max size in bytes of a single line, including the CRLF.
pub const MAX_LINE_SIZE: usize = 8 * 1024;

/// Parses a CRLF terminated line. Bytes read before the reader blocks are kept between calls.
pub struct CrlfLineParser {
    line: Vec<u8>,
}

impl CrlfLineParser {
    /// Creates a new CRLF line parser.
    pub fn new() -> CrlfLineParser {
        CrlfLineParser { line: vec![] }
    }

    /// Returns how many bytes this parser has read so far.
    pub fn read_so_far(&self) -> usize {
        self.line.len()
    }
}

impl Parse<String> for CrlfLineParser {
    fn parse(mut self, reader: &mut impl BufRead) -> ParseResult<String, Self> {
        let mut reader = reader.limited(MAX_LINE_SIZE - self.line.len());

        match reader.read_until(b'\n', &mut self.line) {
            Ok(_) if self.line.last() == Some(&b'\n') => Ok(Done(into_crlf_line(self.line)?)),
            Ok(_) => Ok(IoErr(self, Error::from(ErrorKind::UnexpectedEof))),
            Err(err) if is_limit_reached(&err) => Err(ParsingError::LineTooLong),
            Err(err) => Ok(IoErr(self, err))
        }
    }
}

/// Strips the CRLF from a line ending in '\n' and checks it is valid UTF-8.
fn into_crlf_line(mut line: Vec<u8>) -> Result<String, ParsingError> {
    line.pop();
    if line.pop() != Some(b'\r') {
        return Err(ParsingError::BadSyntax);
    }
    String::from_utf8(line).map_err(|_| ParsingError::InvalidUtf8)
}
