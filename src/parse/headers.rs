use std::io::BufRead;

use crate::common::header::{Header, HeaderMap, HeaderMapOps};
use crate::header_map;
use crate::parse::error::ParsingError;
use crate::parse::line::CrlfLineParser;
use crate::parse::parse::{Parse, ParseResult};
use crate::parse::parse::ParseStatus::{Done, IoErr};

/// Max size in bytes of the whole header section.
const MAX_HEADERS_SIZE: usize = 16 * 1024;

/// Parser for the header section, up to and including the empty line that ends it.
pub struct HeadersParser {
    line: CrlfLineParser,
    headers: HeaderMap,
    read: usize,
}

impl HeadersParser {
    /// Creates a new headers parser.
    pub fn new() -> HeadersParser {
        HeadersParser { line: CrlfLineParser::new(), headers: header_map![], read: 0 }
    }
}

impl Parse<HeaderMap> for HeadersParser {
    fn parse(self, reader: &mut impl BufRead) -> ParseResult<HeaderMap, Self> {
        let Self { mut line, mut headers, mut read } = self;

        loop {
            if read + line.read_so_far() > MAX_HEADERS_SIZE {
                return Err(ParsingError::HeadersTooLarge);
            }

            match line.parse(reader)? {
                Done(raw) if raw.is_empty() => return Ok(Done(headers)),
                Done(raw) => {
                    read += raw.len() + 2;
                    let (header, value) = parse_header(&raw)?;
                    headers.add_header(header, value);
                    line = CrlfLineParser::new();
                }
                IoErr(line, err) => return Ok(IoErr(HeadersParser { line, headers, read }, err))
            }
        }
    }
}

/// Parses the given line as a header. Splits at the first colon and trims surrounding whitespace from the value.
fn parse_header(raw: &str) -> Result<(Header, String), ParsingError> {
    let (name, value) = raw.split_once(':').ok_or(ParsingError::BadSyntax)?;

    if name.is_empty() || name.ends_with(|c: char| c.is_ascii_whitespace()) {
        return Err(ParsingError::BadSyntax);
    }

    Ok((Header::from(name), value.trim_matches(|c: char| c == ' ' || c == '\t').to_string()))
}
