use std::io::{BufRead, Error, ErrorKind, Write};

use crate::common::header;
use crate::common::header::{HeaderMap, HeaderMapOps};
use crate::parse::body::BodyParser::{Chunked, Empty, WithSize};
use crate::parse::body::chunked::ChunksParser;
use crate::parse::error::ParsingError;
use crate::parse::parse::{Parse, ParseResult};
use crate::parse::parse::ParseStatus::{Done, IoErr};

/// How the end of a request body is found. Taken from the request headers.
#[derive(Debug, Eq, PartialEq)]
pub enum Framing {
    /// The body is exactly this many bytes.
    Sized(u64),
    /// The body is sent in chunks, with an optional limit on their total size.
    Chunked(Option<u64>),
    /// There is no body.
    Empty,
}

impl Framing {
    /// Gets the framing of a request body. Bodies larger than max_size, if given, are rejected.
    /// A chunked transfer-encoding takes precedence over a content-length. Requests with neither have no body.
    pub fn from_headers(headers: &HeaderMap, max_size: Option<u64>) -> Result<Framing, ParsingError> {
        if is_chunked_transfer_encoding(headers) {
            return Ok(Framing::Chunked(max_size));
        }

        match get_content_length(headers).transpose()? {
            Some(size) if max_size.map_or(false, |max| size > max) => Err(ParsingError::BodyTooLarge),
            Some(0) | None => Ok(Framing::Empty),
            Some(size) => Ok(Framing::Sized(size))
        }
    }

    /// Creates a parser that writes the body into the given sink as it arrives.
    pub fn parser<W: Write>(self, sink: W) -> BodyParser<W> {
        match self {
            Framing::Sized(size) => WithSize(SizedParser::new(size, sink)),
            Framing::Chunked(max_size) => Chunked(ChunksParser::new(max_size, sink)),
            Framing::Empty => Empty(sink)
        }
    }
}

/// Gets the value of a content-length header from the given header map. May return None if there's
/// no content-length header, or an error if the content-length value can not be parsed.
fn get_content_length(headers: &HeaderMap) -> Option<Result<u64, ParsingError>> {
    headers.get_first_header_value(&header::CONTENT_LENGTH)
        .map(|value| value.trim().parse().map_err(|_| ParsingError::InvalidHeaderValue))
}

/// Checks if the final transfer coding applied to the body is chunked.
fn is_chunked_transfer_encoding(headers: &HeaderMap) -> bool {
    headers.get(&header::TRANSFER_ENCODING)
        .and_then(|values| values.last())
        .and_then(|value| value.rsplit(',').next())
        .map(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}

/// Parser for a request body. Body bytes are written to the sink as they are read, and the sink
/// is handed back once the body is complete. Errors from the sink are returned like read errors.
pub enum BodyParser<W> {
    WithSize(SizedParser<W>),
    Chunked(ChunksParser<W>),
    Empty(W),
}

impl<W: Write> Parse<W> for BodyParser<W> {
    fn parse(self, reader: &mut impl BufRead) -> ParseResult<W, Self> {
        Ok(match self {
            WithSize(parser) => parser.parse(reader)?.map_blocked(WithSize),
            Chunked(parser) => parser.parse(reader)?.map_blocked(Chunked),
            Empty(sink) => Done(sink)
        })
    }
}

/// Reads exactly the given number of bytes.
pub struct SizedParser<W> {
    sink: W,
    remaining: u64,
}

impl<W> SizedParser<W> {
    /// Creates a parser for a body of the given size.
    pub fn new(size: u64, sink: W) -> SizedParser<W> {
        SizedParser { sink, remaining: size }
    }
}

impl<W: Write> Parse<W> for SizedParser<W> {
    fn parse(mut self, reader: &mut impl BufRead) -> ParseResult<W, Self> {
        match copy_exact(reader, &mut self.sink, &mut self.remaining) {
            Ok(()) => Ok(Done(self.sink)),
            Err(err) => Ok(IoErr(self, err))
        }
    }
}

/// Moves bytes from the reader into the sink until remaining reaches zero.
fn copy_exact(reader: &mut impl BufRead, sink: &mut impl Write, remaining: &mut u64) -> std::io::Result<()> {
    while *remaining > 0 {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Err(Error::from(ErrorKind::UnexpectedEof));
        }

        let amount = available.len().min(usize::try_from(*remaining).unwrap_or(usize::MAX));
        sink.write_all(&available[..amount])?;
        reader.consume(amount);
        *remaining -= amount as u64;
    }
    Ok(())
}

/// Chunked transfer-encoding body parser.
/// A chunked body might look like:
/// A\r\n
/// 0123456789\r\n
/// 0\r\n
/// \r\n
mod chunked {
    use std::io::{BufRead, Write};

    use crate::parse::body::chunked::State::{Data, Finished, Size, TailingCrlf, Trailers};
    use crate::parse::body::copy_exact;
    use crate::parse::error::ParsingError;
    use crate::parse::line::CrlfLineParser;
    use crate::parse::parse::{Parse, ParseResult};
    use crate::parse::parse::ParseStatus::{Done, IoErr};

    /// A parser for chunked transfer-encoding body.
    pub struct ChunksParser<W> {
        sink: W,
        received: u64,
        max_size: Option<u64>,
        state: State,
    }

    /// The state of the chunk parser.
    enum State {
        /// The size line of a chunk is being parsed.
        Size(CrlfLineParser),
        /// The content of the chunk is being copied. Holds the number of bytes left in the chunk.
        Data(u64),
        /// The CRLF after the content of a chunk is being parsed.
        TailingCrlf(CrlfLineParser),
        /// The last chunk has been read. Trailer fields are skipped until an empty line.
        Trailers(CrlfLineParser),
        Finished,
    }

    impl<W> ChunksParser<W> {
        /// Creates a new chunk parser.
        pub fn new(max_size: Option<u64>, sink: W) -> ChunksParser<W> {
            ChunksParser { sink, received: 0, max_size, state: Size(CrlfLineParser::new()) }
        }
    }

    impl<W: Write> Parse<W> for ChunksParser<W> {
        fn parse(self, reader: &mut impl BufRead) -> ParseResult<W, Self> {
            let ChunksParser { mut sink, mut received, max_size, mut state } = self;

            loop {
                let result = match state {
                    Size(parser) => match parser.parse(reader)? {
                        Done(raw) => {
                            let size = parse_chunk_size(&raw)?;
                            if max_size.map_or(false, |max| size > max - received) {
                                return Err(ParsingError::BodyTooLarge);
                            }
                            received = received.saturating_add(size);
                            Done(if size == 0 { Trailers(CrlfLineParser::new()) } else { Data(size) })
                        }
                        IoErr(parser, err) => IoErr(Size(parser), err)
                    },
                    Data(mut remaining) => match copy_exact(reader, &mut sink, &mut remaining) {
                        Ok(()) => Done(TailingCrlf(CrlfLineParser::new())),
                        Err(err) => IoErr(Data(remaining), err)
                    },
                    TailingCrlf(parser) => match parser.parse(reader)? {
                        Done(line) if !line.is_empty() => return Err(ParsingError::BadSyntax),
                        Done(_) => Done(Size(CrlfLineParser::new())),
                        IoErr(parser, err) => IoErr(TailingCrlf(parser), err)
                    },
                    Trailers(parser) => match parser.parse(reader)? {
                        Done(line) if line.is_empty() => Done(Finished),
                        Done(_) => Done(Trailers(CrlfLineParser::new())),
                        IoErr(parser, err) => IoErr(Trailers(parser), err)
                    },
                    Finished => return Ok(Done(sink))
                };

                state = match result {
                    Done(state) => state,
                    IoErr(state, err) => return Ok(IoErr(ChunksParser { sink, received, max_size, state }, err))
                }
            }
        }
    }

    /// Parses the chunk size from a size line, ignoring any chunk extensions.
    fn parse_chunk_size(raw: &str) -> Result<u64, ParsingError> {
        let size = raw.split(';').next().unwrap_or_default().trim();
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsingError::InvalidChunkSize);
        }
        u64::from_str_radix(size, 16).map_err(|_| ParsingError::InvalidChunkSize)
    }
}
