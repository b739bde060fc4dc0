use std::cmp::min;
use std::fs::File;
use std::io::{Error, ErrorKind, Read, Write};
use std::net::SocketAddr;

use crate::common::request::Request;
use crate::parse::body::{BodyParser, Framing};
use crate::parse::error::ParsingError;
use crate::parse::parse::{Parse, ParseStatus};
use crate::parse::request::RequestParser;
use crate::server::connection::ReadRequestError::{IoErr, ParseErr};
use crate::server::connection::ReadRequestResult::{Closed, Error as ReadError, NotReady, Ready};
use crate::server::router::BodySink;
use crate::util::stream::BufStream;

/// Size of the chunks a file body is read in.
const FILE_CHUNK_SIZE: usize = 16 * 1024;

/// The result of attempting to read a request.
pub enum ReadRequestResult {
    /// There is not enough data yet for a request to be fully read.
    NotReady,
    /// A new request has been read. Its body was written into the sink.
    Ready(Request, BodySink),
    /// An error occurred while trying to read a request.
    Error(ReadRequestError),
    /// The connection was closed.
    Closed,
}

/// An error that may result from trying to read a request.
#[derive(Debug)]
pub enum ReadRequestError {
    /// An error in parsing the request.
    ParseErr(ParsingError),
    /// An unhandled IO error.
    IoErr(std::io::Error),
}

/// The part of a request being read.
enum ReadState {
    Head(RequestParser),
    Body(Request, BodyParser<BodySink>),
}

/// A file body that is still being sent.
struct OutgoingFile {
    file: File,
    remaining: u64,
}

/// A connection to a client. The main purpose of this is to store the state of asynchronous IO:
/// a partially read request, a partially sent file, and whether the connection closes once
/// everything queued has been sent.
pub struct Connection<S: BufStream> {
    /// The address of the client.
    pub addr: SocketAddr,
    stream: S,
    reading: Option<ReadState>,
    max_body_size: Option<u64>,
    outgoing: Option<OutgoingFile>,
    closing: bool,
}

impl<S: BufStream> Connection<S> {
    /// Creates a new connection out of the given address and stream.
    /// Request bodies larger than max_body_size, if given, are rejected.
    pub fn new(addr: SocketAddr, stream: S, max_body_size: Option<u64>) -> Connection<S> {
        Connection {
            addr,
            stream,
            reading: None,
            max_body_size,
            outgoing: None,
            closing: false,
        }
    }

    /// Attempts to read a request from the underlying stream. Once the head of a request is parsed,
    /// open_body is called to get the sink its body is written into as it arrives.
    pub fn read_request(&mut self, mut open_body: impl FnMut(&Request) -> BodySink) -> ReadRequestResult {
        let mut state = self.reading.take().unwrap_or_else(|| ReadState::Head(RequestParser::new()));

        loop {
            state = match state {
                ReadState::Head(parser) => match parser.parse(&mut self.stream) {
                    Ok(ParseStatus::Done(head)) => {
                        // the framing is checked before anything is opened for the body
                        let framing = match Framing::from_headers(&head.headers, self.max_body_size) {
                            Ok(framing) => framing,
                            Err(err) => return ReadError(ParseErr(err))
                        };
                        let sink = open_body(&head);
                        ReadState::Body(head, framing.parser(sink))
                    }
                    Ok(ParseStatus::IoErr(parser, err)) => return self.blocked(ReadState::Head(parser), err),
                    Err(err) => return ReadError(ParseErr(err))
                },
                ReadState::Body(head, parser) => return match parser.parse(&mut self.stream) {
                    Ok(ParseStatus::Done(sink)) => Ready(head, sink),
                    Ok(ParseStatus::IoErr(parser, err)) => self.blocked(ReadState::Body(head, parser), err),
                    Err(err) => ReadError(ParseErr(err))
                }
            }
        }
    }

    /// Handles an IO error that stopped a read. The read is resumed later if the stream blocked.
    fn blocked(&mut self, state: ReadState, err: std::io::Error) -> ReadRequestResult {
        if err.kind() == ErrorKind::WouldBlock {
            self.reading = Some(state);
            NotReady
        } else if is_closed(&state, &err) {
            Closed
        } else {
            ReadError(IoErr(err))
        }
    }

    /// Queues the given file to be sent after everything already written. Only the first len bytes are sent.
    pub fn stream_file(&mut self, file: File, len: u64) {
        self.outgoing = Some(OutgoingFile { file, remaining: len });
    }

    /// Sends queued data until everything is sent or the stream blocks.
    /// Returns true if everything has been handed to the underlying stream.
    pub fn send_pending(&mut self) -> std::io::Result<bool> {
        let mut chunk = vec![0u8; FILE_CHUNK_SIZE];

        loop {
            self.stream.flush()?;
            if self.stream.has_pending_writes() {
                return Ok(false);
            }

            let outgoing = match &mut self.outgoing {
                Some(outgoing) if outgoing.remaining > 0 => outgoing,
                _ => {
                    self.outgoing = None;
                    return Ok(true);
                }
            };

            let max = min(chunk.len() as u64, outgoing.remaining) as usize;
            let amount = outgoing.file.read(&mut chunk[..max])?;
            if amount == 0 {
                self.outgoing = None;
                return Err(Error::new(ErrorKind::UnexpectedEof, "file is shorter than its declared length"));
            }

            outgoing.remaining -= amount as u64;
            self.stream.write_all(&chunk[..amount])?;
        }
    }

    /// Marks the connection to be closed once everything queued has been sent.
    pub fn close_after_sending(&mut self) {
        self.closing = true;
    }

    /// Checks if the connection closes once everything queued has been sent.
    pub fn is_closing(&self) -> bool {
        self.closing
    }
}

impl<S: BufStream> Write for Connection<S> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}

/// Checks if the given IO error and read state indicates the connection has closed.
fn is_closed(state: &ReadState, error: &std::io::Error) -> bool {
    // EOF between requests is a normal close
    let between_requests = matches!(state, ReadState::Head(parser) if !parser.has_data());
    (error.kind() == ErrorKind::UnexpectedEof && between_requests)
        || error.kind() == ErrorKind::ConnectionAborted
        || error.kind() == ErrorKind::ConnectionReset
}
