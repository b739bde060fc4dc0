use std::io::{BufRead, BufReader, Read, Result, Write};

use crate::server::nonblocking_buf_writer::NonBlockingBufWriter;

/// A stream that can be read and written.
pub trait Stream: Read + Write {}

impl<T: Read + Write> Stream for T {}

/// A stream that supports buffered reading, and writes that may be held back when the peer is slow.
pub trait BufStream: BufRead + Write {
    /// Checks if written data is still waiting to be handed to the underlying stream.
    fn has_pending_writes(&self) -> bool;
}

/// Wraps a stream with a read buffer and a non-blocking write buffer.
pub struct BufferedStream<T: Stream> {
    inner: NonBlockingBufWriter<WriteThrough<T>>,
}

/// A buffered reader that passes writes straight to the stream it reads from.
struct WriteThrough<T>(BufReader<T>);

impl<T: Stream> BufferedStream<T> {
    /// Creates a new buffered stream with the given buffer sizes.
    pub fn with_capacity(read_capacity: usize, write_capacity: usize, stream: T) -> BufferedStream<T> {
        let reader = WriteThrough(BufReader::with_capacity(read_capacity, stream));
        BufferedStream { inner: NonBlockingBufWriter::with_capacity(write_capacity, reader) }
    }

    fn reader(&mut self) -> &mut BufReader<T> {
        &mut self.inner.get_mut().0
    }
}

impl<T: Stream> Read for BufferedStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader().read(buf)
    }
}

impl<T: Stream> BufRead for BufferedStream<T> {
    fn fill_buf(&mut self) -> Result<&[u8]> {
        self.reader().fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader().consume(amt)
    }
}

impl<T: Stream> Write for BufferedStream<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<T: Stream> BufStream for BufferedStream<T> {
    fn has_pending_writes(&self) -> bool {
        self.inner.has_pending()
    }
}

impl<T: Write> Write for WriteThrough<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.0.get_mut().write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.0.get_mut().flush()
    }
}
