use std::cell::RefCell;
use std::cmp::min;
use std::io::{Error, ErrorKind, Read, Write};
use std::rc::Rc;

/// A reader that hands out the given chunks of data in order, one chunk per read at most.
/// An empty chunk reads as EOF. Once all chunks are read the reader either reports EOF or blocks.
pub struct MockReader {
    pub return_would_block_when_empty: bool,
    pub data: Vec<Vec<u8>>,
}

impl MockReader {
    pub fn from_strs(data: Vec<&str>) -> MockReader {
        MockReader::from_bytes(data.into_iter().map(str::as_bytes).collect())
    }

    pub fn from_bytes(data: Vec<&[u8]>) -> MockReader {
        MockReader { data: data.into_iter().map(<[u8]>::to_vec).collect(), return_would_block_when_empty: false }
    }
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let next = match self.data.first_mut() {
            Some(next) => next,
            None if self.return_would_block_when_empty => return Err(Error::from(ErrorKind::WouldBlock)),
            None => return Ok(0)
        };

        let amount = min(buf.len(), next.len());
        buf[..amount].copy_from_slice(&next[..amount]);
        next.drain(..amount);

        if next.is_empty() {
            self.data.remove(0);
        }

        Ok(amount)
    }
}

/// A reader that hands out some finite data, then repeats a sequence forever.
pub struct EndlessMockReader {
    finite_reader: MockReader,
    sequence: Vec<u8>,
    current: usize,
}

impl EndlessMockReader {
    pub fn from_strs(finite_data: Vec<&str>, sequence: &str) -> EndlessMockReader {
        EndlessMockReader { finite_reader: MockReader::from_strs(finite_data), sequence: sequence.as_bytes().to_vec(), current: 0 }
    }
}

impl Read for EndlessMockReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.finite_reader.read(buf)?;
        if size > 0 {
            return Ok(size);
        }

        let start = self.current;
        let amount = min(self.sequence.len() - start, buf.len());
        buf[..amount].copy_from_slice(&self.sequence[start..start + amount]);
        self.current = (start + amount) % self.sequence.len();
        Ok(amount)
    }
}

/// A writer that records each write and flush. Clones of "written" and "flushed" can be kept to
/// inspect the output after the writer is moved.
pub struct MockWriter {
    pub written: Rc<RefCell<Vec<Vec<u8>>>>,
    pub flushed: Rc<RefCell<Vec<Vec<u8>>>>,
    /// Bytes that can still be written before writes start to block. None means unlimited.
    pub capacity: Rc<RefCell<Option<usize>>>,
}

impl MockWriter {
    pub fn new() -> MockWriter {
        MockWriter { written: Rc::default(), flushed: Rc::default(), capacity: Rc::default() }
    }

    /// Creates a writer that blocks once the given number of bytes have been written.
    /// The capacity can be raised later through the "capacity" handle.
    pub fn blocking_after(capacity: usize) -> MockWriter {
        let writer = MockWriter::new();
        writer.capacity.replace(Some(capacity));
        writer
    }

    /// All bytes written so far, flushed or not.
    pub fn all_bytes(&self) -> Vec<u8> {
        let mut bytes = self.flushed.borrow().concat();
        bytes.extend(self.written.borrow().concat());
        bytes
    }
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let amount = match *self.capacity.borrow() {
            Some(0) => return Err(Error::from(ErrorKind::WouldBlock)),
            Some(capacity) => min(capacity, buf.len()),
            None => buf.len()
        };
        if let Some(capacity) = self.capacity.borrow_mut().as_mut() {
            *capacity -= amount;
        }
        self.written.borrow_mut().push(buf[..amount].to_vec());
        Ok(amount)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut written = self.written.borrow_mut();
        self.flushed.borrow_mut().append(&mut written);
        Ok(())
    }
}

/// Joins a reader and a writer into one stream.
pub struct MockStream<R, W> {
    pub reader: R,
    pub writer: W,
}

impl<R, W> MockStream<R, W> {
    pub fn new(reader: R, writer: W) -> MockStream<R, W> {
        MockStream { reader, writer }
    }
}

impl<R: Read, W> Read for MockStream<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for MockStream<R, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{ErrorKind, Read, Write};

    use crate::util::mock::{EndlessMockReader, MockReader, MockWriter};

    fn test_read(reader: &mut impl Read, expected: &str, buf_size: usize) {
        let mut buf = vec![0u8; buf_size];
        let len = reader.read(&mut buf).unwrap();
        assert_eq!(expected, String::from_utf8_lossy(&buf[..len]));
    }

    #[test]
    fn mock_reader_chunks_then_blocks() {
        let mut reader = MockReader::from_strs(vec!["hello", "world"]);
        reader.return_would_block_when_empty = true;

        test_read(&mut reader, "hel", 3);
        test_read(&mut reader, "lo", 10);
        test_read(&mut reader, "world", 10);
        assert_eq!(ErrorKind::WouldBlock, reader.read(&mut [0u8; 4]).unwrap_err().kind());
    }

    #[test]
    fn endless_mock_reader() {
        let mut reader = EndlessMockReader::from_strs(vec!["hello", "world"], "blah");

        test_read(&mut reader, "hello", 5);
        test_read(&mut reader, "wor", 3);
        test_read(&mut reader, "ld", 3);
        test_read(&mut reader, "blah", 10);
        test_read(&mut reader, "bla", 3);
        test_read(&mut reader, "h", 3);
        test_read(&mut reader, "b", 1);
        test_read(&mut reader, "lah", 3);

        for _ in 0..100 {
            test_read(&mut reader, "blah", 10);
        }
    }

    #[test]
    fn mock_writer_blocks_at_capacity() {
        let mut writer = MockWriter::blocking_after(5);

        assert_eq!(3, writer.write(b"abc").unwrap());
        assert_eq!(2, writer.write(b"defg").unwrap());
        assert_eq!(ErrorKind::WouldBlock, writer.write(b"h").unwrap_err().kind());

        writer.capacity.replace(None);
        writer.write_all(b"h").unwrap();

        assert_eq!(b"abcdeh".to_vec(), writer.all_bytes());
    }
}
