use std::io::{ErrorKind, Result, Write};

/// A buffered writer that handles WouldBlock errors.
/// WouldBlock errors simply stop execution of either a flush or a write, and remaining unwritten
/// data is stored in a buffer. Writes therefore never block, and callers that stream large
/// bodies should check has_pending before writing more.
pub struct NonBlockingBufWriter<T> {
    buf: Vec<u8>,
    pos: usize,
    inner: T,
}

impl<T: Write> NonBlockingBufWriter<T> {
    /// Creates a new writer with a buffer that has the given capacity.
    pub fn with_capacity(capacity: usize, inner: T) -> NonBlockingBufWriter<T> {
        NonBlockingBufWriter { pos: 0, buf: Vec::with_capacity(capacity), inner }
    }

    /// Gets a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Checks if there is buffered data the underlying writer has not accepted yet.
    pub fn has_pending(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Writes the contents of the buffer to the underlying writer.
    /// May only partially flush if the underlying writer blocks.
    fn flush_buf(&mut self) -> Result<()> {
        let amount = write_until_blocked(&mut self.inner, &self.buf[self.pos..])?;

        self.pos += amount;

        if self.pos >= self.buf.len() {
            self.pos = 0;
            self.buf.clear();
        }

        Ok(())
    }

    /// Flushes the underlying writer. If the underlying writer blocks when flushed, then Ok is
    /// still returned.
    fn flush_inner(&mut self) -> Result<()> {
        match self.inner.flush() {
            Err(error) if error.kind() == ErrorKind::WouldBlock => Ok(()),
            x => x
        }
    }
}

impl<T: Write> Write for NonBlockingBufWriter<T> {
    fn write(&mut self, mut buf: &[u8]) -> Result<usize> {
        let len = buf.len();
        if self.buf.len() + buf.len() > self.buf.capacity() {
            self.flush_buf()?;
            // large writes skip the buffer when nothing is queued ahead of them
            if !self.has_pending() && buf.len() > self.buf.capacity() {
                let amount = write_until_blocked(&mut self.inner, buf)?;
                buf = &buf[amount..];
            }
        }
        self.buf.extend_from_slice(buf);
        Ok(len)
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_buf()?;
        self.flush_inner()
    }
}

/// Writes the given data to the given writer until completion or until the writer blocks.
fn write_until_blocked<W: Write>(writer: &mut W, buf: &[u8]) -> Result<usize> {
    let mut pos = 0;
    while pos != buf.len() {
        match writer.write(&buf[pos..]) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(amount) => pos += amount,
            Err(error) if error.kind() == ErrorKind::WouldBlock => return Ok(pos),
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => return Err(error)
        }
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::ops::Deref;

    use crate::server::nonblocking_buf_writer::NonBlockingBufWriter;
    use crate::util::mock::MockWriter;

    #[test]
    fn writes_and_flushes_with_no_blocking() {
        let writer = MockWriter::new();
        let written = writer.written.clone();
        let flushed = writer.flushed.clone();

        let mut writer = NonBlockingBufWriter::with_capacity(16, writer);

        writer.write_all(b"hello 1").unwrap();
        writer.write_all(b"hello 2").unwrap();

        assert!(written.borrow().is_empty());

        writer.write_all(b"hello 3").unwrap();

        assert_eq!(written.borrow().deref(), &vec![b"hello 1hello 2".to_vec()]);

        writer.write_all(b"this is big and wont fit in the buffer").unwrap();

        assert_eq!(written.borrow().deref(), &vec![b"hello 1hello 2".to_vec(), b"hello 3".to_vec(), b"this is big and wont fit in the buffer".to_vec()]);

        writer.flush().unwrap();

        assert_eq!(flushed.borrow().deref(), &vec![b"hello 1hello 2".to_vec(), b"hello 3".to_vec(), b"this is big and wont fit in the buffer".to_vec()]);
        assert!(!writer.has_pending());
    }

    #[test]
    fn keeps_data_when_blocked() {
        let writer = MockWriter::blocking_after(4);
        let capacity = writer.capacity.clone();

        let mut writer = NonBlockingBufWriter::with_capacity(8, writer);

        writer.write_all(b"0123456789abcdef").unwrap();
        writer.flush().unwrap();

        assert!(writer.has_pending());
        assert_eq!(b"0123".to_vec(), writer.get_mut().all_bytes());

        capacity.replace(None);
        writer.flush().unwrap();

        assert!(!writer.has_pending());
        assert_eq!(b"0123456789abcdef".to_vec(), writer.get_mut().all_bytes());
    }

    #[test]
    fn writes_queue_behind_pending_data() {
        let writer = MockWriter::blocking_after(2);
        let capacity = writer.capacity.clone();

        let mut writer = NonBlockingBufWriter::with_capacity(4, writer);

        writer.write_all(b"abcdef").unwrap();
        writer.write_all(b"ghijkl").unwrap();

        capacity.replace(None);
        writer.flush().unwrap();

        assert_eq!(b"abcdefghijkl".to_vec(), writer.get_mut().all_bytes());
    }
}
