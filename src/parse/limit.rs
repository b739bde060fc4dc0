use std::fmt::{Display, Formatter};
use std::io::{BufRead, Error, ErrorKind, Read};

/// The error carried inside an IO error when a limited reader runs out of budget.
#[derive(Debug)]
pub struct LimitReached;

impl Display for LimitReached {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("read limit reached")
    }
}

impl std::error::Error for LimitReached {}

/// Checks if the given IO error came from a limited reader running out of budget.
pub fn is_limit_reached(error: &Error) -> bool {
    error.get_ref().map(|inner| inner.is::<LimitReached>()).unwrap_or(false)
}

/// Adds a .limited() adapter to readers.
pub trait ReadLimitExt: Sized {
    /// Like .take(), but fails with a LimitReached error instead of reporting EOF when the limit is spent.
    fn limited(self, limit: usize) -> Limited<Self>;
}

impl<T: Read> ReadLimitExt for T {
    fn limited(self, limit: usize) -> Limited<Self> {
        Limited { inner: self, remaining: limit }
    }
}

/// A reader that may only read a fixed number of bytes.
pub struct Limited<T> {
    inner: T,
    remaining: usize,
}

impl<T> Limited<T> {
    /// Fails if the budget is spent.
    fn check(&self) -> std::io::Result<()> {
        match self.remaining {
            0 => Err(Error::new(ErrorKind::Other, LimitReached)),
            _ => Ok(())
        }
    }
}

impl<T: Read> Read for Limited<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.check()?;
        let max = buf.len().min(self.remaining);
        let amount = self.inner.read(&mut buf[..max])?;
        self.remaining -= amount;
        Ok(amount)
    }
}

impl<T: BufRead> BufRead for Limited<T> {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.check()?;
        let remaining = self.remaining;
        let buf = self.inner.fill_buf()?;
        Ok(&buf[..buf.len().min(remaining)])
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.remaining);
        self.remaining -= amt;
        self.inner.consume(amt);
    }
}
