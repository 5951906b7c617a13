// Copyright 2025 Janek Bevendorff
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The [`Source`] capability shared by every stream layer.

use std::io::{self, Cursor, Read};

use crate::error::Error;

/// Size of the scratch buffer used when skipping by reading.
pub(crate) const SKIP_BUFFER_SIZE: usize = 8192;

/// Sequential byte producer.
///
/// Extends [`Read`] with an explicit `skip` and an idempotent `close`. Every
/// layer in this crate wraps another `Source` and forwards `close` to it
/// exactly once.
pub trait Source: Read {
    /// Skip up to `n` bytes and return how many were actually skipped.
    ///
    /// Returns less than `n` only at end of stream.
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        skip_by_reading(self, n)
    }

    /// Release the source. Calling this more than once has no further effect.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Skip `n` bytes by reading and discarding them.
pub(crate) fn skip_by_reading<R: Read + ?Sized>(reader: &mut R, n: u64) -> io::Result<u64> {
    let mut scratch = [0u8; SKIP_BUFFER_SIZE];
    let mut skipped = 0u64;
    while skipped < n {
        let want = (n - skipped).min(SKIP_BUFFER_SIZE as u64) as usize;
        match reader.read(&mut scratch[..want]) {
            Ok(0) => break,
            Ok(read) => skipped += read as u64,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(skipped)
}

impl Source for &[u8] {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let len = (self.len() as u64).min(n) as usize;
        *self = &self[len..];
        Ok(len as u64)
    }
}

impl<T: AsRef<[u8]>> Source for Cursor<T> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        let pos = self.position().min(len);
        let skipped = (len - pos).min(n);
        self.set_position(pos + skipped);
        Ok(skipped)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        (**self).skip(n)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        (**self).skip(n)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapter turning any [`Read`] into a [`Source`].
///
/// Closing drops the wrapped reader, which releases files and sockets.
///
/// Line and newline parsing pull one byte at a time, so unbuffered readers
/// such as [`std::fs::File`] or a `TcpStream` should be wrapped in a
/// [`std::io::BufReader`] first.
///
/// ```
/// use std::io::{BufReader, Cursor};
/// use warcstream::{HeaderLineReader, PushbackCountingSource, ReadSource, ReaderConfig};
///
/// let file = Cursor::new(b"WARC/1.0\r\n".to_vec());
/// let source = ReadSource::new(BufReader::new(file));
/// let mut source = PushbackCountingSource::with_default_capacity(source);
/// let reader = HeaderLineReader::new(ReaderConfig::line(Default::default()));
/// let line = reader.read_line(&mut source).unwrap().unwrap();
/// assert_eq!(line.line(), Some("WARC/1.0"));
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: Option<R>,
}

impl<R: Read> ReadSource<R> {
    /// Wrap an open reader.
    pub fn new(inner: R) -> Self {
        ReadSource { inner: Some(inner) }
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Unwrap the reader, `None` once closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read> Read for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Err(Error::Closed.into()),
        }
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn close(&mut self) -> io::Result<()> {
        self.inner.take();
        Ok(())
    }
}
