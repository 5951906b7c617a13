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

//! Counting stream layer with bounded pushback.

use std::io::{self, Read};

use crate::counting::Counters;
use crate::error::{Error, Result};
use crate::source::Source;

/// Default pushback capacity used by the header parsers.
pub const DEFAULT_PUSHBACK_SIZE: usize = 8192;

/// Counting stream that can take back a bounded number of bytes.
///
/// Bytes handed back via [`unread`](Self::unread) are re-delivered by the next
/// reads in the same order and are subtracted from `consumed()` again, so the
/// counters always describe the position of the caller, not of the wrapped
/// source. Pushback is limited by the capacity given at construction and by the
/// number of bytes read so far.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use warcstream::PushbackCountingSource;
///
/// let mut source = PushbackCountingSource::new(&b"WARC/1.0\r\n"[..], 16).unwrap();
/// let mut magic = [0u8; 4];
/// source.read_exact(&mut magic).unwrap();
/// source.unread(&magic).unwrap();
/// assert_eq!(source.consumed(), 0);
/// assert_eq!(source.read_raw_line().unwrap().unwrap(), b"WARC/1.0\r\n");
/// ```
#[derive(Debug)]
pub struct PushbackCountingSource<S> {
    inner: S,
    capacity: usize,
    // Next byte to deliver is at the end.
    pushback: Vec<u8>,
    counters: Counters,
    closed: bool,
}

impl<S: Source> PushbackCountingSource<S> {
    /// Wrap `inner` with a pushback buffer of `capacity` bytes.
    pub fn new(inner: S, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("pushback capacity must be positive"));
        }
        Ok(PushbackCountingSource {
            inner,
            capacity,
            pushback: Vec::with_capacity(capacity.min(DEFAULT_PUSHBACK_SIZE)),
            counters: Counters::default(),
            closed: false,
        })
    }

    /// Wrap `inner` with a pushback buffer of [`DEFAULT_PUSHBACK_SIZE`] bytes.
    pub fn with_default_capacity(inner: S) -> Self {
        PushbackCountingSource {
            inner,
            capacity: DEFAULT_PUSHBACK_SIZE,
            pushback: Vec::with_capacity(DEFAULT_PUSHBACK_SIZE),
            counters: Counters::default(),
            closed: false,
        }
    }

    pub fn consumed(&self) -> u64 {
        self.counters.consumed
    }

    pub fn counter(&self) -> u64 {
        self.counters.counter
    }

    pub fn set_counter(&mut self, counter: u64) {
        self.counters.counter = counter;
    }

    /// Total pushback capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes currently pushed back.
    pub fn buffered(&self) -> usize {
        self.pushback.len()
    }

    /// Free pushback space.
    pub fn available_pushback(&self) -> usize {
        self.capacity - self.pushback.len()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner source. Pushed back bytes are lost.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Always `false`, lookahead is done with [`unread`](Self::unread).
    pub fn mark_supported(&self) -> bool {
        false
    }

    /// Fails with [`Error::MarkNotSupported`].
    pub fn reset(&mut self) -> Result<()> {
        Err(Error::MarkNotSupported)
    }

    /// Read a single byte, `None` at end of stream.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Push back a single byte.
    pub fn unread_byte(&mut self, byte: u8) -> Result<()> {
        self.unread(&[byte])
    }

    /// Push back `bytes`; `bytes[0]` will be the next byte read.
    pub fn unread(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        let free = self.available_pushback();
        if bytes.len() > free {
            tracing::debug!(requested = bytes.len(), free, "unread rejected, pushback full");
            return Err(Error::PushbackOverflow {
                requested: bytes.len(),
                free,
            });
        }
        if bytes.len() as u64 > self.counters.consumed {
            tracing::debug!(
                requested = bytes.len(),
                consumed = self.counters.consumed,
                "unread rejected, more than consumed"
            );
            return Err(Error::UnreadBeyondConsumed {
                requested: bytes.len(),
                consumed: self.counters.consumed,
            });
        }
        self.pushback.extend(bytes.iter().rev());
        self.counters.retreat(bytes.len() as u64);
        Ok(())
    }

    /// Look at the next `buf.len()` bytes without consuming them.
    ///
    /// Returns fewer bytes only at end of stream.
    pub fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() > self.capacity {
            return Err(Error::PushbackOverflow {
                requested: buf.len(),
                free: self.capacity,
            });
        }
        let n = self.read_fully(buf)?;
        self.unread(&buf[..n])?;
        Ok(n)
    }

    /// Fill `buf` as far as the stream allows.
    ///
    /// Unlike [`Read::read_exact`] hitting the end of stream is not an error,
    /// the number of bytes read is returned instead.
    pub fn read_fully(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    /// Read at most `n` bytes.
    pub fn read_up_to(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let read = self.read_fully(&mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }

    /// Read the bytes up to and including the next LF.
    ///
    /// The last line of a stream may lack the LF. Returns `None` at end of
    /// stream.
    pub fn read_raw_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        while let Some(byte) = self.read_byte()? {
            line.push(byte);
            if byte == b'\n' {
                break;
            }
        }
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        Ok(())
    }
}

impl<S: Source> Read for PushbackCountingSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if buf.is_empty() {
            return Ok(0);
        }
        let n = if self.pushback.is_empty() {
            self.inner.read(buf)?
        } else {
            let n = buf.len().min(self.pushback.len());
            for slot in &mut buf[..n] {
                // Non-empty, checked above.
                *slot = self.pushback.pop().unwrap_or_default();
            }
            n
        };
        self.counters.advance(n as u64);
        Ok(n)
    }
}

impl<S: Source> Source for PushbackCountingSource<S> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        self.ensure_open()?;
        let from_pushback = (self.pushback.len() as u64).min(n);
        self.pushback.truncate(self.pushback.len() - from_pushback as usize);
        let from_inner = if from_pushback < n {
            self.inner.skip(n - from_pushback)?
        } else {
            0
        };
        let skipped = from_pushback + from_inner;
        self.counters.advance(skipped);
        Ok(skipped)
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.pushback.clear();
            self.inner.close()?;
        }
        Ok(())
    }
}
