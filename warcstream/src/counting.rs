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

//! Byte counting stream layer.

use std::io::{self, Read};

use crate::error::Error;
use crate::source::Source;

/// Absolute and relative byte offsets of a counting layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    pub(crate) consumed: u64,
    pub(crate) counter: u64,
}

impl Counters {
    #[inline]
    pub(crate) fn advance(&mut self, n: u64) {
        self.consumed += n;
        self.counter = self.counter.saturating_add(n);
    }

    #[inline]
    pub(crate) fn retreat(&mut self, n: u64) {
        self.consumed -= n;
        self.counter = self.counter.saturating_sub(n);
    }
}

/// Stream layer tracking how many bytes were delivered to the caller.
///
/// `consumed()` is the absolute offset since construction. `counter()` starts
/// out equal to it but can be moved with [`set_counter`](Self::set_counter),
/// e.g. to measure a record payload from zero.
#[derive(Debug)]
pub struct CountingSource<S> {
    inner: S,
    counters: Counters,
    closed: bool,
}

impl<S: Source> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        CountingSource {
            inner,
            counters: Counters::default(),
            closed: false,
        }
    }

    /// Bytes delivered via read or skip since construction.
    pub fn consumed(&self) -> u64 {
        self.counters.consumed
    }

    /// Relative offset.
    pub fn counter(&self) -> u64 {
        self.counters.counter
    }

    /// Set the relative offset to an arbitrary value.
    pub fn set_counter(&mut self, counter: u64) {
        self.counters.counter = counter;
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        Ok(())
    }
}

impl<S: Source> Read for CountingSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        let n = self.inner.read(buf)?;
        self.counters.advance(n as u64);
        Ok(n)
    }
}

impl<S: Source> Source for CountingSource<S> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        self.ensure_open()?;
        let skipped = self.inner.skip(n)?;
        self.counters.advance(skipped);
        Ok(skipped)
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.inner.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_reads_and_skips() {
        let mut source = CountingSource::new(&b"0123456789"[..]);
        let mut buf = [0u8; 3];
        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(source.skip(4).unwrap(), 4);
        assert_eq!(source.consumed(), 7);
        assert_eq!(source.counter(), 7);

        source.set_counter(0);
        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(source.counter(), 3);
        assert_eq!(source.consumed(), 10);

        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert_eq!(source.skip(5).unwrap(), 0);
        assert_eq!(source.consumed(), 10);
    }

    #[test]
    fn counter_saturates_near_max() {
        let mut source = CountingSource::new(&b"abcd"[..]);
        source.set_counter(u64::MAX - 1);
        assert_eq!(source.read(&mut [0u8; 2]).unwrap(), 2);
        assert_eq!(source.counter(), u64::MAX);
        assert_eq!(source.skip(2).unwrap(), 2);
        assert_eq!(source.counter(), u64::MAX);
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn close_is_idempotent_and_blocks_reads() {
        let mut source = CountingSource::new(&b"abc"[..]);
        source.close().unwrap();
        source.close().unwrap();
        assert!(source.read(&mut [0u8; 1]).is_err());
        assert!(source.skip(1).is_err());
    }
}
