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

//! Fixed length stream layer.

use std::io::{self, Read};

use crate::error::Error;
use crate::source::Source;

/// Stream layer exposing exactly the next `length` bytes of its source.
///
/// Used to hand a record payload of declared size to payload consumers: the
/// consumer sees end of stream at the record boundary even though the wrapped
/// source continues with the next record.
#[derive(Debug)]
pub struct FixedLengthSource<S> {
    inner: S,
    length: u64,
    consumed: u64,
    closed: bool,
}

impl<S: Source> FixedLengthSource<S> {
    pub fn new(inner: S, length: u64) -> Self {
        FixedLengthSource {
            inner,
            length,
            consumed: 0,
            closed: false,
        }
    }

    /// Declared length.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Bytes left before the fixed length is reached.
    pub fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.consumed)
    }

    /// Skip to the end of the fixed region without closing the source.
    ///
    /// Returns the number of bytes skipped, less than `remaining()` if the
    /// source ended early.
    pub fn skip_remaining(&mut self) -> io::Result<u64> {
        let remaining = self.remaining();
        self.skip(remaining)
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Source> Read for FixedLengthSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        let want = (buf.len() as u64).min(self.remaining()) as usize;
        if want == 0 {
            return Ok(0);
        }
        let n = self.inner.read(&mut buf[..want])?;
        self.consumed += n as u64;
        Ok(n)
    }
}

impl<S: Source> Source for FixedLengthSource<S> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        let n = n.min(self.remaining());
        if n == 0 {
            return Ok(0);
        }
        let skipped = self.inner.skip(n)?;
        self.consumed += skipped;
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
