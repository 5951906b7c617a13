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

//! Digest computing stream layer.

use std::io::{self, Read};

use sha1::digest::Digest;

use crate::error::Error;
use crate::source::{skip_by_reading, Source};

/// Stream layer feeding every delivered byte into a digest.
///
/// The digest implementation is chosen by the caller. Skipping is done by
/// reading, so skipped bytes are hashed too and the digest only depends on the
/// byte sequence, not on how it was consumed.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use sha1::{Digest, Sha1};
/// use warcstream::{DigestingSource, Source};
///
/// let mut source = DigestingSource::new(&b"hello world"[..], Sha1::new());
/// source.skip(6).unwrap();
/// let mut rest = Vec::new();
/// source.read_to_end(&mut rest).unwrap();
/// assert_eq!(source.finalize(), Sha1::digest(b"hello world").as_slice().to_vec());
/// ```
#[derive(Debug)]
pub struct DigestingSource<S, D> {
    inner: S,
    digest: D,
    closed: bool,
}

impl<S: Source, D: Digest> DigestingSource<S, D> {
    pub fn new(inner: S, digest: D) -> Self {
        DigestingSource {
            inner,
            digest,
            closed: false,
        }
    }

    /// The running digest state.
    pub fn digest_ref(&self) -> &D {
        &self.digest
    }

    /// Digest of all bytes delivered so far. Hashing continues afterwards.
    pub fn digest(&self) -> Vec<u8>
    where
        D: Clone,
    {
        self.digest.clone().finalize().as_slice().to_vec()
    }

    /// Finish hashing and return the digest.
    pub fn finalize(self) -> Vec<u8> {
        self.digest.finalize().as_slice().to_vec()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_parts(self) -> (S, D) {
        (self.inner, self.digest)
    }
}

impl<S: Source, D: Digest> Read for DigestingSource<S, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.digest.update(&buf[..n]);
        }
        Ok(n)
    }
}

impl<S: Source, D: Digest> Source for DigestingSource<S, D> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        skip_by_reading(self, n)
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.inner.close()?;
        }
        Ok(())
    }
}
