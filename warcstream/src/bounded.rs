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

//! Length-capped stream layer with optional recording.

use std::io::{self, Read};

use crate::error::Error;
use crate::source::{skip_by_reading, Source};

/// Stream layer delivering at most `max_length` bytes.
///
/// Once the cap is reached reads report end of stream and skips return 0,
/// whatever the wrapped source still holds. With recording enabled every
/// delivered byte (skipped ones included) is kept and can be retrieved with
/// [`recording`](Self::recording), which header parsers use to keep the raw
/// bytes of a block they could not make sense of.
#[derive(Debug)]
pub struct BoundedRecordingSource<S> {
    inner: S,
    max_length: u64,
    delivered: u64,
    recording: Option<Vec<u8>>,
    closed: bool,
}

impl<S: Source> BoundedRecordingSource<S> {
    /// Cap `inner` at `max_length` bytes without recording.
    pub fn new(inner: S, max_length: u64) -> Self {
        BoundedRecordingSource {
            inner,
            max_length,
            delivered: 0,
            recording: None,
            closed: false,
        }
    }

    /// Cap `inner` at `max_length` bytes and record everything read.
    pub fn with_recording(inner: S, max_length: u64) -> Self {
        BoundedRecordingSource {
            recording: Some(Vec::new()),
            ..Self::new(inner, max_length)
        }
    }

    pub fn max_length(&self) -> u64 {
        self.max_length
    }

    /// Bytes still deliverable.
    pub fn available(&self) -> u64 {
        self.max_length.saturating_sub(self.delivered)
    }

    /// Recorded bytes, empty when recording is disabled.
    pub fn recording(&self) -> &[u8] {
        self.recording.as_deref().unwrap_or_default()
    }

    /// Take the recording, leaving an empty one behind.
    pub fn take_recording(&mut self) -> Vec<u8> {
        self.recording.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Source> Read for BoundedRecordingSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        let want = (buf.len() as u64).min(self.available()) as usize;
        if want == 0 {
            return Ok(0);
        }
        let n = self.inner.read(&mut buf[..want])?;
        self.delivered += n as u64;
        if let Some(recording) = self.recording.as_mut() {
            recording.extend_from_slice(&buf[..n]);
        }
        Ok(n)
    }
}

impl<S: Source> Source for BoundedRecordingSource<S> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        let n = n.min(self.available());
        if self.recording.is_some() {
            return skip_by_reading(self, n);
        }
        let skipped = self.inner.skip(n)?;
        self.delivered += skipped;
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
    fn stops_at_max_length() {
        let mut source = BoundedRecordingSource::new(&b"0123456789"[..], 6);
        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(source.available(), 2);
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"45");
        assert_eq!(source.available(), 0);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert_eq!(source.skip(3).unwrap(), 0);
        assert_eq!(source.into_inner(), b"6789");
    }

    #[test]
    fn records_reads_and_skips() {
        let mut source = BoundedRecordingSource::with_recording(&b"WARC/1.0\r\nfoo"[..], 100);
        let mut buf = [0u8; 4];
        source.read_exact(&mut buf).unwrap();
        assert_eq!(source.skip(6).unwrap(), 6);
        assert_eq!(source.available(), 90);
        assert_eq!(source.recording(), b"WARC/1.0\r\n");
        assert_eq!(source.take_recording(), b"WARC/1.0\r\n");
        assert!(source.recording().is_empty());
        assert!(source.is_recording());
    }

    #[test]
    fn shorter_source_ends_early() {
        let mut source = BoundedRecordingSource::new(&b"abc"[..], 10);
        assert_eq!(source.skip(10).unwrap(), 3);
        assert_eq!(source.available(), 7);
        assert_eq!(source.read(&mut [0u8; 4]).unwrap(), 0);
    }
}
