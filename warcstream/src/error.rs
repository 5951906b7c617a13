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

//! Error types for stream misuse.
//!
//! Malformed input is never an error in this crate; it is reported as
//! [`Anomalies`](crate::Anomalies) on the value that was read. The variants
//! here cover usage faults (asking a stream for something it cannot do) and
//! I/O faults coming up from the wrapped source.

use std::io;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Usage and I/O failures raised by the stream layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A constructor or method argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An unread request does not fit into the free pushback space.
    #[error("pushback buffer overflow: {requested} bytes requested, {free} bytes free")]
    PushbackOverflow { requested: usize, free: usize },

    /// An unread request is longer than what has been read from the stream.
    #[error("cannot unread {requested} bytes, only {consumed} bytes consumed")]
    UnreadBeyondConsumed { requested: usize, consumed: u64 },

    /// The stream has already been closed.
    #[error("stream closed")]
    Closed,

    /// `reset()` was called on a stream without mark support.
    #[error("mark/reset not supported")]
    MarkNotSupported,

    /// Fault of the underlying source, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Recover a typed usage error that was carried through an `io::Error`.
    ///
    /// Errors raised inside [`std::io::Read::read`] have to travel as
    /// `io::Error`. Plain I/O errors come back as [`Error::Io`].
    pub fn from_io(err: io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(typed)) => *typed,
            Some(Err(other)) => Error::Io(io::Error::new(kind, other)),
            None => Error::Io(io::Error::from(kind)),
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Error::InvalidArgument(_)
            | Error::PushbackOverflow { .. }
            | Error::UnreadBeyondConsumed { .. } => io::ErrorKind::InvalidInput,
            Error::Closed | Error::MarkNotSupported => io::ErrorKind::Other,
            Error::Io(err) => err.kind(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}
