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

//! Stream layers and a tolerant header line reader for ARC/WARC parsing.
//!
//! Record parsers read through a stack of [`Source`] layers:
//!
//! * [`CountingSource`] keeps absolute and relative byte offsets,
//! * [`PushbackCountingSource`] adds bounded unread for lookahead,
//! * [`DigestingSource`] hashes every delivered byte,
//! * [`BoundedRecordingSource`] caps the length and can record what was read,
//! * [`FixedLengthSource`] exposes exactly the declared payload length.
//!
//! Layers own what they wrap, can be stacked in any order and forward
//! `close()` down the stack once. On top of a [`PushbackCountingSource`] the
//! [`HeaderLineReader`] reads status and header lines, and [`NewlineRun`]
//! consumes the newlines between records. Malformed input never fails a read,
//! it is flagged with [`Anomalies`].

pub mod anomaly;
pub mod bounded;
pub mod counting;
pub mod decode;
pub mod diagnostics;
pub mod digesting;
pub mod error;
pub mod fixed;
pub mod header_block;
pub mod line_reader;
pub mod newline;
pub mod pushback;
pub mod source;

pub use anomaly::Anomalies;
pub use bounded::BoundedRecordingSource;
pub use counting::CountingSource;
pub use decode::{HeaderEncoding, REPLACEMENT_CHAR};
pub use diagnostics::{Diagnosis, DiagnosisType, Diagnostics};
pub use digesting::DigestingSource;
pub use error::{Error, Result};
pub use fixed::FixedLengthSource;
pub use header_block::{read_header_block, HeaderBlock, HeaderMap};
pub use line_reader::{HeaderLine, HeaderLineKind, HeaderLineReader, LineMode, ReaderConfig};
pub use newline::{NewlineMode, NewlineRun};
pub use pushback::{PushbackCountingSource, DEFAULT_PUSHBACK_SIZE};
pub use source::{ReadSource, Source};
