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

//! Encoding-aware reader for status lines and RFC 822 style header lines.
//!
//! The reader is total: every call either returns a [`HeaderLine`] or `None`
//! at end of input. Malformed line endings and undecodable characters are
//! reported as [`Anomalies`] on the result, only I/O errors of the source are
//! returned as errors.

use std::io;

use crate::anomaly::Anomalies;
use crate::decode::{decode, HeaderEncoding};
use crate::pushback::PushbackCountingSource;
use crate::source::Source;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const QUOTE: u8 = b'"';
const BACKSLASH: u8 = b'\\';

#[inline]
fn is_lws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn trim_lws(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_lws(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_lws(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn trim_leading_lws(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_lws(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

/// What a reader call tokenizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    /// Header lines, split into name and value.
    #[default]
    Header,
    /// Plain text lines such as status lines.
    Line,
}

/// Immutable configuration of a [`HeaderLineReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    pub encoding: HeaderEncoding,
    /// Join continuation lines starting with SP or HT to the header value.
    pub fold: bool,
    pub mode: LineMode,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig::warc_header()
    }
}

impl ReaderConfig {
    /// Plain line reading, no name/value split and no folding.
    pub fn line(encoding: HeaderEncoding) -> Self {
        ReaderConfig {
            encoding,
            fold: false,
            mode: LineMode::Line,
        }
    }

    /// Header line reading.
    pub fn header(encoding: HeaderEncoding, fold: bool) -> Self {
        ReaderConfig {
            encoding,
            fold,
            mode: LineMode::Header,
        }
    }

    /// WARC headers: UTF-8 with continuation folding.
    pub fn warc_header() -> Self {
        Self::header(HeaderEncoding::Unicode, true)
    }

    /// HTTP headers: ISO-8859-1 with continuation folding.
    pub fn http_header() -> Self {
        Self::header(HeaderEncoding::Latin1, true)
    }
}

/// Classification of a [`HeaderLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderLineKind {
    /// A quoted string could not be decoded or was cut off.
    Undecodable,
    /// A line without name/value structure. Empty lines are plain lines.
    PlainLine,
    /// A `name: value` header.
    NameValue,
}

/// Result of one [`HeaderLineReader::read_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    kind: HeaderLineKind,
    raw: Vec<u8>,
    line: Option<String>,
    name: Option<String>,
    value: Option<String>,
    lines: Vec<String>,
    anomalies: Anomalies,
}

impl HeaderLine {
    pub fn kind(&self) -> HeaderLineKind {
        self.kind
    }

    /// Exact bytes consumed from the source, line terminators included.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    /// Decoded text of a plain line.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Header name. Also set for undecodable headers.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Header value, folded and trimmed.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Decoded physical lines a header was assembled from.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn anomalies(&self) -> Anomalies {
        self.anomalies
    }

    /// Whether this is the empty line ending a header block.
    pub fn is_empty_line(&self) -> bool {
        self.kind == HeaderLineKind::PlainLine && self.line.as_deref() == Some("")
    }
}

/// One physical line, terminator stripped.
struct PhysicalLine {
    content: Vec<u8>,
    terminated: bool,
    anomalies: Anomalies,
}

/// Progress through a header value.
#[derive(Default)]
struct ValueScanner {
    bytes: Vec<u8>,
    started: bool,
    in_quote: bool,
    escape: bool,
    // Byte range of the quoted string including the quotes.
    quote_start: usize,
    quote_end: Option<usize>,
}

impl ValueScanner {
    fn feed(&mut self, chunk: &[u8]) {
        for &b in chunk {
            if self.in_quote {
                if self.escape {
                    self.escape = false;
                    self.bytes.push(b);
                } else if b == BACKSLASH {
                    self.escape = true;
                } else {
                    self.bytes.push(b);
                    if b == QUOTE {
                        self.in_quote = false;
                        self.quote_end = Some(self.bytes.len());
                    }
                }
            } else {
                if !self.started && !is_lws(b) {
                    self.started = true;
                    if b == QUOTE {
                        self.in_quote = true;
                        self.quote_start = self.bytes.len();
                    }
                }
                self.bytes.push(b);
            }
        }
    }

    fn quoted(&self) -> Option<&[u8]> {
        self.quote_end.map(|end| &self.bytes[self.quote_start..end])
    }
}

/// Reader turning bytes of a [`PushbackCountingSource`] into header lines.
///
/// Each call consumes one logical line: a plain line, or a header including
/// its continuation lines and multi-line quoted strings. The reader needs one
/// byte of pushback to look past the end of a header for continuations.
///
/// # Example
///
/// ```
/// use warcstream::{HeaderLineKind, HeaderLineReader, PushbackCountingSource, ReaderConfig};
///
/// let input = b"Content-Type: text/plain;\r\n charset=utf-8\r\n\r\n";
/// let mut source = PushbackCountingSource::with_default_capacity(&input[..]);
/// let reader = HeaderLineReader::new(ReaderConfig::http_header());
///
/// let header = reader.read_line(&mut source).unwrap().unwrap();
/// assert_eq!(header.kind(), HeaderLineKind::NameValue);
/// assert_eq!(header.name(), Some("Content-Type"));
/// assert_eq!(header.value(), Some("text/plain; charset=utf-8"));
/// assert!(reader.read_line(&mut source).unwrap().unwrap().is_empty_line());
/// assert!(reader.read_line(&mut source).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderLineReader {
    config: ReaderConfig,
}

impl HeaderLineReader {
    pub fn new(config: ReaderConfig) -> Self {
        HeaderLineReader { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read the next logical line, `None` at end of input.
    pub fn read_line<S: Source>(
        &self,
        source: &mut PushbackCountingSource<S>,
    ) -> io::Result<Option<HeaderLine>> {
        let mut raw = Vec::new();
        let Some(first) = Self::read_physical(source, &mut raw)? else {
            return Ok(None);
        };

        let line = match (self.config.mode, first.content.iter().position(|&b| b == b':')) {
            (LineMode::Line, _) | (LineMode::Header, None) => self.plain_line(raw, first),
            (LineMode::Header, Some(colon)) => self.name_value(source, raw, first, colon)?,
        };
        tracing::trace!(kind = ?line.kind, raw_len = line.raw.len(), anomalies = ?line.anomalies, "header line read");
        Ok(Some(line))
    }

    fn plain_line(&self, raw: Vec<u8>, physical: PhysicalLine) -> HeaderLine {
        let (decoded, bits) = decode(trim_lws(&physical.content), self.config.encoding, !physical.terminated);
        HeaderLine {
            kind: HeaderLineKind::PlainLine,
            raw,
            line: Some(decoded),
            name: None,
            value: None,
            lines: Vec::new(),
            anomalies: physical.anomalies | bits,
        }
    }

    fn name_value<S: Source>(
        &self,
        source: &mut PushbackCountingSource<S>,
        mut raw: Vec<u8>,
        first: PhysicalLine,
        colon: usize,
    ) -> io::Result<HeaderLine> {
        let encoding = self.config.encoding;
        let (name, mut anomalies) = decode(trim_lws(&first.content[..colon]), encoding, false);
        anomalies |= first.anomalies;
        let mut terminated = first.terminated;
        let mut scanner = ValueScanner::default();
        scanner.feed(&first.content[colon + 1..]);
        let mut physical = vec![first.content];

        loop {
            if scanner.in_quote {
                // A quoted string must be closed before the header can end.
                if !terminated || scanner.escape {
                    return Ok(self.undecodable(raw, name, &physical, anomalies));
                }
                let fold = match source.read_byte()? {
                    Some(next) => {
                        source.unread_byte(next)?;
                        is_lws(next)
                    }
                    None => {
                        anomalies |= Anomalies::EOF;
                        return Ok(self.undecodable(raw, name, &physical, anomalies));
                    }
                };
                let Some(line) = Self::read_physical(source, &mut raw)? else {
                    return Ok(self.undecodable(raw, name, &physical, anomalies));
                };
                anomalies |= line.anomalies;
                terminated = line.terminated;
                if fold {
                    scanner.bytes.push(b' ');
                    scanner.feed(trim_leading_lws(&line.content));
                } else {
                    anomalies |= Anomalies::MISPLACED_LF;
                    scanner.bytes.push(LF);
                    scanner.feed(&line.content);
                }
                physical.push(line.content);
                continue;
            }

            if !self.config.fold || !terminated {
                break;
            }
            match source.read_byte()? {
                Some(next) if is_lws(next) => source.unread_byte(next)?,
                Some(next) => {
                    source.unread_byte(next)?;
                    break;
                }
                None => break,
            }
            let Some(line) = Self::read_physical(source, &mut raw)? else {
                break;
            };
            anomalies |= line.anomalies;
            terminated = line.terminated;
            let continuation = trim_leading_lws(&line.content);
            if !continuation.is_empty() {
                scanner.bytes.push(b' ');
                scanner.feed(continuation);
            }
            physical.push(line.content);
        }

        if let Some(quoted) = scanner.quoted() {
            if decode(quoted, encoding, false).1.intersects(Anomalies::ENCODING) {
                return Ok(self.undecodable(raw, name, &physical, anomalies));
            }
        }

        let (value, bits) = decode(trim_lws(&scanner.bytes), encoding, !terminated);
        Ok(HeaderLine {
            kind: HeaderLineKind::NameValue,
            raw,
            line: None,
            name: Some(name),
            value: Some(value),
            lines: self.decode_lines(&physical),
            anomalies: anomalies | bits,
        })
    }

    fn undecodable(
        &self,
        raw: Vec<u8>,
        name: String,
        physical: &[Vec<u8>],
        anomalies: Anomalies,
    ) -> HeaderLine {
        tracing::debug!(name = %name, raw_len = raw.len(), "undecodable header line");
        HeaderLine {
            kind: HeaderLineKind::Undecodable,
            raw,
            line: None,
            name: Some(name),
            value: None,
            lines: self.decode_lines(physical),
            anomalies,
        }
    }

    fn decode_lines(&self, physical: &[Vec<u8>]) -> Vec<String> {
        physical
            .iter()
            .map(|content| decode(content, self.config.encoding, false).0)
            .collect()
    }

    /// Consume one physical line, appending every byte to `raw`.
    fn read_physical<S: Source>(
        source: &mut PushbackCountingSource<S>,
        raw: &mut Vec<u8>,
    ) -> io::Result<Option<PhysicalLine>> {
        let start = raw.len();
        let mut content = Vec::new();
        let mut anomalies = Anomalies::empty();
        let mut terminated = false;
        while let Some(byte) = source.read_byte()? {
            raw.push(byte);
            match byte {
                LF => {
                    anomalies |= Anomalies::MISSING_CR;
                    terminated = true;
                    break;
                }
                CR => match source.read_byte()? {
                    Some(LF) => {
                        raw.push(LF);
                        terminated = true;
                        break;
                    }
                    Some(next) => {
                        anomalies |= Anomalies::MISPLACED_CR;
                        source.unread_byte(next)?;
                    }
                    None => {
                        anomalies |= Anomalies::MISSING_LF;
                        terminated = true;
                        break;
                    }
                },
                _ => content.push(byte),
            }
        }
        if raw.len() == start {
            return Ok(None);
        }
        if !terminated {
            anomalies |= Anomalies::EOF;
        }
        Ok(Some(PhysicalLine {
            content,
            terminated,
            anomalies,
        }))
    }
}
