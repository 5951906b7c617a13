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

//! Header blocks: a status line followed by headers up to an empty line.

use std::io;

use crate::anomaly::Anomalies;
use crate::diagnostics::{DiagnosisType, Diagnostics};
use crate::line_reader::{HeaderLine, HeaderLineKind, HeaderLineReader, LineMode, ReaderConfig};
use crate::pushback::PushbackCountingSource;
use crate::source::Source;

/// Ordered WARC or HTTP header block with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    status_line: String,
    headers: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status line, empty if the block has none.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn set_status_line(&mut self, status_line: impl Into<String>) {
        self.status_line = status_line.into();
    }

    /// Get value for (case-insensitive) header key.
    /// Duplicate headers are returned as a single value joined with `","`.
    ///
    /// # Arguments
    ///
    /// * `key` - Header key
    pub fn get(&self, key: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    /// All values of a (case-insensitive) header key in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Insert new header and overwrite existing header(s) if the key already exists.
    ///
    /// The first occurrence keeps its position, all following occurrences are
    /// dropped.
    ///
    /// # Arguments
    ///
    /// * `key` - Header key
    /// * `value` - Header value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let mut value = Some(value.into());
        self.headers.retain_mut(|h| {
            if !h.0.eq_ignore_ascii_case(&key) {
                true
            } else if let Some(value) = value.take() {
                h.1 = value;
                true
            } else {
                false
            }
        });
        if let Some(value) = value {
            self.headers.push((key, value));
        }
    }

    /// Append header without checking for existing headers with the same name.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.push((key.into(), value.into()));
    }

    /// Iterator of keys and values.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Clear all headers and the status line.
    pub fn clear(&mut self) {
        self.headers.clear();
        self.status_line.clear();
    }

    /// Write header block into stream, terminated by an empty line.
    ///
    /// Returns the number of bytes written.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut bytes_written = 0usize;
        if !self.status_line.is_empty() {
            writer.write_all(self.status_line.as_bytes())?;
            writer.write_all(b"\r\n")?;
            bytes_written += self.status_line.len() + 2;
        }
        for (key, value) in &self.headers {
            writer.write_all(key.as_bytes())?;
            writer.write_all(b": ")?;
            // Multi-line quoted values would break the framing.
            let value = value.replace(['\r', '\n'], " ");
            writer.write_all(value.as_bytes())?;
            writer.write_all(b"\r\n")?;
            bytes_written += key.len() + value.len() + 4;
        }
        writer.write_all(b"\r\n")?;
        Ok(bytes_written + 2)
    }
}

/// A header block read from a stream.
#[derive(Debug, Clone, Default)]
pub struct HeaderBlock {
    pub headers: HeaderMap,
    /// Bytes consumed for the block, the terminating empty line included.
    pub raw: Vec<u8>,
    /// Union of the anomalies of all lines.
    pub anomalies: Anomalies,
    /// Whether the block ended with an empty line rather than end of stream.
    pub terminated: bool,
    /// Lines that were neither headers nor the terminator.
    pub invalid_lines: Vec<HeaderLine>,
}

/// Read a header block from `source`.
///
/// With `has_status_line` the first line is read as a plain line into
/// [`HeaderMap::status_line`]. Headers are read with `config` until an empty
/// line or end of stream. Anomalies of every line are reported to
/// `diagnostics`, keyed by header name.
pub fn read_header_block<S: Source>(
    source: &mut PushbackCountingSource<S>,
    config: ReaderConfig,
    has_status_line: bool,
    diagnostics: &mut Diagnostics,
) -> io::Result<HeaderBlock> {
    let mut block = HeaderBlock::default();
    let header_config = ReaderConfig {
        mode: LineMode::Header,
        ..config
    };
    let reader = HeaderLineReader::new(header_config);

    if has_status_line {
        let status_reader = HeaderLineReader::new(ReaderConfig::line(config.encoding));
        match status_reader.read_line(source)? {
            Some(line) => {
                line.anomalies().report("status line", diagnostics);
                block.anomalies |= line.anomalies();
                block.raw.extend_from_slice(line.raw());
                block.headers.set_status_line(line.line().unwrap_or_default());
            }
            None => {
                diagnostics.add_error(DiagnosisType::UnexpectedEof, "status line", Vec::<String>::new());
                return Ok(block);
            }
        }
    }

    while let Some(line) = reader.read_line(source)? {
        block.anomalies |= line.anomalies();
        block.raw.extend_from_slice(line.raw());
        match line.kind() {
            HeaderLineKind::NameValue => {
                let name = line.name().unwrap_or_default();
                line.anomalies().report(name, diagnostics);
                block
                    .headers
                    .append(name, line.value().unwrap_or_default());
            }
            HeaderLineKind::PlainLine if line.is_empty_line() => {
                line.anomalies().report("header block terminator", diagnostics);
                block.terminated = true;
                break;
            }
            HeaderLineKind::PlainLine => {
                line.anomalies().report("header line", diagnostics);
                diagnostics.add_error(
                    DiagnosisType::Invalid,
                    "header line",
                    [line.line().unwrap_or_default()],
                );
                block.invalid_lines.push(line);
            }
            HeaderLineKind::Undecodable => {
                let name = line.name().unwrap_or_default().to_string();
                line.anomalies().report(&name, diagnostics);
                diagnostics.add_error(DiagnosisType::Undecodable, name, Vec::<String>::new());
                block.invalid_lines.push(line);
            }
        }
    }

    if !block.terminated {
        diagnostics.add_error(DiagnosisType::ErrorExpected, "header block", ["empty line"]);
    }
    tracing::debug!(
        headers = block.headers.len(),
        raw_len = block.raw.len(),
        terminated = block.terminated,
        "header block read"
    );
    Ok(block)
}
