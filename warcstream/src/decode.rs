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

//! Character decoding of header bytes with anomaly classification.

use encoding::all::ASCII;
use encoding::{DecoderTrap, Encoding};

use crate::anomaly::Anomalies;

/// Placeholder for bytes that cannot be decoded.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Character encoding of header lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderEncoding {
    /// Bytes map 1:1 to code points 0-255, nothing is validated.
    Raw,
    /// 7-bit US-ASCII.
    UsAscii,
    /// ISO-8859-1.
    Latin1,
    /// UTF-8 (WARC/1.0 and later).
    #[default]
    Unicode,
}

impl HeaderEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderEncoding::Raw => "raw",
            HeaderEncoding::UsAscii => "US-ASCII",
            HeaderEncoding::Latin1 => "ISO-8859-1",
            HeaderEncoding::Unicode => "UTF-8",
        }
    }
}

/// Decode `bytes`, replacing what cannot be decoded with [`REPLACEMENT_CHAR`].
///
/// `eof` tells whether the bytes were cut off by the end of the stream; a
/// trailing incomplete UTF-8 sequence is then not flagged as invalid, the
/// caller already reports [`Anomalies::EOF`] for the line.
pub(crate) fn decode(bytes: &[u8], encoding: HeaderEncoding, eof: bool) -> (String, Anomalies) {
    let mut anomalies = Anomalies::empty();
    let decoded = match encoding {
        HeaderEncoding::Raw => return (decode_latin1(bytes), anomalies),
        HeaderEncoding::UsAscii => decode_ascii(bytes, &mut anomalies),
        HeaderEncoding::Latin1 => decode_latin1(bytes),
        HeaderEncoding::Unicode => decode_utf8(bytes, eof, &mut anomalies),
    };
    (replace_controls(decoded, &mut anomalies), anomalies)
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn decode_ascii(bytes: &[u8], anomalies: &mut Anomalies) -> String {
    match ASCII.decode(bytes, DecoderTrap::Strict) {
        Ok(text) => text,
        Err(_) => {
            anomalies.insert(Anomalies::INVALID_US_ASCII_CHAR);
            bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { REPLACEMENT_CHAR })
                .collect()
        }
    }
}

fn decode_utf8(bytes: &[u8], eof: bool, anomalies: &mut Anomalies) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut chunks = bytes.utf8_chunks().peekable();
    while let Some(chunk) = chunks.next() {
        out.push_str(chunk.valid());
        let invalid = chunk.invalid();
        if invalid.is_empty() {
            continue;
        }
        out.push(REPLACEMENT_CHAR);
        let truncated = chunks.peek().is_none() && is_incomplete_utf8(invalid);
        if !(eof && truncated) {
            anomalies.insert(Anomalies::INVALID_UTF8_ENCODING);
        }
    }
    out
}

/// Whether `bytes` is the start of a sequence that more input could complete.
fn is_incomplete_utf8(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_err_and(|err| err.error_len().is_none())
}

/// Replace control characters other than HT and LF.
fn replace_controls(decoded: String, anomalies: &mut Anomalies) -> String {
    if !decoded.chars().any(is_invalid_control) {
        return decoded;
    }
    anomalies.insert(Anomalies::INVALID_CONTROL_CHAR);
    decoded
        .chars()
        .map(|c| if is_invalid_control(c) { REPLACEMENT_CHAR } else { c })
        .collect()
}

#[inline]
fn is_invalid_control(c: char) -> bool {
    c.is_control() && c != '\t' && c != '\n'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_maps_bytes_to_code_points() {
        let (text, anomalies) = decode(b"a\x00\xff", HeaderEncoding::Raw, false);
        assert_eq!(text, "a\u{0}\u{ff}");
        assert!(anomalies.is_empty());
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        let (text, anomalies) = decode(b"caf\xe9 ok", HeaderEncoding::UsAscii, false);
        assert_eq!(text, "caf\u{FFFD} ok");
        assert_eq!(anomalies, Anomalies::INVALID_US_ASCII_CHAR);
    }

    #[test]
    fn latin1_accepts_high_bytes_but_not_controls() {
        let (text, anomalies) = decode(b"caf\xe9", HeaderEncoding::Latin1, false);
        assert_eq!(text, "café");
        assert!(anomalies.is_empty());

        let (text, anomalies) = decode(b"a\x01b\tc\x85", HeaderEncoding::Latin1, false);
        assert_eq!(text, "a\u{FFFD}b\tc\u{FFFD}");
        assert_eq!(anomalies, Anomalies::INVALID_CONTROL_CHAR);
    }

    #[test]
    fn utf8_replaces_maximal_invalid_subpart() {
        let (text, anomalies) = decode(b"a\xe2\x82b", HeaderEncoding::Unicode, false);
        assert_eq!(text, "a\u{FFFD}b");
        assert_eq!(anomalies, Anomalies::INVALID_UTF8_ENCODING);

        let (text, _) = decode(b"\x80\x80x", HeaderEncoding::Unicode, false);
        assert_eq!(text, "\u{FFFD}\u{FFFD}x");

        let (text, anomalies) = decode("größe €".as_bytes(), HeaderEncoding::Unicode, false);
        assert_eq!(text, "größe €");
        assert!(anomalies.is_empty());
    }

    #[test]
    fn utf8_truncated_at_eof() {
        let (text, anomalies) = decode(b"ab\xe2\x82", HeaderEncoding::Unicode, true);
        assert_eq!(text, "ab\u{FFFD}");
        assert!(anomalies.is_empty());

        let (_, anomalies) = decode(b"ab\xe2\x82", HeaderEncoding::Unicode, false);
        assert_eq!(anomalies, Anomalies::INVALID_UTF8_ENCODING);

        // Bytes that can never start a sequence are invalid even at EOF.
        let (text, anomalies) = decode(b"ab\xff", HeaderEncoding::Unicode, true);
        assert_eq!(text, "ab\u{FFFD}");
        assert_eq!(anomalies, Anomalies::INVALID_UTF8_ENCODING);
    }

    #[test]
    fn ascii_replaces_each_high_byte() {
        let (text, anomalies) = decode(b"\xc3\xa4x", HeaderEncoding::UsAscii, false);
        assert_eq!(text, "\u{FFFD}\u{FFFD}x");
        assert_eq!(anomalies, Anomalies::INVALID_US_ASCII_CHAR);
    }
}
