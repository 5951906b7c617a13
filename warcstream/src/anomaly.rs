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

//! Anomaly flags attached to decoded lines.

use crate::diagnostics::{DiagnosisType, Diagnostics};

bitflags::bitflags! {
    /// Non-fatal malformations found while reading a line.
    ///
    /// Flags accumulate over all physical lines that make up one result and
    /// never stop decoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anomalies: u16 {
        /// Line ended with LF only.
        const MISSING_CR = 1 << 0;
        /// Line ended with CR only.
        const MISSING_LF = 1 << 1;
        /// CR found inside a line.
        const MISPLACED_CR = 1 << 2;
        /// Line break inside a quoted string that is not a fold.
        const MISPLACED_LF = 1 << 3;
        /// Control character outside the allowed set.
        const INVALID_CONTROL_CHAR = 1 << 4;
        /// Byte above 0x7F in US-ASCII text.
        const INVALID_US_ASCII_CHAR = 1 << 5;
        /// Malformed or truncated UTF-8 sequence.
        const INVALID_UTF8_ENCODING = 1 << 6;
        /// Stream ended before the line was terminated.
        const EOF = 1 << 7;
    }
}

impl Default for Anomalies {
    fn default() -> Self {
        Anomalies::empty()
    }
}

impl Anomalies {
    /// Any of the line ending flags.
    pub const LINE_ENDING: Anomalies = Anomalies::MISSING_CR
        .union(Anomalies::MISSING_LF)
        .union(Anomalies::MISPLACED_CR)
        .union(Anomalies::MISPLACED_LF);

    /// Any of the character encoding flags.
    pub const ENCODING: Anomalies = Anomalies::INVALID_CONTROL_CHAR
        .union(Anomalies::INVALID_US_ASCII_CHAR)
        .union(Anomalies::INVALID_UTF8_ENCODING);

    /// Translate the flags into diagnostics about `entity`.
    ///
    /// Line ending problems become warnings, encoding problems and a premature
    /// end of stream become errors.
    pub fn report(self, entity: &str, diagnostics: &mut Diagnostics) {
        if self.contains(Anomalies::MISSING_CR) {
            diagnostics.add_warning(DiagnosisType::ErrorExpected, entity, ["CRLF", "LF"]);
        }
        if self.contains(Anomalies::MISSING_LF) {
            diagnostics.add_warning(DiagnosisType::ErrorExpected, entity, ["CRLF", "CR"]);
        }
        if self.contains(Anomalies::MISPLACED_CR) {
            diagnostics.add_warning(DiagnosisType::Undesired, entity, ["misplaced CR"]);
        }
        if self.contains(Anomalies::MISPLACED_LF) {
            diagnostics.add_warning(DiagnosisType::Undesired, entity, ["misplaced LF"]);
        }
        if self.contains(Anomalies::INVALID_CONTROL_CHAR) {
            diagnostics.add_error(DiagnosisType::Invalid, entity, ["control character"]);
        }
        if self.contains(Anomalies::INVALID_US_ASCII_CHAR) {
            diagnostics.add_error(DiagnosisType::InvalidEncoding, entity, ["US-ASCII"]);
        }
        if self.contains(Anomalies::INVALID_UTF8_ENCODING) {
            diagnostics.add_error(DiagnosisType::InvalidEncoding, entity, ["UTF-8"]);
        }
        if self.contains(Anomalies::EOF) {
            diagnostics.add_error(DiagnosisType::UnexpectedEof, entity, Vec::<String>::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups() {
        assert!(Anomalies::LINE_ENDING.contains(Anomalies::MISPLACED_LF));
        assert!(!Anomalies::LINE_ENDING.intersects(Anomalies::ENCODING));
        assert!(!Anomalies::ENCODING.contains(Anomalies::EOF));
    }

    #[test]
    fn report_splits_errors_and_warnings() {
        let mut diagnostics = Diagnostics::new();
        (Anomalies::MISSING_CR | Anomalies::MISPLACED_CR).report("status line", &mut diagnostics);
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warnings().len(), 2);

        Anomalies::INVALID_UTF8_ENCODING.report("WARC-Filename", &mut diagnostics);
        assert_eq!(diagnostics.errors().len(), 1);
        assert_eq!(diagnostics.errors()[0].kind, DiagnosisType::InvalidEncoding);
        assert_eq!(diagnostics.errors()[0].entity, "WARC-Filename");

        let mut quiet = Diagnostics::new();
        Anomalies::empty().report("x", &mut quiet);
        assert!(!quiet.has_errors() && !quiet.has_warnings());
    }
}
