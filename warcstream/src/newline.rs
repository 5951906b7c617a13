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

//! Trailing newline runs between records.

use std::io;

use crate::anomaly::Anomalies;
use crate::pushback::PushbackCountingSource;
use crate::source::Source;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Newline convention expected by [`NewlineRun::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewlineMode {
    /// `CRLF` pairs (WARC).
    #[default]
    CrLf,
    /// Bare `LF` (ARC).
    Lf,
}

/// Result of consuming a run of newlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewlineRun {
    /// Newline units consumed.
    pub count: usize,
    pub missing_cr: bool,
    pub missing_lf: bool,
    pub misplaced_cr: bool,
    pub misplaced_lf: bool,
}

impl NewlineRun {
    /// Consume consecutive newlines from `source`.
    ///
    /// Stops at the first byte that does not belong to a newline, which is
    /// pushed back, or at end of stream. Malformed newlines are counted and
    /// flagged, never rejected. Telling a reversed `LF CR` pair from `LF`
    /// followed by a `CRLF` takes two bytes of pushback; with a capacity of
    /// one the pair is reported as two separate malformed newlines.
    pub fn parse<S: Source>(
        source: &mut PushbackCountingSource<S>,
        mode: NewlineMode,
    ) -> io::Result<NewlineRun> {
        let mut run = NewlineRun::default();
        while let Some(byte) = source.read_byte()? {
            match byte {
                CR => {
                    match source.read_byte()? {
                        Some(LF) => {
                            if mode == NewlineMode::Lf {
                                run.misplaced_cr = true;
                            }
                        }
                        next => {
                            run.missing_lf = true;
                            run.misplaced_cr = true;
                            if let Some(next) = next {
                                source.unread_byte(next)?;
                                if next != CR {
                                    run.count += 1;
                                    break;
                                }
                            }
                        }
                    }
                    run.count += 1;
                }
                LF => {
                    if mode == NewlineMode::CrLf {
                        if Self::consume_reversed_pair(source)? {
                            run.misplaced_lf = true;
                        } else {
                            run.missing_cr = true;
                        }
                    }
                    run.count += 1;
                }
                other => {
                    source.unread_byte(other)?;
                    break;
                }
            }
        }
        Ok(run)
    }

    /// After an LF: consume a following CR if it does not start a CRLF pair.
    fn consume_reversed_pair<S: Source>(source: &mut PushbackCountingSource<S>) -> io::Result<bool> {
        if source.capacity() < 2 {
            return Ok(false);
        }
        let mut next = [0u8; 2];
        let n = source.peek(&mut next).map_err(io::Error::from)?;
        if n >= 1 && next[0] == CR && (n == 1 || next[1] != LF) {
            source.read_byte()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether every unit was a well-formed newline.
    pub fn is_clean(&self) -> bool {
        !(self.missing_cr || self.missing_lf || self.misplaced_cr || self.misplaced_lf)
    }

    /// The flags as line anomalies.
    pub fn anomalies(&self) -> Anomalies {
        let mut anomalies = Anomalies::empty();
        anomalies.set(Anomalies::MISSING_CR, self.missing_cr);
        anomalies.set(Anomalies::MISSING_LF, self.missing_lf);
        anomalies.set(Anomalies::MISPLACED_CR, self.misplaced_cr);
        anomalies.set(Anomalies::MISPLACED_LF, self.misplaced_lf);
        anomalies
    }
}
