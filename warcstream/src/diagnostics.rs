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

//! Sink for errors and warnings found while parsing.
//!
//! The stream layers and the line reader only produce anomaly flags. Parsers
//! built on top of them turn those into [`Diagnosis`] entries here, see
//! [`Anomalies::report`](crate::Anomalies::report).

use std::fmt;

/// Reason of a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosisType {
    /// A value is empty where content was expected.
    Empty,
    /// Something other than what the format requires was found.
    ErrorExpected,
    /// A value could not be parsed.
    Invalid,
    /// Bytes are not valid in the expected character encoding.
    InvalidEncoding,
    /// A value is valid but discouraged.
    Undesired,
    /// The stream ended in the middle of a structure.
    UnexpectedEof,
    /// Bytes that could not be decoded at all.
    Undecodable,
}

impl DiagnosisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisType::Empty => "empty",
            DiagnosisType::ErrorExpected => "expected",
            DiagnosisType::Invalid => "invalid",
            DiagnosisType::InvalidEncoding => "invalid encoding",
            DiagnosisType::Undesired => "undesired",
            DiagnosisType::UnexpectedEof => "unexpected end of stream",
            DiagnosisType::Undecodable => "undecodable",
        }
    }
}

/// A single error or warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub kind: DiagnosisType,
    /// What the diagnosis is about, e.g. a header name or `"header line"`.
    pub entity: String,
    pub arguments: Vec<String>,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.entity)?;
        if !self.arguments.is_empty() {
            write!(f, ": {}", self.arguments.join(", "))?;
        }
        Ok(())
    }
}

/// Collected errors and warnings of one parse attempt.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnosis>,
    warnings: Vec<Diagnosis>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error.
    ///
    /// # Arguments
    ///
    /// * `kind` - Reason
    /// * `entity` - What the error is about
    /// * `arguments` - Free-form details
    pub fn add_error<I, A>(&mut self, kind: DiagnosisType, entity: impl Into<String>, arguments: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.errors.push(Diagnosis {
            kind,
            entity: entity.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        });
    }

    /// Add a warning. Takes the same arguments as [`add_error`](Self::add_error).
    pub fn add_warning<I, A>(&mut self, kind: DiagnosisType, entity: impl Into<String>, arguments: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.warnings.push(Diagnosis {
            kind,
            entity: entity.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[Diagnosis] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnosis] {
        &self.warnings
    }

    /// Drop all collected entries.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }
}
