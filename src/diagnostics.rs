// diff-dispatch replays JSON dataset diffs against a REST API
// Copyright (C) 2025  Peoples Grocers LLC
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// To purchase a license under different terms contact admin@peoplesgrocers.com
// To request changes, report bugs, or give user feedback contact
// marxism@peoplesgrocers.com
//

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Fatal,
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Fatal => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCode {
    InvalidUtf8,
    ReadFailure,
    NoEntries,

    MalformedMarker,
    InvalidPathJson,
    InvalidPathSegment,
    InvalidValueJson,

    ValueOutsideBlock,
    DuplicateValueLine,
    EmptyBlock,

    PathNotFound,
    InvalidArrayIndex,
    TypeMismatch,

    JobFailed,
    InvalidArgument,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidUtf8 => "E001",
            DiagnosticCode::ReadFailure => "E002",
            DiagnosticCode::NoEntries => "W003",

            DiagnosticCode::MalformedMarker => "E010",
            DiagnosticCode::InvalidPathJson => "E011",
            DiagnosticCode::InvalidPathSegment => "E012",
            DiagnosticCode::InvalidValueJson => "E013",

            DiagnosticCode::ValueOutsideBlock => "E020",
            DiagnosticCode::DuplicateValueLine => "E021",
            DiagnosticCode::EmptyBlock => "E022",

            DiagnosticCode::PathNotFound => "E030",
            DiagnosticCode::InvalidArrayIndex => "E031",
            DiagnosticCode::TypeMismatch => "E032",

            DiagnosticCode::JobFailed => "E040",
            DiagnosticCode::InvalidArgument => "E041",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidUtf8 => "Invalid UTF-8 encoding",
            DiagnosticCode::ReadFailure => "Read failure",
            DiagnosticCode::NoEntries => "No diff entries",

            DiagnosticCode::MalformedMarker => "Malformed line marker",
            DiagnosticCode::InvalidPathJson => "Invalid path JSON",
            DiagnosticCode::InvalidPathSegment => "Invalid path segment",
            DiagnosticCode::InvalidValueJson => "Invalid value JSON",

            DiagnosticCode::ValueOutsideBlock => "Value line outside a block",
            DiagnosticCode::DuplicateValueLine => "Duplicate value line",
            DiagnosticCode::EmptyBlock => "Block without values",

            DiagnosticCode::PathNotFound => "Path not found",
            DiagnosticCode::InvalidArrayIndex => "Invalid array index",
            DiagnosticCode::TypeMismatch => "Type mismatch",

            DiagnosticCode::JobFailed => "Job failed",
            DiagnosticCode::InvalidArgument => "Invalid argument",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub filename: Option<String>,
    pub line_number: Option<usize>,
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub description: String,
    pub code_snippet: Option<String>,
    pub advice: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, code: DiagnosticCode, description: String) -> Self {
        Self {
            filename: None,
            line_number: None,
            level,
            code,
            description,
            code_snippet: None,
            advice: None,
        }
    }

    pub fn fatal(code: DiagnosticCode, description: String) -> Self {
        Self::new(DiagnosticLevel::Fatal, code, description)
    }

    pub fn with_location(mut self, filename: String, line_number: usize) -> Self {
        self.filename = Some(filename);
        self.line_number = Some(line_number);
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.code_snippet = Some(snippet);
        self
    }

    pub fn with_advice(mut self, advice: String) -> Self {
        self.advice = Some(advice);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.level == DiagnosticLevel::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(filename), Some(line)) = (&self.filename, self.line_number) {
            write!(f, "{}:{} - ", filename, line)?;
        }

        writeln!(
            f,
            "{} {}: {}",
            self.level,
            self.code.as_str(),
            self.code.title()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;

        if let Some(snippet) = &self.code_snippet {
            writeln!(f)?;
            writeln!(f, "{}", snippet)?;
        }

        if let Some(advice) = &self.advice {
            writeln!(f)?;
            writeln!(f, "{}", advice)?;
        }

        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
