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

//! Reader for the line-oriented structural diff format produced by `jd`.
//!
//! A diff is a sequence of blocks. Each block opens with a path line and
//! carries at most one removed value and at most one added value:
//!
//! ```text
//! @ [0,"terms",1,"archived"]
//! - false
//! + true
//! ```
//!
//! Blocks end implicitly at the next `@` line or at end of input. Every other
//! line (jd context lines, blank lines) is skipped.
//!
//! A `null` value counts as no value, so `- "AI"` followed by `+ null` is a
//! deletion. A block whose value lines are all `null` yields no entry.
//!
//! Parsing is lazy and single-pass: [`DiffParser`] is an iterator over a
//! `BufRead` and cannot be rewound. The first malformed line ends the
//! iteration with a fatal [`Diagnostic`], since a partially applied diff is
//! worse than none.

use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Enumerate;
use std::path::Path;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::entry::{DiffEntry, DiffKind};
use crate::path::DiffPath;

const PATH_MARKER: char = '@';
const REMOVAL_MARKER: char = '-';
const ADDITION_MARKER: char = '+';

#[derive(Debug)]
struct PendingBlock {
    path: DiffPath,
    line_number: usize,
    value_prev: Option<Value>,
    value_post: Option<Value>,
}

pub struct DiffParser<R> {
    lines: Enumerate<Lines<R>>,
    filename: String,
    pending: Option<PendingBlock>,
    finished: bool,
}

impl DiffParser<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let filename = path.as_ref().display().to_string();
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), filename))
    }
}

impl<R: BufRead> DiffParser<R> {
    pub fn new(reader: R, filename: impl Into<String>) -> Self {
        Self {
            lines: reader.lines().enumerate(),
            filename: filename.into(),
            pending: None,
            finished: false,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Keeps only the entries of one kind. Errors are always passed through.
    pub fn of_kind(self, kind: DiffKind) -> impl Iterator<Item = Result<DiffEntry, Diagnostic>> {
        self.filter(move |item| item.as_ref().map_or(true, |entry| entry.kind() == kind))
    }

    pub fn creations(self) -> impl Iterator<Item = Result<DiffEntry, Diagnostic>> {
        self.of_kind(DiffKind::Creation)
    }

    pub fn deletions(self) -> impl Iterator<Item = Result<DiffEntry, Diagnostic>> {
        self.of_kind(DiffKind::Deletion)
    }

    pub fn editions(self) -> impl Iterator<Item = Result<DiffEntry, Diagnostic>> {
        self.of_kind(DiffKind::Edition)
    }

    fn fail(&mut self, diagnostic: Diagnostic) -> Option<Result<DiffEntry, Diagnostic>> {
        self.finished = true;
        self.pending = None;
        Some(Err(diagnostic))
    }

    /// `None` when the block only carries `null` values.
    fn finish_block(&mut self, block: PendingBlock) -> Option<Result<DiffEntry, Diagnostic>> {
        let has_value_line = block.value_prev.is_some() || block.value_post.is_some();
        let all_null = [&block.value_prev, &block.value_post]
            .into_iter()
            .all(|value| value.as_ref().map_or(true, Value::is_null));
        if has_value_line && all_null {
            debug!(path = %block.path, line = block.line_number, "Skipping null-only diff block");
            return None;
        }

        match DiffEntry::new(block.path, block.value_prev, block.value_post) {
            Ok(entry) => Some(Ok(entry)),
            Err(diag) => {
                let diag = diag.with_location(self.filename.clone(), block.line_number);
                self.fail(diag)
            }
        }
    }

    fn read_error(&self, error: std::io::Error, line_number: usize) -> Diagnostic {
        if error.kind() == std::io::ErrorKind::InvalidData {
            Diagnostic::fatal(
                DiagnosticCode::InvalidUtf8,
                format!("I found invalid UTF-8 bytes at line {}.", line_number),
            )
            .with_location(self.filename.clone(), line_number)
            .with_advice(
                "Diff files must be UTF-8 encoded. Regenerate the diff from UTF-8 JSON files."
                    .to_string(),
            )
        } else {
            Diagnostic::fatal(
                DiagnosticCode::ReadFailure,
                format!("I couldn't read line {}: {}", line_number, error),
            )
            .with_location(self.filename.clone(), line_number)
        }
    }

    /// Splits `<marker> <json>` and decodes the JSON part.
    fn decode_payload(
        &self,
        line: &str,
        line_number: usize,
        code: DiagnosticCode,
    ) -> Result<Value, Diagnostic> {
        let mut chars = line.chars();
        let marker = chars.next().unwrap_or_default();
        let payload = match chars.as_str().strip_prefix(' ') {
            Some(payload) => payload,
            None => {
                return Err(Diagnostic::fatal(
                    DiagnosticCode::MalformedMarker,
                    format!("I expected a space after the '{}' marker.", marker),
                )
                .with_location(self.filename.clone(), line_number)
                .with_snippet(format!("{} | {}", line_number, line))
                .with_advice(format!(
                    "Lines must look like '{} <json>', with exactly one space after the marker.",
                    marker
                )));
            }
        };

        serde_json::from_str(payload).map_err(|e| {
            Diagnostic::fatal(code, format!("I couldn't parse this line as JSON: {}", e))
                .with_location(self.filename.clone(), line_number)
                .with_snippet(format!("{} | {}", line_number, line))
                .with_advice(
                    "Everything after the marker and its space must be a single JSON value. \
                     Check for missing commas, quotes, or brackets."
                        .to_string(),
                )
        })
    }

    fn parse_path_line(&self, line: &str, line_number: usize) -> Result<DiffPath, Diagnostic> {
        let value = self.decode_payload(line, line_number, DiagnosticCode::InvalidPathJson)?;
        DiffPath::from_value(&value).map_err(|diag| {
            diag.with_location(self.filename.clone(), line_number)
                .with_snippet(format!("{} | {}", line_number, line))
                .with_advice(
                    "Paths must be JSON arrays of object keys (strings) and array indexes \
                     (non-negative integers), for example [0,\"terms\",1]."
                        .to_string(),
                )
        })
    }

    fn parse_value_line(&mut self, line: &str, line_number: usize) -> Result<(), Diagnostic> {
        let is_removal = line.starts_with(REMOVAL_MARKER);
        let side = if is_removal { "removed" } else { "added" };

        if self.pending.is_none() {
            return Err(Diagnostic::fatal(
                DiagnosticCode::ValueOutsideBlock,
                format!("I found a {} value before any path line.", side),
            )
            .with_location(self.filename.clone(), line_number)
            .with_snippet(format!("{} | {}", line_number, line))
            .with_advice(
                "Every '-' or '+' line must follow an '@ [path]' line that says where the change happened."
                    .to_string(),
            ));
        }

        let value = self.decode_payload(line, line_number, DiagnosticCode::InvalidValueJson)?;
        let filename = self.filename.clone();
        let Some(block) = self.pending.as_mut() else {
            return Ok(());
        };

        let slot = if is_removal {
            &mut block.value_prev
        } else {
            &mut block.value_post
        };

        if slot.is_some() {
            return Err(Diagnostic::fatal(
                DiagnosticCode::DuplicateValueLine,
                format!(
                    "The block starting at line {} already has a {} value.",
                    block.line_number, side
                ),
            )
            .with_location(filename, line_number)
            .with_snippet(format!("{} | {}", line_number, line))
            .with_advice(
                "A block carries at most one '-' line and one '+' line. \
                 Split multi-value changes into separate blocks."
                    .to_string(),
            ));
        }

        *slot = Some(value);
        Ok(())
    }
}

impl<R: BufRead> Iterator for DiffParser<R> {
    type Item = Result<DiffEntry, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let (idx, line_result) = match self.lines.next() {
                Some(item) => item,
                None => {
                    self.finished = true;
                    let block = self.pending.take()?;
                    return self.finish_block(block);
                }
            };

            let line_number = idx + 1;
            let line = match line_result {
                Ok(line) => line,
                Err(e) => {
                    let diag = self.read_error(e, line_number);
                    return self.fail(diag);
                }
            };
            let line = line.trim_end_matches('\r');

            if line.starts_with(PATH_MARKER) {
                let path = match self.parse_path_line(line, line_number) {
                    Ok(path) => path,
                    Err(diag) => return self.fail(diag),
                };

                let next_block = PendingBlock {
                    path,
                    line_number,
                    value_prev: None,
                    value_post: None,
                };

                if let Some(previous) = self.pending.replace(next_block) {
                    if let Some(item) = self.finish_block(previous) {
                        return Some(item);
                    }
                }
            } else if line.starts_with(REMOVAL_MARKER) || line.starts_with(ADDITION_MARKER) {
                if let Err(diag) = self.parse_value_line(line, line_number) {
                    return self.fail(diag);
                }
            }
        }
    }
}
