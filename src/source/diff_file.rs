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

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::MessageSource;
use crate::error::SourceError;
use crate::message::DiffMessage;
use crate::parser::DiffParser;

/// Replays a local diff file against the data file it produces.
///
/// Each diff entry becomes one message. Its container is the object found at
/// the entry's object path in the post-change document, or `null` when the
/// path does not resolve there (deleted entries).
pub struct DiffFileSource<R = BufReader<File>> {
    data: Value,
    parser: DiffParser<R>,
    source_file: String,
    created_at: DateTime<Utc>,
    closed: bool,
}

impl DiffFileSource<BufReader<File>> {
    pub fn open(data_file: &Path, diff_file: &Path) -> Result<Self, SourceError> {
        let reader = BufReader::new(File::open(data_file)?);
        let data = serde_json::from_reader(reader).map_err(|source| SourceError::DataFile {
            path: data_file.to_path_buf(),
            source,
        })?;

        let source_file = data_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(data, DiffParser::open(diff_file)?, source_file, Utc::now()))
    }
}

impl<R: BufRead> DiffFileSource<R> {
    pub fn new(
        data: Value,
        parser: DiffParser<R>,
        source_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            data,
            parser,
            source_file: source_file.into(),
            created_at,
            closed: false,
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }
}

impl<R: BufRead> MessageSource for DiffFileSource<R> {
    fn pull_messages(&mut self, max: usize) -> Result<Vec<DiffMessage>, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }

        let mut messages = Vec::with_capacity(max);
        while messages.len() < max {
            let Some(entry) = self.parser.next() else {
                break;
            };
            let entry = entry?;

            let container = if entry.is_deletion() {
                Value::Null
            } else {
                entry
                    .object_path()
                    .get(&self.data)
                    .cloned()
                    .unwrap_or(Value::Null)
            };

            debug!(path = %entry.path(), kind = %entry.kind(), "Read diff entry");
            messages.push(DiffMessage::from_entry(
                entry,
                container,
                self.source_file.clone(),
                self.created_at,
            ));
        }

        Ok(messages)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    const DIFF: &str = "@ [0,\"terms\",1,\"archived\"]\n- false\n+ true\n\
                        @ [1]\n+ {\"id\":\"group-2\",\"description\":\"d\",\"archived\":false,\"terms\":[]}\n\
                        @ [2]\n- {\"id\":\"group-3\"}\n";

    fn data() -> Value {
        json!([
            {"id": "group-1", "terms": [
                {"id": "group-1-jargon-1", "archived": false},
                {"id": "group-1-jargon-2", "archived": true}
            ]},
            {"id": "group-2", "description": "d", "archived": false, "terms": []}
        ])
    }

    fn source(diff: &'static str) -> DiffFileSource<&'static [u8]> {
        DiffFileSource::new(
            data(),
            DiffParser::new(diff.as_bytes(), "jargons.diff"),
            "jargons.json",
            Utc::now(),
        )
    }

    #[test]
    fn test_messages_carry_containers() {
        let mut source = source(DIFF);
        let messages = source.pull_messages(10).unwrap();

        assert_eq!(messages.len(), 3);

        assert!(messages[0].is_edition());
        assert_eq!(messages[0].field_name(), "archived");
        assert_eq!(
            messages[0].container(),
            &json!({"id": "group-1-jargon-2", "archived": true})
        );

        assert!(messages[1].is_creation());
        assert_eq!(messages[1].container()["id"], json!("group-2"));

        assert!(messages[2].is_deletion());
        assert_eq!(messages[2].container(), &Value::Null);
        assert!(messages.iter().all(|m| m.source_file() == "jargons.json"));
    }

    #[test]
    fn test_pulls_in_batches() {
        let mut source = source(DIFF);

        assert_eq!(source.pull_messages(2).unwrap().len(), 2);
        assert_eq!(source.pull_messages(2).unwrap().len(), 1);
        assert!(source.pull_messages(2).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_aborts() {
        let mut source = source("@ [0]\n+ true\n@ [1]\n+ {bad\n");

        let err = source.pull_messages(10).unwrap_err();
        match err {
            SourceError::Parse(diag) => assert_eq!(diag.code, DiagnosticCode::InvalidValueJson),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_closed_source() {
        let mut source = source(DIFF);
        source.close().unwrap();
        assert!(matches!(source.pull_messages(1), Err(SourceError::Closed)));
    }

    #[test]
    fn test_open_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let data_path = dir.path().join("jargons.json");
        let diff_path = dir.path().join("jargons.diff");

        std::fs::write(&data_path, serde_json::to_string(&data())?)?;
        let mut diff_file = File::create(&diff_path)?;
        write!(diff_file, "{}", DIFF)?;

        let mut source = DiffFileSource::open(&data_path, &diff_path)?;
        assert_eq!(source.source_file(), "jargons.json");
        assert_eq!(source.pull_messages(10)?.len(), 3);

        Ok(())
    }

    #[test]
    fn test_open_rejects_bad_data_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let data_path = dir.path().join("categories.json");
        let diff_path = dir.path().join("categories.diff");
        std::fs::write(&data_path, "{not json")?;
        std::fs::write(&diff_path, DIFF)?;

        let result = DiffFileSource::open(&data_path, &diff_path);
        assert!(matches!(result, Err(SourceError::DataFile { .. })));

        Ok(())
    }
}
