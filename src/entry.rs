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

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::path::DiffPath;

/// Kind of change, derived from which snapshots are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Creation,
    Deletion,
    Edition,
}

impl DiffKind {
    /// `None` when both snapshots are absent, which no well-formed diff produces.
    pub fn classify(has_prev: bool, has_post: bool) -> Option<Self> {
        match (has_prev, has_post) {
            (false, true) => Some(DiffKind::Creation),
            (true, false) => Some(DiffKind::Deletion),
            (true, true) => Some(DiffKind::Edition),
            (false, false) => None,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "creation" | "created" | "add" => Some(DiffKind::Creation),
            "deletion" | "deleted" | "remove" => Some(DiffKind::Deletion),
            "edition" | "edited" | "change" => Some(DiffKind::Edition),
            _ => None,
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiffKind::Creation => "creation",
            DiffKind::Deletion => "deletion",
            DiffKind::Edition => "edition",
        };
        f.pad(name)
    }
}

/// One structural change between two versions of a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    path: DiffPath,
    kind: DiffKind,
    value_prev: Option<Value>,
    value_post: Option<Value>,
}

impl DiffEntry {
    /// A `null` snapshot counts as absent, as it does on the message wire form.
    pub fn new(
        path: DiffPath,
        value_prev: Option<Value>,
        value_post: Option<Value>,
    ) -> Result<Self, Diagnostic> {
        let value_prev = value_prev.filter(|value| !value.is_null());
        let value_post = value_post.filter(|value| !value.is_null());
        let kind = DiffKind::classify(value_prev.is_some(), value_post.is_some()).ok_or_else(|| {
            Diagnostic::fatal(
                DiagnosticCode::EmptyBlock,
                format!("The block for {} has neither a removed nor an added value.", path),
            )
            .with_advice(
                "Each block must be followed by a '- <json>' line, a '+ <json>' line, or both."
                    .to_string(),
            )
        })?;

        Ok(Self {
            path,
            kind,
            value_prev,
            value_post,
        })
    }

    pub fn path(&self) -> &DiffPath {
        &self.path
    }

    pub fn kind(&self) -> DiffKind {
        self.kind
    }

    pub fn value_prev(&self) -> Option<&Value> {
        self.value_prev.as_ref()
    }

    pub fn value_post(&self) -> Option<&Value> {
        self.value_post.as_ref()
    }

    pub fn is_creation(&self) -> bool {
        self.kind == DiffKind::Creation
    }

    pub fn is_deletion(&self) -> bool {
        self.kind == DiffKind::Deletion
    }

    pub fn is_edition(&self) -> bool {
        self.kind == DiffKind::Edition
    }

    /// Path of the object holding an edited field; the entry path for anything else.
    pub fn object_path(&self) -> DiffPath {
        if self.is_edition() {
            self.path.parent()
        } else {
            self.path.clone()
        }
    }

    pub fn into_parts(self) -> (DiffPath, Option<Value>, Option<Value>) {
        (self.path, self.value_prev, self.value_post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(value: Value) -> DiffPath {
        DiffPath::from_value(&value).unwrap()
    }

    #[test]
    fn test_classification_is_exclusive() {
        let cases = [
            (None, Some(json!({"id": "A"})), DiffKind::Creation),
            (Some(json!("old")), None, DiffKind::Deletion),
            (Some(json!(false)), Some(json!(true)), DiffKind::Edition),
        ];

        for (prev, post, expected) in cases {
            let entry = DiffEntry::new(path(json!([0])), prev, post).unwrap();
            let flags = [entry.is_creation(), entry.is_deletion(), entry.is_edition()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            assert_eq!(entry.kind(), expected);
        }
    }

    #[test]
    fn test_null_snapshot_counts_as_absent() {
        let entry = DiffEntry::new(path(json!(["description"])), Some(json!("x")), Some(Value::Null))
            .unwrap();
        assert!(entry.is_deletion());
        assert_eq!(entry.value_post(), None);

        let err = DiffEntry::new(path(json!([0])), Some(Value::Null), Some(Value::Null)).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::EmptyBlock);
    }

    #[test]
    fn test_both_absent_is_rejected() {
        let err = DiffEntry::new(path(json!([0])), None, None).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::EmptyBlock);
    }

    #[test]
    fn test_object_path_strips_edited_field() {
        let entry = DiffEntry::new(
            path(json!([0, "terms", 1, "archived"])),
            Some(json!(false)),
            Some(json!(true)),
        )
        .unwrap();
        assert_eq!(entry.object_path(), path(json!([0, "terms", 1])));
    }

    #[test]
    fn test_object_path_keeps_created_path() {
        let entry =
            DiffEntry::new(path(json!([26, "terms", 2])), None, Some(json!({"id": "x"}))).unwrap();
        assert_eq!(entry.object_path(), path(json!([26, "terms", 2])));
    }

    #[test]
    fn test_parse_kind_names() {
        assert_eq!(DiffKind::parse("creation"), Some(DiffKind::Creation));
        assert_eq!(DiffKind::parse("remove"), Some(DiffKind::Deletion));
        assert_eq!(DiffKind::parse("edition"), Some(DiffKind::Edition));
        assert_eq!(DiffKind::parse("rename"), None);
    }
}
