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

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One step into a JSON document: a key into an object or an index into an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a changed node, as declared on a diff path line: `@ [0,"terms",1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DiffPath {
    segments: Vec<PathSegment>,
}

impl DiffPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from the decoded JSON of a path line.
    pub fn from_value(value: &Value) -> Result<Self, Diagnostic> {
        let items = value.as_array().ok_or_else(|| {
            Diagnostic::fatal(
                DiagnosticCode::InvalidPathSegment,
                format!("I expected the path to be a JSON array, but found {}.", value.type_name()),
            )
        })?;

        let mut segments = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let segment = match item {
                Value::String(key) => PathSegment::Key(key.clone()),
                Value::Number(number) => match number.as_u64() {
                    Some(index) => PathSegment::Index(index as usize),
                    None => {
                        return Err(Diagnostic::fatal(
                            DiagnosticCode::InvalidArrayIndex,
                            format!(
                                "I couldn't use {} at position {} as an array index.",
                                number, position
                            ),
                        ))
                    }
                },
                other => {
                    return Err(Diagnostic::fatal(
                        DiagnosticCode::InvalidPathSegment,
                        format!(
                            "I expected a key or an index at position {}, but found {}.",
                            position,
                            other.type_name()
                        ),
                    ))
                }
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path without its last segment. The root is its own parent.
    pub fn parent(&self) -> DiffPath {
        match self.segments.split_last() {
            Some((_, rest)) => DiffPath::new(rest.to_vec()),
            None => DiffPath::root(),
        }
    }

    pub fn get<'a>(&self, value: &'a Value) -> Result<&'a Value, Diagnostic> {
        let mut current = value;

        for segment in &self.segments {
            match (current, segment) {
                (Value::Object(obj), PathSegment::Key(key)) => {
                    current = obj.get(key).ok_or_else(|| {
                        Diagnostic::fatal(
                            DiagnosticCode::PathNotFound,
                            format!("I couldn't find the key '{}' at {}", key, self),
                        )
                    })?;
                }
                (Value::Array(arr), PathSegment::Index(index)) => {
                    current = arr.get(*index).ok_or_else(|| {
                        Diagnostic::fatal(
                            DiagnosticCode::PathNotFound,
                            format!(
                                "I couldn't find index {} (array length is {}) at {}",
                                index,
                                arr.len(),
                                self
                            ),
                        )
                    })?;
                }
                _ => {
                    return Err(Diagnostic::fatal(
                        DiagnosticCode::TypeMismatch,
                        format!(
                            "I can't index into {} with '{}' at {}",
                            current.type_name(),
                            segment,
                            self
                        ),
                    ));
                }
            }
        }

        Ok(current)
    }
}

impl fmt::Display for DiffPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            let escaped = segment.to_string().replace('~', "~0").replace('/', "~1");
            write!(f, "/{}", escaped)?;
        }
        Ok(())
    }
}

trait ValueTypeExt {
    fn type_name(&self) -> &'static str;
}

impl ValueTypeExt for Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_mixed_segments() {
        let path = DiffPath::from_value(&json!([26, "terms", 2])).unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Index(26),
                PathSegment::Key("terms".to_string()),
                PathSegment::Index(2),
            ]
        );
        assert_eq!(path.to_string(), "/26/terms/2");
    }

    #[test]
    fn test_from_value_rejects_non_array() {
        let err = DiffPath::from_value(&json!({"terms": 2})).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidPathSegment);
    }

    #[test]
    fn test_from_value_rejects_negative_index() {
        let err = DiffPath::from_value(&json!([-1])).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidArrayIndex);
    }

    #[test]
    fn test_from_value_rejects_nested_segment() {
        let err = DiffPath::from_value(&json!([0, ["terms"]])).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidPathSegment);
    }

    #[test]
    fn test_parent() {
        let path = DiffPath::from_value(&json!([0, "terms", 1, "archived"])).unwrap();
        assert_eq!(path.parent().to_string(), "/0/terms/1");
        assert!(DiffPath::root().parent().is_root());
    }

    #[test]
    fn test_get_nested() {
        let document = json!([{"id": "group-1", "terms": [{"id": "group-1-jargon-1"}]}]);
        let path = DiffPath::from_value(&json!([0, "terms", 0])).unwrap();
        assert_eq!(path.get(&document).unwrap(), &json!({"id": "group-1-jargon-1"}));
    }

    #[test]
    fn test_get_root() {
        let document = json!({"id": "cs.AI"});
        assert_eq!(DiffPath::root().get(&document).unwrap(), &document);
    }

    #[test]
    fn test_get_errors() {
        let document = json!([{"id": "group-1"}]);

        let missing = DiffPath::from_value(&json!([3])).unwrap();
        assert_eq!(missing.get(&document).unwrap_err().code, DiagnosticCode::PathNotFound);

        let mismatch = DiffPath::from_value(&json!(["id"])).unwrap();
        assert_eq!(mismatch.get(&document).unwrap_err().code, DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_display_escapes_keys() {
        let path = DiffPath::new(vec![PathSegment::Key("a/b~c".to_string())]);
        assert_eq!(path.to_string(), "/a~1b~0c");
    }
}
