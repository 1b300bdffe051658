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
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::{DiffEntry, DiffKind};
use crate::error::RecordError;
use crate::unfold::{unfold, Record};

/// One dataset change as delivered by a message source.
///
/// On the wire this is a JSON object with snake_case keys. A `null` or
/// missing `value_prev`/`value_post` means the snapshot is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffMessage {
    #[serde(default)]
    container: Value,
    #[serde(default)]
    field_name: String,
    #[serde(default)]
    value_prev: Option<Value>,
    #[serde(default)]
    value_post: Option<Value>,
    source_file: String,
    created_at: DateTime<Utc>,
}

impl DiffMessage {
    pub fn new(
        container: Value,
        field_name: impl Into<String>,
        value_prev: Option<Value>,
        value_post: Option<Value>,
        source_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            container,
            field_name: field_name.into(),
            value_prev,
            value_post,
            source_file: source_file.into(),
            created_at,
        }
    }

    /// Wraps a parsed diff entry. The field name is the entry's last key, if any.
    pub fn from_entry(
        entry: DiffEntry,
        container: Value,
        source_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let field_name = match entry.path().last() {
            Some(segment) if entry.is_edition() => segment.to_string(),
            _ => String::new(),
        };
        let (_, value_prev, value_post) = entry.into_parts();

        Self::new(container, field_name, value_prev, value_post, source_file, created_at)
    }

    pub fn container(&self) -> &Value {
        &self.container
    }

    /// The record relevant to routing: the object holding the changed field.
    pub fn record(&self) -> &Value {
        &self.container
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn value_prev(&self) -> Option<&Value> {
        self.value_prev.as_ref()
    }

    pub fn value_post(&self) -> Option<&Value> {
        self.value_post.as_ref()
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> Option<DiffKind> {
        DiffKind::classify(self.value_prev.is_some(), self.value_post.is_some())
    }

    pub fn is_creation(&self) -> bool {
        self.kind() == Some(DiffKind::Creation)
    }

    pub fn is_deletion(&self) -> bool {
        self.kind() == Some(DiffKind::Deletion)
    }

    pub fn is_edition(&self) -> bool {
        self.kind() == Some(DiffKind::Edition)
    }

    /// Records carried by this message.
    ///
    /// A creation yields every object in the created value, pruned. An edition
    /// yields the container as is. Deletions are not replayed and yield none.
    pub fn records(&self) -> Result<Vec<Record>, RecordError> {
        match (self.kind(), &self.value_post) {
            (Some(DiffKind::Creation), Some(post)) => Ok(unfold(post)),
            (Some(DiffKind::Edition), _) => match &self.container {
                Value::Object(container) => Ok(vec![container.clone()]),
                _ => Err(RecordError::ContainerNotObject),
            },
            (Some(DiffKind::Deletion), _) => Ok(Vec::new()),
            _ => Err(RecordError::NoKind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::DiffPath;
    use chrono::TimeZone;
    use serde_json::json;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
    }

    fn dummy(prev: Option<Value>, post: Option<Value>) -> DiffMessage {
        DiffMessage::new(json!({"id": "test"}), "field_name", prev, post, "file.json", timestamp())
    }

    #[test]
    fn test_creation_records() {
        let post = json!({"id": "example", "count": 5, "list": [{"id": "A"}, {"id": "B"}]});
        let message = dummy(None, Some(post));

        let records: Vec<_> = message.records().unwrap().into_iter().map(Value::Object).collect();
        assert_eq!(
            records,
            vec![json!({"id": "example", "count": 5}), json!({"id": "A"}), json!({"id": "B"})]
        );
    }

    #[test]
    fn test_edition_records() {
        let message = dummy(
            Some(json!({"id": "example", "count": 5, "archived": false})),
            Some(json!({"id": "example", "count": 5, "archived": true})),
        );

        let records = message.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(Value::Object(records[0].clone()), json!({"id": "test"}));
    }

    #[test]
    fn test_edition_requires_object_container() {
        let message = DiffMessage::new(
            json!("cs.AI"),
            "description",
            Some(json!("a")),
            Some(json!("b")),
            "categories.json",
            timestamp(),
        );
        assert!(matches!(message.records(), Err(RecordError::ContainerNotObject)));
    }

    #[test]
    fn test_deletion_and_empty_records() {
        assert!(dummy(Some(json!({"id": "A"})), None).records().unwrap().is_empty());
        assert!(matches!(dummy(None, None).records(), Err(RecordError::NoKind)));
    }

    #[test]
    fn test_wire_form() {
        let wire = json!({
            "container": {"id": "group-1", "archived": true},
            "field_name": "archived",
            "value_prev": false,
            "value_post": true,
            "source_file": "jargons.json",
            "created_at": "2021-06-01T12:00:00Z"
        });

        let message: DiffMessage = serde_json::from_value(wire).unwrap();
        assert!(message.is_edition());
        assert_eq!(message.source_file(), "jargons.json");
        assert_eq!(message.created_at(), timestamp());
        assert_eq!(message.record(), &json!({"id": "group-1", "archived": true}));
    }

    #[test]
    fn test_wire_form_null_means_absent() {
        let wire = json!({
            "container": null,
            "value_prev": null,
            "value_post": {"id": "cs.AI", "description": "AI"},
            "source_file": "categories.json",
            "created_at": "2021-06-01T12:00:00Z"
        });

        let message: DiffMessage = serde_json::from_value(wire).unwrap();
        assert!(message.is_creation());
        assert_eq!(message.field_name(), "");
    }

    #[test]
    fn test_nulled_field_keeps_kind_across_wire() {
        let path = DiffPath::from_value(&json!([0, "description"])).unwrap();
        let entry = DiffEntry::new(path, Some(json!("AI")), Some(Value::Null)).unwrap();
        let message = DiffMessage::from_entry(entry, Value::Null, "categories.json", timestamp());
        assert_eq!(message.kind(), Some(DiffKind::Deletion));

        let wire = serde_json::to_string(&message).unwrap();
        let decoded: DiffMessage = serde_json::from_str(&wire).unwrap();
        assert_eq!(decoded.kind(), message.kind());
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_from_edition_entry() {
        let path = DiffPath::from_value(&json!([0, "terms", 1, "archived"])).unwrap();
        let entry = DiffEntry::new(path, Some(json!(false)), Some(json!(true))).unwrap();
        let container = json!({"id": "group-1-jargon-2", "archived": true});

        let message = DiffMessage::from_entry(entry, container.clone(), "jargons.json", timestamp());
        assert_eq!(message.field_name(), "archived");
        assert_eq!(message.container(), &container);
        assert_eq!(message.kind(), Some(DiffKind::Edition));
    }
}
