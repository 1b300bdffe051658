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

//! Translation of raw dataset records into API payloads.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::types::DataKind;
use crate::error::AdaptError;
use crate::unfold::Record;

static JARGON_GROUP_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(group-\d+)-jargon-\d+$").expect("JARGON_GROUP_ID is a valid regex pattern")
});

pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields a raw record must carry for `kind`, in payload order.
pub fn required_fields(kind: DataKind) -> &'static [&'static str] {
    match kind {
        DataKind::Category => &["id", "description"],
        DataKind::JargonGroup => &["id", "description", "archived"],
        DataKind::Jargon => &["id", "name", "regex", "archived"],
    }
}

/// Group id embedded in a jargon id: `group-4-jargon-17` gives `group-4`.
pub fn extract_group_id(jargon_id: &str) -> Result<&str, AdaptError> {
    JARGON_GROUP_ID
        .captures(jargon_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AdaptError::InvalidJargonId(jargon_id.to_string()))
}

/// Builds the standardized payload for a record of type `kind`.
///
/// `created_at` is stamped on every payload; pass the message timestamp so the
/// output is reproducible.
pub fn adapt(kind: DataKind, record: &Record, created_at: DateTime<Utc>) -> Result<Record, AdaptError> {
    let field = |name: &'static str| {
        record
            .get(name)
            .cloned()
            .ok_or(AdaptError::MissingField { kind, field: name })
    };

    let mut payload = Record::new();
    match kind {
        DataKind::Category => {
            payload.insert("category_id".to_string(), field("id")?);
            payload.insert("description".to_string(), field("description")?);
        }
        DataKind::JargonGroup => {
            payload.insert("group_id".to_string(), field("id")?);
            payload.insert("description".to_string(), field("description")?);
            payload.insert("archived".to_string(), field("archived")?);
        }
        DataKind::Jargon => {
            let jargon_id = field("id")?;
            let group_id = match &jargon_id {
                Value::String(id) => extract_group_id(id)?.to_string(),
                other => return Err(AdaptError::InvalidJargonId(other.to_string())),
            };

            payload.insert("group_id".to_string(), Value::String(group_id));
            payload.insert("jargon_id".to_string(), jargon_id);
            payload.insert("jargon_str".to_string(), field("name")?);
            payload.insert("jargon_regex".to_string(), field("regex")?);
            payload.insert("archived".to_string(), field("archived")?);
        }
    }

    payload.insert(
        "created_at".to_string(),
        Value::String(created_at.format(CREATED_AT_FORMAT).to_string()),
    );

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn test_category_adapter() {
        let sample = record(json!({"id": "cs.AI", "description": "Artificial Intelligence"}));
        let adapted = adapt(DataKind::Category, &sample, timestamp()).unwrap();

        assert_eq!(
            Value::Object(adapted),
            json!({
                "category_id": "cs.AI",
                "description": "Artificial Intelligence",
                "created_at": "2021-03-04 05:06:07"
            })
        );
    }

    #[test]
    fn test_category_adapter_missing_fields() {
        let err = adapt(DataKind::Category, &Record::new(), timestamp()).unwrap_err();
        assert!(matches!(
            err,
            AdaptError::MissingField {
                kind: DataKind::Category,
                field: "id"
            }
        ));
    }

    #[test]
    fn test_group_adapter_ignores_extra_fields() {
        let sample = record(json!({
            "id": "group-1",
            "description": "example",
            "archived": false,
            "terms": []
        }));
        let adapted = adapt(DataKind::JargonGroup, &sample, timestamp()).unwrap();

        let keys: Vec<_> = adapted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["group_id", "description", "archived", "created_at"]);
    }

    #[test]
    fn test_group_adapter_missing_fields() {
        assert!(adapt(DataKind::JargonGroup, &Record::new(), timestamp()).is_err());
    }

    #[test]
    fn test_jargon_adapter() {
        let sample = record(json!({
            "id": "group-1-jargon-1",
            "name": "name",
            "regex": "[Ee]xample",
            "archived": false
        }));
        let adapted = adapt(DataKind::Jargon, &sample, timestamp()).unwrap();

        assert_eq!(
            Value::Object(adapted),
            json!({
                "group_id": "group-1",
                "jargon_id": "group-1-jargon-1",
                "jargon_str": "name",
                "jargon_regex": "[Ee]xample",
                "archived": false,
                "created_at": "2021-03-04 05:06:07"
            })
        );
    }

    #[test]
    fn test_jargon_adapter_invalid_id() {
        let sample = record(json!({
            "id": "wrong-id",
            "name": "name",
            "regex": "[Ee]xample",
            "archived": false
        }));
        let err = adapt(DataKind::Jargon, &sample, timestamp()).unwrap_err();
        assert!(matches!(err, AdaptError::InvalidJargonId(id) if id == "wrong-id"));
    }

    #[test]
    fn test_extract_group_id() {
        assert_eq!(extract_group_id("group-42-jargon-7").unwrap(), "group-42");
        assert!(extract_group_id("group-42").is_err());
        assert!(extract_group_id("xgroup-1-jargon-1").is_err());
    }

    #[test]
    fn test_required_fields_cover_payload_sources() {
        let sample = record(json!({
            "id": "group-1-jargon-1",
            "name": "name",
            "regex": "x",
            "archived": true
        }));
        for field in required_fields(DataKind::Jargon) {
            let mut partial = sample.clone();
            partial.remove(*field);
            assert!(adapt(DataKind::Jargon, &partial, timestamp()).is_err());
        }
    }
}
