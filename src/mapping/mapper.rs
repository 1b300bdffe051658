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

use serde_json::Value;
use tracing::debug;

use super::adapters::required_fields;
use super::types::{DataKind, DataType, TYPE_CATEGORY, TYPE_GROUP, TYPE_JARGON};
use crate::error::MappingError;
use crate::unfold::Record;

/// Infers the data type of a raw record.
pub trait TypeMapper: Send + Sync {
    fn infer_type(&self, record: &Record) -> Result<DataKind, MappingError>;

    /// Kinds this mapper can produce, in priority order.
    fn kinds(&self) -> Vec<DataKind>;
}

/// Matches one string field of the record against an ordered list of types.
///
/// The first type whose pattern matches wins.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    field: String,
    types: Vec<DataType>,
}

impl FieldMapper {
    pub fn new(field: impl Into<String>, types: Vec<DataType>) -> Self {
        Self {
            field: field.into(),
            types,
        }
    }

    /// Selects on the `id` field, trying every known type.
    pub fn by_id(types: Vec<DataType>) -> Self {
        Self::new("id", types)
    }

    /// Every dialect-map type, selected on `id`.
    pub fn dialect_map() -> Self {
        Self::by_id(vec![
            TYPE_CATEGORY.clone(),
            TYPE_GROUP.clone(),
            TYPE_JARGON.clone(),
        ])
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl TypeMapper for FieldMapper {
    fn infer_type(&self, record: &Record) -> Result<DataKind, MappingError> {
        let value = match record.get(&self.field) {
            Some(Value::String(value)) => value,
            _ => {
                return Err(MappingError::MissingSelector {
                    field: self.field.clone(),
                })
            }
        };

        self.types
            .iter()
            .find(|data_type| data_type.matches(value))
            .map(DataType::kind)
            .ok_or_else(|| MappingError::NoMatchingType {
                value: value.clone(),
                record: Value::Object(record.clone()).to_string(),
            })
    }

    fn kinds(&self) -> Vec<DataKind> {
        self.types.iter().map(DataType::kind).collect()
    }
}

/// Picks the first kind whose required fields are all present in the record.
#[derive(Debug, Clone)]
pub struct SchemaMapper {
    kinds: Vec<DataKind>,
}

impl SchemaMapper {
    pub fn new(kinds: Vec<DataKind>) -> Self {
        Self { kinds }
    }
}

impl TypeMapper for SchemaMapper {
    fn infer_type(&self, record: &Record) -> Result<DataKind, MappingError> {
        for kind in &self.kinds {
            let missing: Vec<_> = required_fields(*kind)
                .iter()
                .filter(|field| !record.contains_key(**field))
                .collect();

            if missing.is_empty() {
                return Ok(*kind);
            }
            debug!(kind = %kind, ?missing, "Incompatible schema");
        }

        Err(MappingError::NoCompatibleSchema {
            record: Value::Object(record.clone()).to_string(),
        })
    }

    fn kinds(&self) -> Vec<DataKind> {
        self.kinds.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop_mapper() -> FieldMapper {
        FieldMapper::new(
            "prop",
            vec![TYPE_CATEGORY.clone(), TYPE_JARGON.clone(), TYPE_GROUP.clone()],
        )
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_mapper_infer() {
        let mapper = prop_mapper();
        let cases = [
            ("cs.AI", DataKind::Category),
            ("group-1", DataKind::JargonGroup),
            ("group-123", DataKind::JargonGroup),
            ("group-1-jargon-1", DataKind::Jargon),
            ("group-1-jargon-123", DataKind::Jargon),
        ];

        for (value, expected) in cases {
            let kind = mapper.infer_type(&record(json!({"prop": value}))).unwrap();
            assert_eq!(kind, expected, "for {}", value);
        }
    }

    #[test]
    fn test_field_mapper_infer_invalid() {
        let mapper = prop_mapper();

        for value in ["wrong", "groups", "group-X", "group-1-jargon-X"] {
            let err = mapper.infer_type(&record(json!({"prop": value}))).unwrap_err();
            assert!(
                matches!(err, MappingError::NoMatchingType { .. }),
                "for {}",
                value
            );
        }
    }

    #[test]
    fn test_field_mapper_missing_selector() {
        let mapper = prop_mapper();

        let err = mapper.infer_type(&record(json!({"id": "cs.AI"}))).unwrap_err();
        assert!(matches!(err, MappingError::MissingSelector { field } if field == "prop"));

        let err = mapper.infer_type(&record(json!({"prop": 12}))).unwrap_err();
        assert!(matches!(err, MappingError::MissingSelector { .. }));
    }

    #[test]
    fn test_field_mapper_first_match_wins() {
        let loose = DataType::new(DataKind::JargonGroup, r"^group-.*$").unwrap();
        let mapper = FieldMapper::by_id(vec![loose, TYPE_JARGON.clone()]);

        let kind = mapper.infer_type(&record(json!({"id": "group-1-jargon-1"}))).unwrap();
        assert_eq!(kind, DataKind::JargonGroup);
        assert_eq!(mapper.kinds(), vec![DataKind::JargonGroup, DataKind::Jargon]);
    }

    #[test]
    fn test_dialect_map_mapper() {
        let mapper = FieldMapper::dialect_map();
        assert_eq!(mapper.field(), "id");
        assert_eq!(mapper.kinds(), DataKind::ALL.to_vec());
        assert_eq!(
            mapper.infer_type(&record(json!({"id": "stat.ML"}))).unwrap(),
            DataKind::Category
        );
    }

    #[test]
    fn test_schema_mapper() {
        let mapper = SchemaMapper::new(vec![DataKind::JargonGroup, DataKind::Jargon]);

        let group = record(json!({"id": "group-1", "description": "d", "archived": false}));
        assert_eq!(mapper.infer_type(&group).unwrap(), DataKind::JargonGroup);

        let jargon = record(json!({"id": "group-1-jargon-1", "name": "n", "regex": "r", "archived": false}));
        assert_eq!(mapper.infer_type(&jargon).unwrap(), DataKind::Jargon);

        let neither = record(json!({"id": "group-1"}));
        assert!(matches!(
            mapper.infer_type(&neither).unwrap_err(),
            MappingError::NoCompatibleSchema { .. }
        ));
    }
}
