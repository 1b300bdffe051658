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

use std::collections::HashMap;

use super::types::DataKind;
use crate::error::{RegistryError, RouteError};

/// Where records of one type live on the downstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoute {
    pub path: &'static str,
    /// Key of the record identifier in created payloads. Archive paths use
    /// the raw record's `id` instead.
    pub id_field: &'static str,
}

impl ApiRoute {
    pub const fn new(path: &'static str, id_field: &'static str) -> Self {
        Self { path, id_field }
    }

    /// Path of a single record: `/jargon/group-1-jargon-3`.
    pub fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }
}

pub const CATEGORY_ROUTE: ApiRoute = ApiRoute::new("/category", "category_id");
pub const GROUP_ROUTE: ApiRoute = ApiRoute::new("/jargon-group", "group_id");
pub const JARGON_ROUTE: ApiRoute = ApiRoute::new("/jargon", "jargon_id");

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<DataKind, ApiRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect_map() -> Self {
        Self::new()
            .with(DataKind::Category, CATEGORY_ROUTE)
            .with(DataKind::JargonGroup, GROUP_ROUTE)
            .with(DataKind::Jargon, JARGON_ROUTE)
    }

    pub fn with(mut self, kind: DataKind, route: ApiRoute) -> Self {
        self.routes.insert(kind, route);
        self
    }

    pub fn route(&self, kind: DataKind) -> Result<&ApiRoute, RouteError> {
        self.routes.get(&kind).ok_or(RouteError::UnknownType(kind))
    }

    /// Fails on the first of `kinds` without a route.
    pub fn validate(&self, kinds: impl IntoIterator<Item = DataKind>) -> Result<(), RegistryError> {
        for kind in kinds {
            if !self.routes.contains_key(&kind) {
                return Err(RegistryError::MissingRoute(kind));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::adapt;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_dialect_map_routes() {
        let table = RouteTable::dialect_map();

        assert_eq!(table.route(DataKind::Category).unwrap().path, "/category");
        assert_eq!(table.route(DataKind::JargonGroup).unwrap().id_field, "group_id");
        assert_eq!(
            table.route(DataKind::Jargon).unwrap().record_path("group-1-jargon-3"),
            "/jargon/group-1-jargon-3"
        );
        assert!(table.validate(DataKind::ALL).is_ok());
    }

    #[test]
    fn test_created_payloads_carry_id_field() {
        let table = RouteTable::dialect_map();
        let created_at = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        let samples = [
            (DataKind::Category, json!({"id": "cs.AI", "description": "AI"})),
            (
                DataKind::JargonGroup,
                json!({"id": "group-1", "description": "Models", "archived": false}),
            ),
            (
                DataKind::Jargon,
                json!({"id": "group-1-jargon-3", "name": "BERT", "regex": "BERT", "archived": false}),
            ),
        ];

        for (kind, sample) in samples {
            let record = sample.as_object().cloned().unwrap();
            let payload = adapt(kind, &record, created_at).unwrap();
            let route = table.route(kind).unwrap();

            assert_eq!(payload.get(route.id_field), record.get("id"), "{kind}");
        }
    }

    #[test]
    fn test_missing_route() {
        let table = RouteTable::new().with(DataKind::Category, CATEGORY_ROUTE);

        assert!(matches!(
            table.route(DataKind::Jargon),
            Err(RouteError::UnknownType(DataKind::Jargon))
        ));
        assert!(matches!(
            table.validate(DataKind::ALL),
            Err(RegistryError::MissingRoute(DataKind::JargonGroup))
        ));
    }
}
