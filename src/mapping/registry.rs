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

use std::collections::BTreeMap;
use std::fmt;

use super::mapper::{FieldMapper, TypeMapper};
use super::routes::{ApiRoute, RouteTable};
use super::types::{DataKind, TYPE_CATEGORY, TYPE_GROUP, TYPE_JARGON};
use crate::error::{MappingError, RegistryError, RouteError};

pub const CATEGORIES_FILE: &str = "categories.json";
pub const JARGONS_FILE: &str = "jargons.json";

/// Type mappers keyed by source file, plus the API routes they lead to.
///
/// Built once and then only read. Construction checks that every kind a
/// mapper can produce has a route.
pub struct Registry {
    mappers: BTreeMap<String, Box<dyn TypeMapper>>,
    routes: RouteTable,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Mappers and routes for the dialect-map dataset files.
    pub fn dialect_map() -> Result<Self, RegistryError> {
        Self::builder()
            .mapper(
                CATEGORIES_FILE,
                FieldMapper::by_id(vec![TYPE_CATEGORY.clone()]),
            )
            .mapper(
                JARGONS_FILE,
                FieldMapper::by_id(vec![TYPE_GROUP.clone(), TYPE_JARGON.clone()]),
            )
            .routes(RouteTable::dialect_map())
            .build()
    }

    pub fn mapper(&self, source_file: &str) -> Result<&dyn TypeMapper, MappingError> {
        self.mappers
            .get(source_file)
            .map(|mapper| mapper.as_ref())
            .ok_or_else(|| MappingError::UnknownSourceFile(source_file.to_string()))
    }

    pub fn route(&self, kind: DataKind) -> Result<&ApiRoute, RouteError> {
        self.routes.route(kind)
    }

    pub fn source_files(&self) -> impl Iterator<Item = &str> {
        self.mappers.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("source_files", &self.mappers.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    mappers: BTreeMap<String, Box<dyn TypeMapper>>,
    routes: RouteTable,
}

impl RegistryBuilder {
    pub fn mapper(mut self, source_file: impl Into<String>, mapper: impl TypeMapper + 'static) -> Self {
        self.mappers.insert(source_file.into(), Box::new(mapper));
        self
    }

    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        for mapper in self.mappers.values() {
            self.routes.validate(mapper.kinds())?;
        }

        Ok(Registry {
            mappers: self.mappers,
            routes: self.routes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::routes::CATEGORY_ROUTE;
    use crate::mapping::SchemaMapper;
    use serde_json::json;

    #[test]
    fn test_dialect_map_registry() {
        let registry = Registry::dialect_map().unwrap();

        let files: Vec<_> = registry.source_files().collect();
        assert_eq!(files, vec![CATEGORIES_FILE, JARGONS_FILE]);

        let record = json!({"id": "group-3"}).as_object().cloned().unwrap();
        let kind = registry.mapper(JARGONS_FILE).unwrap().infer_type(&record).unwrap();
        assert_eq!(kind, DataKind::JargonGroup);
        assert_eq!(registry.route(kind).unwrap().path, "/jargon-group");
    }

    #[test]
    fn test_categories_file_only_knows_categories() {
        let registry = Registry::dialect_map().unwrap();
        let record = json!({"id": "group-3"}).as_object().cloned().unwrap();

        let err = registry
            .mapper(CATEGORIES_FILE)
            .unwrap()
            .infer_type(&record)
            .unwrap_err();
        assert!(matches!(err, MappingError::NoMatchingType { .. }));
    }

    #[test]
    fn test_unknown_source_file() {
        let registry = Registry::dialect_map().unwrap();
        let Err(err) = registry.mapper("papers.json") else {
            panic!("papers.json should have no mapper");
        };
        assert!(matches!(err, MappingError::UnknownSourceFile(f) if f == "papers.json"));
    }

    #[test]
    fn test_build_rejects_unrouted_kind() {
        let result = Registry::builder()
            .mapper("jargons.json", SchemaMapper::new(vec![DataKind::Jargon]))
            .routes(RouteTable::new().with(DataKind::Category, CATEGORY_ROUTE))
            .build();

        assert!(matches!(
            result,
            Err(RegistryError::MissingRoute(DataKind::Jargon))
        ));
    }
}
