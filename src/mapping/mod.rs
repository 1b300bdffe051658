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

//! Record typing: which data type a record is, how it is adapted for the
//! API, and which API route receives it.

pub mod adapters;
pub mod mapper;
pub mod registry;
pub mod routes;
pub mod types;

pub use adapters::{adapt, extract_group_id, required_fields};
pub use mapper::{FieldMapper, SchemaMapper, TypeMapper};
pub use registry::{Registry, RegistryBuilder, CATEGORIES_FILE, JARGONS_FILE};
pub use routes::{ApiRoute, RouteTable};
pub use types::{DataKind, DataType, TYPE_CATEGORY, TYPE_GROUP, TYPE_JARGON};
