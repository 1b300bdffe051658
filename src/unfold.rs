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

//! Flattening of nested creation payloads into atomic records.
//!
//! A created dataset entry can carry its children inline (a jargon group with
//! its `terms` array, for example). Every JSON object found in the payload is
//! one record. Records are emitted in pre-order, each stripped of the fields
//! whose values are objects or arrays, since those children are emitted on
//! their own.

use serde_json::{Map, Value};

/// A flat JSON object extracted from a diff payload.
pub type Record = Map<String, Value>;

/// Emits every object in `value`, depth first, parents before children.
///
/// Array elements are visited in order and object values in document order.
/// Scalars are never emitted on their own, so a scalar payload yields nothing.
pub fn unfold(value: &Value) -> Vec<Record> {
    let mut records = Vec::new();
    let mut stack = vec![value];

    while let Some(current) = stack.pop() {
        match current {
            Value::Object(obj) => {
                records.push(pruned(obj));
                stack.extend(obj.values().rev());
            }
            Value::Array(items) => {
                stack.extend(items.iter().rev());
            }
            _ => {}
        }
    }

    records
}

/// Copy of `record` without its object and array valued fields.
pub fn pruned(record: &Record) -> Record {
    record
        .iter()
        .filter(|(_, value)| !value.is_object() && !value.is_array())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
