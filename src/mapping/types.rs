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

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::RegistryError;

/// The closed vocabulary of dataset record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataKind {
    Category,
    JargonGroup,
    Jargon,
}

impl DataKind {
    pub const ALL: [DataKind; 3] = [DataKind::Category, DataKind::JargonGroup, DataKind::Jargon];

    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Category => "Category",
            DataKind::JargonGroup => "JargonGroup",
            DataKind::Jargon => "Jargon",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record type identified by a full-string match on its selector value.
#[derive(Debug, Clone)]
pub struct DataType {
    kind: DataKind,
    source: String,
    pattern: Regex,
}

impl DataType {
    /// Compiles `pattern`, which must be anchored at both ends.
    ///
    /// The anchors apply to the whole pattern, so `^a|b$` only matches `a`
    /// or `b`.
    pub fn new(kind: DataKind, pattern: &str) -> Result<Self, RegistryError> {
        if !pattern.starts_with('^') || !pattern.ends_with('$') {
            return Err(RegistryError::UnanchoredPattern {
                name: kind.name().to_string(),
                pattern: pattern.to_string(),
            });
        }

        let inner = &pattern[1..pattern.len() - 1];
        let compiled = Regex::new(&format!("^(?:{})$", inner)).map_err(|source| {
            RegistryError::InvalidPattern {
                name: kind.name().to_string(),
                source,
            }
        })?;

        Ok(Self {
            kind,
            source: pattern.to_string(),
            pattern: compiled,
        })
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

/// arXiv category ids: `cs.AI`, `astro-ph.GA`, `q-bio.NC`, `hep-th`.
pub static TYPE_CATEGORY: LazyLock<DataType> = LazyLock::new(|| {
    DataType::new(
        DataKind::Category,
        r"^((astro)|(cond)|(cs)|(econ)|(eess)|(gr)|(hep)|(math)|(nlin)|(nucl)|(physics)|(q)|(quant)|(stat))(-\w+)?(\.\w+)?(-\w+)?$",
    )
    .expect("TYPE_CATEGORY is a valid anchored pattern")
});

pub static TYPE_GROUP: LazyLock<DataType> = LazyLock::new(|| {
    DataType::new(DataKind::JargonGroup, r"^group-\d+$")
        .expect("TYPE_GROUP is a valid anchored pattern")
});

pub static TYPE_JARGON: LazyLock<DataType> = LazyLock::new(|| {
    DataType::new(DataKind::Jargon, r"^group-\d+-jargon-\d+$")
        .expect("TYPE_JARGON is a valid anchored pattern")
});
