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

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod message;
pub mod parser;
pub mod path;
pub mod routine;
pub mod sink;
pub mod source;
pub mod unfold;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticLevel};
pub use dispatch::{BatchReport, Dispatcher, MessageOutcome};
pub use entry::{DiffEntry, DiffKind};
pub use message::DiffMessage;
pub use parser::DiffParser;
pub use path::{DiffPath, PathSegment};
pub use routine::Routine;
pub use unfold::{unfold, Record};
