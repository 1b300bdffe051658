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

//! Input side: where diff messages come from.

mod diff_file;
mod pubsub;

pub use diff_file::DiffFileSource;
pub use pubsub::{PubSubSource, MAX_SKIPPED_PULLS, MSG_TYPE_ATTRIBUTE, MSG_TYPE_DATA_DIFF};

use crate::error::SourceError;
use crate::message::DiffMessage;

/// A pull-based supplier of diff messages.
///
/// A short batch means the source is nearly drained; an empty one ends the run.
pub trait MessageSource {
    fn pull_messages(&mut self, max: usize) -> Result<Vec<DiffMessage>, SourceError>;

    fn close(&mut self) -> Result<(), SourceError>;
}
