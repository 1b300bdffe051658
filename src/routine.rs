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

use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::dispatch::{BatchReport, Dispatcher};
use crate::error::SourceError;
use crate::sink::RecordSink;
use crate::source::MessageSource;

/// Moves messages from a source to a sink until the source runs dry.
pub struct Routine<S, K> {
    source: S,
    dispatcher: Dispatcher<K>,
}

impl<S: MessageSource, K: RecordSink> Routine<S, K> {
    pub fn new(source: S, dispatcher: Dispatcher<K>) -> Self {
        Self { source, dispatcher }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn dispatcher(&self) -> &Dispatcher<K> {
        &self.dispatcher
    }

    /// Pulls up to `batch_size` messages at a time and dispatches them.
    ///
    /// Stops at the first empty batch and closes the source. A failed pull
    /// also closes the source before the error is returned.
    pub fn run(&mut self, batch_size: usize) -> Result<BatchReport, SourceError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("routine", %run_id);
        let _enter = span.enter();

        let mut total = BatchReport::default();
        loop {
            info!(batch_size, "Reading messages");
            let messages = match self.source.pull_messages(batch_size) {
                Ok(messages) => messages,
                Err(err) => {
                    error!(error = %err, "Could not pull messages");
                    if let Err(close_err) = self.source.close() {
                        error!(error = %close_err, "Could not close the message source");
                    }
                    return Err(err);
                }
            };

            if messages.is_empty() {
                info!("No more messages. Stopping routine");
                self.source.close()?;
                break;
            }

            let report = self.dispatcher.dispatch_batch(&messages);
            info!(
                messages = report.messages,
                created = report.created,
                archived = report.archived,
                failed = report.failed,
                skipped = report.skipped,
                "Batch dispatched"
            );
            total += report;
        }

        info!(
            messages = total.messages,
            created = total.created,
            archived = total.archived,
            failed = total.failed,
            "Routine finished"
        );
        Ok(total)
    }

    pub fn into_parts(self) -> (S, Dispatcher<K>) {
        (self.source, self.dispatcher)
    }
}
