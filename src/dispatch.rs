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

//! Replays diff messages against a [`RecordSink`].
//!
//! Each message is handled on its own: its records are typed, adapted and sent
//! in order, and the first failing record stops the rest of that message. The
//! batch always moves on to the next message.

use serde::Serialize;
use serde_json::Value;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::entry::DiffKind;
use crate::error::{DispatchError, RecordError};
use crate::mapping::{adapt, Registry, TypeMapper};
use crate::message::DiffMessage;
use crate::sink::RecordSink;
use crate::unfold::Record;

/// Counters for a run of messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub messages: usize,
    pub created: usize,
    pub archived: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &MessageOutcome) {
        self.messages += 1;
        self.created += outcome.created;
        self.archived += outcome.archived;
        if outcome.error.is_some() {
            self.failed += 1;
        }
        if outcome.skipped {
            self.skipped += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages == 0
    }
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.messages += other.messages;
        self.created += other.created;
        self.archived += other.archived;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// What happened to one message. Counts include records sent before a failure.
#[derive(Debug, Default)]
pub struct MessageOutcome {
    pub created: usize,
    pub archived: usize,
    pub skipped: bool,
    pub error: Option<DispatchError>,
}

impl MessageOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Dispatcher<K> {
    registry: Arc<Registry>,
    sink: K,
}

impl<K: RecordSink> Dispatcher<K> {
    pub fn new(registry: Arc<Registry>, sink: K) -> Self {
        Self { registry, sink }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn dispatch_batch(&self, messages: &[DiffMessage]) -> BatchReport {
        let mut report = BatchReport::default();
        for message in messages {
            let outcome = self.dispatch_message(message);
            report.record(&outcome);
        }
        report
    }

    pub fn dispatch_message(&self, message: &DiffMessage) -> MessageOutcome {
        let mut outcome = MessageOutcome::default();

        let kind = match message.kind() {
            Some(DiffKind::Deletion) => {
                debug!(source_file = message.source_file(), "Skipping deletion");
                outcome.skipped = true;
                return outcome;
            }
            Some(kind) => kind,
            None => {
                let err = DispatchError::Record(RecordError::NoKind);
                error!(source_file = message.source_file(), error = %err, "Dispatch process stopped");
                outcome.error = Some(err);
                return outcome;
            }
        };

        if let Err(err) = self.dispatch_records(message, kind, &mut outcome) {
            outcome.error = Some(err);
        }
        outcome
    }

    fn dispatch_records(
        &self,
        message: &DiffMessage,
        kind: DiffKind,
        outcome: &mut MessageOutcome,
    ) -> Result<(), DispatchError> {
        let mapper = self.registry.mapper(message.source_file()).inspect_err(|err| {
            error!(source_file = message.source_file(), error = %err, "Invalid message source file");
        })?;

        for record in message.records()? {
            self.dispatch_record(message, kind, mapper, &record, outcome)
                .inspect_err(|err| {
                    let snapshot = Value::Object(record.clone());
                    error!(
                        source_file = message.source_file(),
                        record = %snapshot,
                        error = %err,
                        "Dispatch process stopped"
                    );
                })?;
        }

        Ok(())
    }

    fn dispatch_record(
        &self,
        message: &DiffMessage,
        kind: DiffKind,
        mapper: &dyn TypeMapper,
        record: &Record,
        outcome: &mut MessageOutcome,
    ) -> Result<(), DispatchError> {
        let data_kind = mapper.infer_type(record)?;
        let route = self.registry.route(data_kind)?;

        match kind {
            DiffKind::Creation => {
                let payload = adapt(data_kind, record, message.created_at())?;
                self.sink.create_record(route.path, &payload)?;
                outcome.created += 1;
                info!(route = route.path, kind = %data_kind, "Created record");
            }
            DiffKind::Edition => {
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(DispatchError::MissingRecordId)?;
                let path = route.record_path(id);
                self.sink.archive_record(&path)?;
                outcome.archived += 1;
                info!(route = %path, kind = %data_kind, "Archived record");
            }
            DiffKind::Deletion => {}
        }

        Ok(())
    }
}
