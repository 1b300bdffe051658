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

//! Error types for everything past the diff reader.
//!
//! Diff-format problems are reported as [`Diagnostic`] values with line
//! locations. The enums here cover type inference, adaptation, routing, the
//! collaborators and the job setup.

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::mapping::DataKind;

/// A record could not be assigned a data type.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("record has no string field '{field}' to infer its type from")]
    MissingSelector { field: String },

    #[error("no data type matches '{value}' (record: {record})")]
    NoMatchingType { value: String, record: String },

    #[error("no data type has all of its required fields in record {record}")]
    NoCompatibleSchema { record: String },

    #[error("no type mapper is registered for source file '{0}'")]
    UnknownSourceFile(String),
}

/// A raw record could not be turned into its API payload.
#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("{kind} record is missing the '{field}' field")]
    MissingField { kind: DataKind, field: &'static str },

    #[error("jargon id '{0}' does not name its group (expected group-<n>-jargon-<m>)")]
    InvalidJargonId(String),
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no API route is registered for data type {0}")]
    UnknownType(DataKind),
}

/// The type and route registry failed validation at construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("pattern for {name} must be anchored with '^' and '$': {pattern}")]
    UnanchoredPattern { name: String, pattern: String },

    #[error("pattern for {name} is not a valid regular expression")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("data type {0} has no API route")]
    MissingRoute(DataKind),
}

/// Errors from the downstream REST API.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the message input collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] Diagnostic),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pub/Sub error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not read data file {}: {source}", .path.display())]
    DataFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("the message source is closed")]
    Closed,
}

/// A message does not carry extractable records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("message has neither a previous nor a posterior value")]
    NoKind,

    #[error("edited container is not a JSON object")]
    ContainerNotObject,
}

/// Failure of one record inside a message. Aborts the rest of that message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Adapt(#[from] AdaptError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("edited record has no string 'id' field")]
    MissingRecordId,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("'{field}' is not configured (pass a flag or set DIALECT_MAP_{})", .field.to_uppercase())]
    NotConfigured { field: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("could not load credentials from {}: {reason}", .path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("could not initialize logging: {0}")]
    Logging(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Figment(Box::new(error))
    }
}

/// Anything that stops a job command.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_names_env_var() {
        let err = ConfigError::NotConfigured {
            field: "gcp_project".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'gcp_project' is not configured (pass a flag or set DIALECT_MAP_GCP_PROJECT)"
        );
    }

    #[test]
    fn test_dispatch_error_is_transparent() {
        let err: DispatchError = AdaptError::MissingField {
            kind: DataKind::Jargon,
            field: "regex",
        }
        .into();
        assert_eq!(err.to_string(), "Jargon record is missing the 'regex' field");
    }
}
