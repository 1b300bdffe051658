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

//! Output side: the REST API that receives created and archived records.

use reqwest::blocking::{Client, Response};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::SinkError;
use crate::unfold::Record;

/// Receiver of dispatched records.
pub trait RecordSink {
    /// Creates a record under a collection path such as `/jargon`.
    fn create_record(&self, path: &str, payload: &Record) -> Result<(), SinkError>;

    /// Archives the record at an item path such as `/jargon/group-1-jargon-3`.
    fn archive_record(&self, path: &str) -> Result<(), SinkError>;
}

/// Blocking client for the dialect-map private API.
#[derive(Debug, Clone)]
pub struct ApiSink {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiSink {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl RecordSink for ApiSink {
    fn create_record(&self, path: &str, payload: &Record) -> Result<(), SinkError> {
        let url = self.url(path);
        debug!(%url, "POST record");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()?;
        check_response(resp)?;
        Ok(())
    }

    fn archive_record(&self, path: &str) -> Result<(), SinkError> {
        let url = self.url(path);
        debug!(%url, "PATCH archived");

        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&json!({"archived": true}))
            .send()?;
        check_response(resp)?;
        Ok(())
    }
}

/// Turns a non-success status into [`SinkError::Api`] carrying the body.
pub fn check_response(resp: Response) -> Result<Response, SinkError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(SinkError::Api {
            status: status.as_u16(),
            message: resp.text().unwrap_or_default(),
        });
    }
    Ok(resp)
}
