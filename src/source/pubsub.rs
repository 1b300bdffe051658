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

//! Google Pub/Sub subscription reader over the REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::MessageSource;
use crate::error::SourceError;
use crate::message::DiffMessage;

pub const MSG_TYPE_ATTRIBUTE: &str = "msgType";
pub const MSG_TYPE_DATA_DIFF: &str = "data-diff";

/// Consecutive pulls with nothing but skipped messages before giving up.
pub const MAX_SKIPPED_PULLS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    max_messages: usize,
    return_immediately: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedMessage {
    ack_id: String,
    message: PubsubMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PubsubMessage {
    #[serde(default)]
    data: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    message_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeRequest<'a> {
    ack_ids: Vec<&'a str>,
}

#[derive(Debug, Error)]
enum DecodeError {
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("message data is not a diff message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pulls `data-diff` messages from one subscription.
///
/// Only messages that decode cleanly are acknowledged. Messages of another
/// type, or that fail to decode, stay on the subscription for redelivery. A
/// pull whose messages were all skipped is followed by another pull, so an
/// empty batch means the subscription had nothing to deliver.
#[derive(Debug)]
pub struct PubSubSource {
    client: Client,
    subscription_url: String,
    token: String,
    closed: bool,
}

impl PubSubSource {
    pub fn new(
        endpoint: &str,
        project: &str,
        subscription: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let subscription_url = format!(
            "{}/v1/projects/{}/subscriptions/{}",
            endpoint.trim_end_matches('/'),
            project,
            subscription
        );

        Ok(Self {
            client,
            subscription_url,
            token: token.into(),
            closed: false,
        })
    }

    pub fn subscription_url(&self) -> &str {
        &self.subscription_url
    }

    fn pull(&self, max: usize) -> Result<PullResponse, SourceError> {
        let resp = self
            .client
            .post(format!("{}:pull", self.subscription_url))
            .bearer_auth(&self.token)
            .json(&PullRequest {
                max_messages: max,
                return_immediately: true,
            })
            .send()?;

        Ok(check_response(resp)?.json()?)
    }

    fn acknowledge(&self, ack_ids: Vec<&str>) -> Result<(), SourceError> {
        if ack_ids.is_empty() {
            return Ok(());
        }

        let resp = self
            .client
            .post(format!("{}:acknowledge", self.subscription_url))
            .bearer_auth(&self.token)
            .json(&AcknowledgeRequest { ack_ids })
            .send()?;
        check_response(resp)?;
        Ok(())
    }

    /// Decodes the `data-diff` messages of a pull and acknowledges them.
    fn accept(&self, received: &[ReceivedMessage]) -> Result<Vec<DiffMessage>, SourceError> {
        let mut ack_ids = Vec::with_capacity(received.len());
        let mut messages = Vec::with_capacity(received.len());

        for item in received {
            let message_id = item.message.message_id.as_str();
            let msg_type = item.message.attributes.get(MSG_TYPE_ATTRIBUTE);

            if msg_type.map(String::as_str) != Some(MSG_TYPE_DATA_DIFF) {
                warn!(message_id, msg_type = ?msg_type, "Unexpected type. Ignoring message");
                continue;
            }

            match decode(&item.message) {
                Ok(message) => {
                    ack_ids.push(item.ack_id.as_str());
                    messages.push(message);
                }
                Err(err) => {
                    error!(message_id, data = %item.message.data, error = %err, "Cannot parse message");
                }
            }
        }

        self.acknowledge(ack_ids)?;
        Ok(messages)
    }
}

fn decode(message: &PubsubMessage) -> Result<DiffMessage, DecodeError> {
    let bytes = STANDARD.decode(&message.data)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn check_response(resp: Response) -> Result<Response, SourceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: resp.text().unwrap_or_default(),
        });
    }
    Ok(resp)
}

impl MessageSource for PubSubSource {
    fn pull_messages(&mut self, max: usize) -> Result<Vec<DiffMessage>, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }

        // Unacknowledged messages stay leased until their ack deadline, so a
        // run of fully skipped pulls is bounded.
        for attempt in 1..=MAX_SKIPPED_PULLS {
            let received = self.pull(max)?.received_messages;
            debug!(count = received.len(), attempt, "Pulled Pub/Sub messages");

            if received.is_empty() {
                return Ok(Vec::new());
            }

            let messages = self.accept(&received)?;
            if !messages.is_empty() {
                return Ok(messages);
            }
            info!(skipped = received.len(), "Every pulled message was skipped. Pulling again");
        }

        warn!(attempts = MAX_SKIPPED_PULLS, "Only skipped messages were pulled. Stopping");
        Ok(Vec::new())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        if !self.closed {
            info!(subscription = %self.subscription_url, "Closing Pub/Sub subscription");
            self.closed = true;
        }
        Ok(())
    }
}
