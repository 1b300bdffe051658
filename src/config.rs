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

//! Layered job configuration.
//!
//! Sources, highest priority first:
//! 1. Command-line flags
//! 2. Environment variables (`DIALECT_MAP_*`)
//! 3. Built-in defaults
//!
//! `DIALECT_MAP_BATCH_SIZE` maps to `batch_size`, `DIALECT_MAP_GCP_KEY_PATH`
//! to `gcp_key_path`, and so on.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "DIALECT_MAP_";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_pubsub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    pub batch_size: usize,
    pub log_level: String,
    pub pubsub_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            gcp_project: None,
            gcp_pubsub: None,
            gcp_key_path: None,
            api_url: None,
            batch_size: 10,
            log_level: "INFO".to_string(),
            pubsub_endpoint: "https://pubsub.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp_pubsub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp_key_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl JobConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .merge(Serialized::defaults(overrides))
            .extract()?;

        if config.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(config)
    }

    pub fn gcp_project(&self) -> Result<&str, ConfigError> {
        required(&self.gcp_project, "gcp_project")
    }

    pub fn gcp_pubsub(&self) -> Result<&str, ConfigError> {
        required(&self.gcp_pubsub, "gcp_pubsub")
    }

    pub fn api_url(&self) -> Result<&str, ConfigError> {
        required(&self.api_url, "api_url")
    }

    /// The credentials file, which must exist.
    pub fn key_path(&self) -> Result<&Path, ConfigError> {
        let path = self
            .gcp_key_path
            .as_deref()
            .ok_or_else(|| ConfigError::NotConfigured {
                field: "gcp_key_path".to_string(),
            })?;

        if !path.is_file() {
            return Err(ConfigError::InvalidValue {
                field: "gcp_key_path".to_string(),
                reason: format!("{} is not a file", path.display()),
            });
        }
        Ok(path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ConfigError> {
    match value.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::NotConfigured {
            field: field.to_string(),
        }),
    }
}

/// Pre-minted bearer tokens read from the key file.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let credentials_error = |reason: String| ConfigError::Credentials {
            path: path.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|e| credentials_error(e.to_string()))?;
        let credentials: Self =
            serde_json::from_str(&text).map_err(|e| credentials_error(e.to_string()))?;

        if credentials.access_token.is_empty() {
            return Err(credentials_error("access_token is empty".to_string()));
        }
        Ok(credentials)
    }

    /// Token for Pub/Sub calls.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token for the private API: the identity token when present.
    pub fn api_token(&self) -> &str {
        self.id_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .unwrap_or(&self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[redacted]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
