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

use diff_dispatch::config::{ConfigOverrides, Credentials, JobConfig};
use diff_dispatch::error::JobError;
use diff_dispatch::mapping::Registry;
use diff_dispatch::sink::ApiSink;
use diff_dispatch::source::{DiffFileSource, MessageSource, PubSubSource};
use diff_dispatch::{BatchReport, Dispatcher, Routine};
use std::sync::Arc;
use tracing::info;

use crate::flags;

pub fn run_data_diff(flags: &flags::DataDiffJob, log_level: Option<String>) -> Result<BatchReport, JobError> {
    let config = super::setup(&ConfigOverrides {
        gcp_project: flags.gcp_project.clone(),
        gcp_pubsub: flags.gcp_pubsub.clone(),
        gcp_key_path: flags.gcp_key_path.clone(),
        api_url: flags.api_url.clone(),
        batch_size: flags.batch_size,
        log_level,
    })?;

    let project = config.gcp_project()?;
    let subscription = config.gcp_pubsub()?;
    let credentials = Credentials::load(config.key_path()?)?;

    info!(project, subscription, "Starting Pub/Sub data diff job");
    let source = PubSubSource::new(
        &config.pubsub_endpoint,
        project,
        subscription,
        credentials.access_token(),
        config.timeout(),
    )?;

    replay(source, &config, &credentials)
}

pub fn run_diff_file(flags: &flags::DiffFileJob, log_level: Option<String>) -> Result<BatchReport, JobError> {
    let config = super::setup(&ConfigOverrides {
        gcp_key_path: flags.gcp_key_path.clone(),
        api_url: flags.api_url.clone(),
        batch_size: flags.batch_size,
        log_level,
        ..Default::default()
    })?;

    let credentials = Credentials::load(config.key_path()?)?;

    info!(
        data_file = %flags.data_file.display(),
        diff_file = %flags.diff_file.display(),
        "Starting diff file job"
    );
    let source = DiffFileSource::open(&flags.data_file, &flags.diff_file)?;

    replay(source, &config, &credentials)
}

fn replay<S: MessageSource>(
    source: S,
    config: &JobConfig,
    credentials: &Credentials,
) -> Result<BatchReport, JobError> {
    let registry = Arc::new(Registry::dialect_map()?);
    let sink = ApiSink::new(config.api_url()?, credentials.api_token(), config.timeout())?;

    let mut routine = Routine::new(source, Dispatcher::new(registry, sink));
    Ok(routine.run(config.batch_size)?)
}
