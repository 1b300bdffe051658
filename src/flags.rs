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

use std::path::PathBuf;

xflags::xflags! {
    cmd diff-dispatch {
        /// Log level: DEBUG, INFO, WARNING, ERROR or CRITICAL (env: DIALECT_MAP_LOG_LEVEL)
        optional --log-level log_level: String

        /// Replay data-diff messages from a Pub/Sub subscription against the API.
        /// Stops when no more messages are read.
        cmd data-diff-job {
            /// GCP project name (env: DIALECT_MAP_GCP_PROJECT)
            optional --gcp-project gcp_project: String

            /// Pub/Sub subscription name (env: DIALECT_MAP_GCP_PUBSUB)
            optional --gcp-pubsub gcp_pubsub: String

            /// Credentials file with the bearer tokens (env: DIALECT_MAP_GCP_KEY_PATH)
            optional --gcp-key-path gcp_key_path: PathBuf

            /// Private API base URL (env: DIALECT_MAP_API_URL)
            optional --api-url api_url: String

            /// Messages pulled per batch (env: DIALECT_MAP_BATCH_SIZE)
            optional --batch-size batch_size: usize
        }

        /// Replay a local diff file against the API.
        cmd diff-file-job {
            /// Data file after the change (its name selects the type mapper)
            required data_file: PathBuf

            /// jd diff between the previous and current data file
            required diff_file: PathBuf

            /// Private API base URL (env: DIALECT_MAP_API_URL)
            optional --api-url api_url: String

            /// Credentials file with the bearer tokens (env: DIALECT_MAP_GCP_KEY_PATH)
            optional --gcp-key-path gcp_key_path: PathBuf

            /// Entries dispatched per batch (env: DIALECT_MAP_BATCH_SIZE)
            optional --batch-size batch_size: usize
        }

        /// Show the entries of a jd diff file.
        cmd diff-info {
            /// Diff file to inspect
            required file: PathBuf

            /// Output format: human-readable (default) or json
            optional --output output: String

            /// Only show entries of one kind: creation, deletion or edition
            optional --kind kind: String
        }
    }
}
