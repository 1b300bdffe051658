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

use diff_dispatch::error::{JobError, SourceError};
use diff_dispatch::{BatchReport, Diagnostic, DiagnosticCode};
use std::process;

mod cmd;
mod flags;

fn main() {
    let flags = flags::DiffDispatch::from_env_or_exit();

    let diagnostics = run(flags);

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
    }

    let has_fatal = diagnostics.iter().any(|d| d.is_fatal());
    if has_fatal {
        process::exit(1);
    }
}

fn run(flags: flags::DiffDispatch) -> Vec<Diagnostic> {
    let log_level = flags.log_level;
    match flags.subcommand {
        flags::DiffDispatchCmd::DataDiffJob(job_flags) => {
            report(cmd::job::run_data_diff(&job_flags, log_level))
        }
        flags::DiffDispatchCmd::DiffFileJob(job_flags) => {
            report(cmd::job::run_diff_file(&job_flags, log_level))
        }
        flags::DiffDispatchCmd::DiffInfo(info_flags) => cmd::info::run(&info_flags),
    }
}

fn report(result: Result<BatchReport, JobError>) -> Vec<Diagnostic> {
    match result {
        Ok(report) => {
            println!(
                "Dispatched {} messages: {} created, {} archived, {} failed, {} skipped",
                report.messages, report.created, report.archived, report.failed, report.skipped
            );
            Vec::new()
        }
        Err(JobError::Source(SourceError::Parse(diagnostic))) => vec![diagnostic],
        Err(err) => vec![Diagnostic::fatal(DiagnosticCode::JobFailed, err.to_string())
            .with_advice(
                "Check the job settings (flags or DIALECT_MAP_* environment variables) \
                 and the logs above for the failing step."
                    .to_string(),
            )],
    }
}
