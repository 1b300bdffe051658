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

use crate::flags;
use diff_dispatch::mapping::{FieldMapper, TypeMapper};
use diff_dispatch::{Diagnostic, DiagnosticCode, DiagnosticLevel, DiffEntry, DiffKind, DiffParser};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Default, Serialize)]
struct KindCounts {
    creation: usize,
    deletion: usize,
    edition: usize,
}

impl KindCounts {
    fn add(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Creation => self.creation += 1,
            DiffKind::Deletion => self.deletion += 1,
            DiffKind::Edition => self.edition += 1,
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    index: usize,
    #[serde(flatten)]
    entry: &'a DiffEntry,
    data_type: Option<&'static str>,
}

#[derive(Serialize)]
struct JsonInfoOutput<'a> {
    diff: String,
    counts: KindCounts,
    entries: Vec<JsonEntry<'a>>,
}

pub fn run(flags: &flags::DiffInfo) -> Vec<Diagnostic> {
    if !flags.file.exists() {
        return vec![Diagnostic::fatal(
            DiagnosticCode::PathNotFound,
            format!("I couldn't find the diff file: {}", flags.file.display()),
        )
        .with_advice(
            "Make sure the file path is correct and the file exists. \
                 Check for typos in the filename."
                .to_string(),
        )];
    }

    let kind_filter = match flags.kind.as_deref().map(|name| (name, DiffKind::parse(name))) {
        None => None,
        Some((_, Some(kind))) => Some(kind),
        Some((name, None)) => {
            return vec![Diagnostic::fatal(
                DiagnosticCode::InvalidArgument,
                format!("I don't know the entry kind '{}'.", name),
            )
            .with_advice("Use one of: creation, deletion, edition.".to_string())];
        }
    };

    let parser = match DiffParser::open(&flags.file) {
        Ok(parser) => parser,
        Err(e) => {
            return vec![Diagnostic::fatal(
                DiagnosticCode::ReadFailure,
                format!("I couldn't open the diff file: {}", e),
            )];
        }
    };

    let mut entries = Vec::new();
    for item in parser {
        match item {
            Ok(entry) => entries.push(entry),
            Err(diagnostic) => return vec![diagnostic],
        }
    }

    if entries.is_empty() {
        return vec![Diagnostic::new(
            DiagnosticLevel::Warning,
            DiagnosticCode::NoEntries,
            format!("I didn't find any diff blocks in {}.", flags.file.display()),
        )
        .with_advice(
            "Blocks start with a path line such as '@ [0,\"terms\",1]'. \
             Was the diff produced with jd?"
                .to_string(),
        )];
    }

    let mut counts = KindCounts::default();
    for entry in &entries {
        counts.add(entry.kind());
    }

    let mapper = FieldMapper::dialect_map();
    let shown: Vec<(usize, &DiffEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| kind_filter.map_or(true, |kind| entry.kind() == kind))
        .collect();

    let is_json_output = flags.output.as_deref() == Some("json");

    if is_json_output {
        let output = JsonInfoOutput {
            diff: flags.file.display().to_string(),
            counts,
            entries: shown
                .iter()
                .map(|(index, entry)| JsonEntry {
                    index: *index,
                    entry: *entry,
                    data_type: created_type(&mapper, entry),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Vec::new();
    }

    println!("Diff: {}", flags.file.display());
    println!(
        "{} entries: {} creations, {} deletions, {} editions",
        entries.len(),
        counts.creation,
        counts.deletion,
        counts.edition
    );
    println!();

    println!("  #  Kind       Path                                      Created type");
    println!("──────────────────────────────────────────────────────────────────────────");
    for (index, entry) in &shown {
        println!(
            "  {:2}  {:9}  {:40}  {}",
            index,
            entry.kind(),
            truncate(&entry.path().to_string(), 40),
            created_type(&mapper, entry).unwrap_or("-")
        );
    }

    Vec::new()
}

/// Type of the top-level record a creation adds, when it has a recognizable id.
fn created_type(mapper: &FieldMapper, entry: &DiffEntry) -> Option<&'static str> {
    match entry.value_post() {
        Some(Value::Object(record)) if entry.is_creation() => {
            mapper.infer_type(record).ok().map(|kind| kind.name())
        }
        _ => None,
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
