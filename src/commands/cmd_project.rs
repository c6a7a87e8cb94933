// CodeRecoder is a per-project snapshot and restore engine.
// Copyright (C) 2025  CodeRecoder contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use clap::Subcommand;
use coderecoder::meta::{Restorability, SnapshotKind};
use coderecoder::ProjectStore;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use super::{format_timestamp_ms, GlobalArgs};

#[derive(Subcommand, Debug)]
pub enum ProjectCmd {
    /// Take a whole-project snapshot (full or incremental, decided automatically).
    Snapshot {
        #[clap(long)]
        prompt: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List project snapshots, newest save_number first.
    List,
    /// Restore the project to the state captured by a given snapshot.
    Restore { id: Uuid },
}

pub fn run(global_args: &GlobalArgs, cmd: &ProjectCmd) -> Result<()> {
    let store = ProjectStore::activate(&global_args.project, None)
        .with_context(|| "project is not activated")?;

    match cmd {
        ProjectCmd::Snapshot { prompt, name, tags } => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .expect("snapshot spinner template is valid"),
            );
            spinner.set_message("scanning for changes...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(80));

            let outcome = store
                .create_project_snapshot(prompt.clone(), name.clone(), tags.clone())
                .with_context(|| "could not create project snapshot")?;

            spinner.finish_and_clear();
            coderecoder::log!(
                "save #{} ({:?}): {} file(s) touched",
                outcome.save_number,
                outcome.kind,
                outcome.changed_files.len()
            );
        }
        ProjectCmd::List => {
            let snapshots = store.list_project_snapshots();
            if snapshots.is_empty() {
                coderecoder::log!("no project snapshots yet");
            }
            for summary in snapshots {
                let snapshot = &summary.snapshot;
                let kind_label = match snapshot.kind {
                    SnapshotKind::Full => "full".green(),
                    SnapshotKind::Incremental => "incremental".yellow(),
                };
                let restorability_label = match summary.restorability {
                    Restorability::Direct => "direct".green(),
                    Restorability::ChainRequired => "chain".yellow(),
                    Restorability::Unavailable => "unavailable".red(),
                };
                println!(
                    "#{:<4} {}  {}  {}  {}  {} ({} bytes, {})",
                    snapshot.save_number,
                    kind_label,
                    format_timestamp_ms(snapshot.timestamp),
                    snapshot.id,
                    snapshot.prompt,
                    restorability_label,
                    summary.on_disk_bytes,
                    summary.time_since
                );
            }
        }
        ProjectCmd::Restore { id } => {
            let (save_number, kind) = store
                .restore_project_snapshot(*id)
                .with_context(|| format!("could not restore project snapshot {id}"))?;
            coderecoder::log!("restored save #{save_number} ({kind:?})");
        }
    }

    Ok(())
}
