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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use coderecoder::ProjectStore;
use colored::Colorize;
use uuid::Uuid;

use super::{format_timestamp_ms, GlobalArgs};

#[derive(Subcommand, Debug)]
pub enum FileCmd {
    /// Take a content-addressed snapshot of a single file.
    Snapshot {
        path: PathBuf,
        #[clap(long)]
        prompt: String,
        #[clap(long)]
        session: Option<Uuid>,
    },
    /// Restore a file snapshot over its original path.
    Restore { id: Uuid },
    /// List file snapshots, newest first.
    List {
        #[clap(long)]
        session: Option<Uuid>,
        #[clap(long)]
        path: Option<PathBuf>,
        #[clap(long)]
        limit: Option<usize>,
    },
    /// Delete a file snapshot.
    Delete { id: Uuid },
}

pub fn run(global_args: &GlobalArgs, cmd: &FileCmd) -> Result<()> {
    let store = ProjectStore::activate(&global_args.project, None)
        .with_context(|| "project is not activated")?;

    match cmd {
        FileCmd::Snapshot { path, prompt, session } => {
            let snapshot = store
                .create_file_snapshot(path, prompt.clone(), *session, None)
                .with_context(|| format!("could not snapshot '{}'", path.display()))?;
            coderecoder::log!(
                "created file snapshot {} ({} bytes)",
                snapshot.id,
                snapshot.file_size
            );
        }
        FileCmd::Restore { id } => {
            let (restored, backup) = store
                .restore_file_snapshot(*id)
                .with_context(|| format!("could not restore snapshot {id}"))?;
            coderecoder::log!("restored '{}'", restored.display());
            if let Some(backup) = backup {
                coderecoder::log!("previous content backed up to '{}'", backup.display());
            }
        }
        FileCmd::List { session, path, limit } => {
            let snapshots = store.list_file_snapshots(*session, path.as_deref(), *limit);
            if snapshots.is_empty() {
                coderecoder::log!("no file snapshots found");
            }
            for snapshot in snapshots {
                println!(
                    "{}  {}  {}  {}",
                    snapshot.id.to_string().cyan(),
                    format_timestamp_ms(snapshot.timestamp),
                    snapshot.original_path,
                    snapshot.prompt
                );
            }
        }
        FileCmd::Delete { id } => {
            store
                .delete_file_snapshot(*id)
                .with_context(|| format!("could not delete snapshot {id}"))?;
            coderecoder::log!("deleted file snapshot {id}");
        }
    }

    Ok(())
}
