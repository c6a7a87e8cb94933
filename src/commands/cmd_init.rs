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
use clap::Args;
use coderecoder::ProjectStore;

use super::GlobalArgs;

#[derive(Args, Debug)]
#[clap(about = "Activate a project, creating its .CodeRecoder store if needed")]
pub struct CmdArgs {
    /// Human-readable project name, recorded in project.json.
    #[clap(long)]
    pub name: Option<String>,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<()> {
    coderecoder::log!("Activating project at '{}'", global_args.project.display());

    let store = ProjectStore::activate(&global_args.project, args.name.clone())
        .with_context(|| format!("could not activate project at '{}'", global_args.project.display()))?;

    coderecoder::log!("Ready: {}", store.project_root().display());
    Ok(())
}
