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

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::cmd_file::FileCmd;
use commands::cmd_project::ProjectCmd;
use commands::{cmd_file, cmd_init, cmd_project, GlobalArgs};

#[derive(Parser, Debug)]
#[clap(name = "coderecoder", about = "Per-project snapshot and restore engine")]
struct Cli {
    #[clap(flatten)]
    global: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activate a project, creating its .CodeRecoder store if needed.
    Activate(cmd_init::CmdArgs),
    /// File-level snapshot operations.
    #[clap(subcommand)]
    File(FileCmd),
    /// Project-level snapshot operations.
    #[clap(subcommand)]
    Project(ProjectCmd),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    coderecoder::global::set_verbosity(1 + cli.global.verbose as u32);

    match &cli.command {
        Command::Activate(args) => cmd_init::run(&cli.global, args),
        Command::File(cmd) => cmd_file::run(&cli.global, cmd),
        Command::Project(cmd) => cmd_project::run(&cli.global, cmd),
    }
}
