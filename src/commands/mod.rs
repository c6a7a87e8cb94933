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

//! CLI surface over the engine's RPC-shaped operations (SPEC_FULL.md §6,
//! §10.5). Deliberately out of the engine crate's public API surface; the
//! engine (`src/lib.rs`) never depends on anything under this module.

pub mod cmd_init;
pub mod cmd_file;
pub mod cmd_project;

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use clap::Args;

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project root to operate on.
    #[clap(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Increase diagnostics verbosity (-v, -vv).
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Render a snapshot's epoch-millisecond timestamp in the user's local
/// timezone, for `list` output.
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "unknown time".to_string(),
    }
}
