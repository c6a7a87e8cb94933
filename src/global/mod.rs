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

pub mod defaults;

use std::sync::OnceLock;

/// Process-wide diagnostics verbosity, set once by the CLI entry point.
static VERBOSITY: OnceLock<u32> = OnceLock::new();

pub fn set_verbosity(level: u32) {
    let _ = VERBOSITY.set(level);
}

pub fn verbosity() -> u32 {
    *VERBOSITY.get().unwrap_or(&defaults::DEFAULT_VERBOSITY)
}
