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

use std::time::Duration;

/// Project snapshots: how many saves between two `full` snapshots.
pub const DEFAULT_FULL_SAVE_INTERVAL: u64 = 10;

/// Maximum number of project snapshots kept before the oldest are reaped.
pub const DEFAULT_RETENTION_CAP: usize = 100;

/// Recency-fallback window for the change detector's last resort layer.
pub const DEFAULT_RECENT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Basenames excluded from every scan, copy and change-detection walk.
pub const DEFAULT_EXCLUDE_BASENAMES: &[&str] = &[
    ".git",
    "node_modules",
    ".CodeRecoder",
    "__pycache__",
    ".DS_Store",
    "dist",
    "build",
    ".vscode",
    ".idea",
];

/// Glob patterns excluded from every scan, copy and change-detection walk.
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &["*.pyc", "*.log"];

pub(crate) const DEFAULT_VERBOSITY: u32 = 1;

/// Name of the store directory living at the root of every activated project.
pub const STORE_DIR_NAME: &str = ".CodeRecoder";
