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

//! Data model shared by the file snapshot store and the project snapshot
//! store (SPEC_FULL.md §3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single content-addressed copy of one file, taken at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub id: Uuid,
    pub timestamp: i64,
    pub original_path: String,
    pub snapshot_path: String,
    pub file_size: u64,
    pub content_hash: String,
    pub prompt: String,
    pub session_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub change_analysis: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Groups related file snapshots under one name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSession {
    pub id: Uuid,
    pub name: String,
    pub created: i64,
    pub last_modified: i64,
    #[serde(default)]
    pub snapshot_ids: Vec<Uuid>,
    #[serde(default)]
    pub current_id: Option<Uuid>,
}

impl SnapshotSession {
    pub fn new(name: String, now: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created: now,
            last_modified: now,
            snapshot_ids: Vec::new(),
            current_id: None,
        }
    }
}

/// Whether a project snapshot is a whole-tree copy or a delta against the
/// preceding full snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Full,
    Incremental,
}

/// The sentinel used in `changed_files` for a full (or forced-full) snapshot.
pub const FULL_SENTINEL: &str = "*";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshotMeta {
    pub project_root: String,
    pub actual_file_count: u64,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
}

/// One entry in a project's save chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub id: Uuid,
    pub timestamp: i64,
    pub save_number: u64,
    pub kind: SnapshotKind,
    /// Relative paths changed since the previous save, or `["*"]` for full.
    pub changed_files: Vec<String>,
    pub prompt: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub analysis: Option<String>,
    pub metadata: ProjectSnapshotMeta,
}

impl ProjectSnapshot {
    pub fn is_full(&self) -> bool {
        self.kind == SnapshotKind::Full
    }
}

/// Whether restoring a given snapshot is a direct copy or requires walking
/// a chain back to a preceding full (SPEC_FULL.md §10.5 list classifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restorability {
    Direct,
    ChainRequired,
    Unavailable,
}

/// A `ProjectSnapshot` enriched with the cheap, display-oriented figures
/// `list_project_snapshots` reports (§10.5): restorability, on-disk size,
/// and a humanised age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshotSummary {
    pub snapshot: ProjectSnapshot,
    pub restorability: Restorability,
    pub on_disk_bytes: u64,
    pub time_since: String,
}

/// Cached fingerprint of one tracked file, used by the change detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBaseline {
    pub relative_path: String,
    pub mtime_ms: i64,
    pub size: u64,
    pub content_hash: String,
    /// Preserved for forward compatibility; never populated or consumed by
    /// this implementation (SPEC_FULL.md §9, Open Question 3).
    #[serde(default)]
    pub line_count: Option<u64>,
}

/// Persisted state of one project's snapshot store (`snapshots/projects/index.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStoreState {
    pub project_root: String,
    #[serde(default)]
    pub current_save_number: u64,
    #[serde(default)]
    pub last_full_save_number: u64,
    #[serde(default = "default_full_save_interval")]
    pub full_save_interval: u64,
    #[serde(default)]
    pub snapshots: Vec<ProjectSnapshot>,
    #[serde(default)]
    pub file_baselines: HashMap<String, FileBaseline>,
    #[serde(default)]
    pub last_scan_time: i64,
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,
}

fn default_full_save_interval() -> u64 {
    crate::global::defaults::DEFAULT_FULL_SAVE_INTERVAL
}

fn default_retention_cap() -> usize {
    crate::global::defaults::DEFAULT_RETENTION_CAP
}

impl ProjectStoreState {
    pub fn new(project_root: String) -> Self {
        Self {
            project_root,
            current_save_number: 0,
            last_full_save_number: 0,
            full_save_interval: crate::global::defaults::DEFAULT_FULL_SAVE_INTERVAL,
            snapshots: Vec::new(),
            file_baselines: HashMap::new(),
            last_scan_time: 0,
            retention_cap: crate::global::defaults::DEFAULT_RETENTION_CAP,
        }
    }
}
