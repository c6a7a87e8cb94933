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

//! CodeRecoder: a per-project snapshot and restore engine for source trees
//! sitting behind an AI coding assistant. See `SPEC_FULL.md` for the full
//! component contracts this crate implements.

#[macro_use]
pub mod diagnostics;

pub mod changedetect;
pub mod config;
pub mod copier;
pub mod enrichment;
pub mod error;
pub mod filestore;
pub mod global;
pub mod hashing;
pub mod lock;
pub mod meta;
pub mod pathguard;
pub mod planner;
pub mod projectstore;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::config::ProjectConfig;
use crate::enrichment::{EnrichmentJob, EnrichmentWorker};
use crate::error::{Error, Result};
use crate::filestore::FileSnapshotStore;
use crate::meta::{FileSnapshot, ProjectSnapshotSummary};
use crate::projectstore::{CreateOutcome, ProjectSnapshotStore};

/// A bound handle over one project's `.CodeRecoder` store
/// (SPEC_FULL.md §4.9: `Uninitialised -> Bound -> Ready`).
pub struct ProjectStore {
    project_root: PathBuf,
    files: Arc<FileSnapshotStore>,
    projects: ProjectSnapshotStore,
    enrichment: EnrichmentWorker,
}

impl ProjectStore {
    /// Bind to `project_root`, creating `.CodeRecoder` as needed. Reads any
    /// existing index; a missing one starts fresh.
    pub fn activate(project_root: &Path, name: Option<String>) -> Result<Self> {
        if !project_root.is_dir() {
            return Err(Error::InvalidPath {
                path: project_root.to_path_buf(),
                reason: "project root does not exist or is not a directory".to_string(),
            });
        }
        let project_root = project_root
            .canonicalize()
            .map_err(|e| Error::InvalidPath {
                path: project_root.to_path_buf(),
                reason: format!("could not canonicalize project root: {e}"),
            })?;

        let store_dir = project_root.join(global::defaults::STORE_DIR_NAME);
        let config_dir = store_dir.join("config");
        std::fs::create_dir_all(&config_dir)?;

        if let Some(name) = name {
            if config::load_project_config(&config_dir)?.is_none() {
                config::save_project_config(&config_dir, &ProjectConfig { name, language: None })?;
            }
        }
        let settings = config::load_settings(&config_dir)?;

        let files = Arc::new(FileSnapshotStore::open(
            store_dir.join("snapshots").join("files"),
            project_root.clone(),
        )?);
        let projects = ProjectSnapshotStore::open(
            store_dir.join("snapshots").join("projects"),
            project_root.clone(),
            &settings,
        )?;
        let enrichment = EnrichmentWorker::spawn(files.clone());

        Ok(Self {
            project_root,
            files,
            projects,
            enrichment,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    // -- File snapshot operations (SPEC_FULL.md §4.5) --

    pub fn create_file_snapshot(
        &self,
        file_path: &Path,
        prompt: String,
        session_id: Option<Uuid>,
        metadata: Option<Value>,
    ) -> Result<FileSnapshot> {
        let previous_content = self
            .files
            .list_snapshots(None, Some(file_path), Some(1))
            .into_iter()
            .next()
            .and_then(|s| std::fs::read(&s.snapshot_path).ok());

        let snapshot = self
            .files
            .create_snapshot(file_path, prompt, session_id, None, metadata)?;

        if let Ok(new_content) = std::fs::read(file_path) {
            self.enrichment.enqueue(EnrichmentJob {
                snapshot_id: snapshot.id,
                previous_content,
                new_content,
            });
        }

        Ok(snapshot)
    }

    pub fn restore_file_snapshot(&self, snapshot_id: Uuid) -> Result<(PathBuf, Option<PathBuf>)> {
        self.files.restore_snapshot(snapshot_id)
    }

    pub fn list_file_snapshots(
        &self,
        session_id: Option<Uuid>,
        file_path: Option<&Path>,
        limit: Option<usize>,
    ) -> Vec<FileSnapshot> {
        self.files.list_snapshots(session_id, file_path, limit)
    }

    pub fn delete_file_snapshot(&self, snapshot_id: Uuid) -> Result<()> {
        self.files.delete_snapshot(snapshot_id)
    }

    // -- Project snapshot operations (SPEC_FULL.md §4.6, §4.7) --

    pub fn create_project_snapshot(
        &self,
        prompt: String,
        name: Option<String>,
        tags: Vec<String>,
    ) -> Result<CreateOutcome> {
        self.projects.create_project_snapshot(prompt, name, tags)
    }

    pub fn list_project_snapshots(&self) -> Vec<ProjectSnapshotSummary> {
        self.projects.list_project_snapshots()
    }

    pub fn restore_project_snapshot(
        &self,
        id: Uuid,
    ) -> Result<(u64, crate::meta::SnapshotKind)> {
        self.projects.restore_project_snapshot(id)
    }

    /// Deactivate the project. `save_history` is currently a no-op seam:
    /// every write already persists synchronously, so there is nothing
    /// left to flush, but the signature mirrors the RPC surface (§6).
    pub fn deactivate(self, _save_history: bool) {}
}
