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

//! Project snapshot store (SPEC_FULL.md §4.6): the incremental/full chain,
//! keyed by a monotonic, contiguous `save_number`.
//!
//! Grounded on the teacher's own `backup.rs::Repo`, which already carries a
//! full/delta distinction (`determine_snapshot_kind`) and an index persisted
//! alongside the snapshots (`persist_meta`); this generalises that shape to
//! the richer record and baseline-map model required by the spec.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;
use walkdir::WalkDir;

use crate::changedetect::{relative_path, ChangeDetector};
use crate::config::StoreSettings;
use crate::copier::{self, ExcludeSet};
use crate::error::{Error, Result};
use crate::lock::{LockManager, SAVE_DATA_KEY};
use crate::meta::{
    ProjectSnapshot, ProjectSnapshotMeta, ProjectSnapshotSummary, ProjectStoreState, Restorability,
    SnapshotKind, FULL_SENTINEL,
};
use crate::planner::{self, DirectoryNonEmpty};

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn dir_size(path: &std::path::Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn humanize_since(now_ms: i64, timestamp_ms: i64) -> String {
    let delta_secs = ((now_ms - timestamp_ms) / 1000).max(0);
    if delta_secs < 60 {
        "just now".to_string()
    } else if delta_secs < 3600 {
        format!("{}m ago", delta_secs / 60)
    } else if delta_secs < 86400 {
        format!("{}h ago", delta_secs / 3600)
    } else {
        format!("{}d ago", delta_secs / 86400)
    }
}

/// Result of one `create_project_snapshot` call.
pub struct CreateOutcome {
    pub id: Uuid,
    pub save_number: u64,
    pub kind: SnapshotKind,
    pub changed_files: Vec<String>,
    /// Always `None` from this implementation; reserved for a future
    /// enrichment pass the same way `FileBaseline::line_count` is (SPEC_FULL
    /// §9, Open Question 3).
    pub analysis: Option<String>,
}

pub struct ProjectSnapshotStore {
    /// `.CodeRecoder/snapshots/projects`.
    root: PathBuf,
    project_root: PathBuf,
    lock: LockManager,
    state: parking_lot::Mutex<ProjectStoreState>,
    detector: ChangeDetector,
    exclude: ExcludeSet,
    auto_cleanup: bool,
}

impl ProjectSnapshotStore {
    /// `settings` is authoritative: `full_save_interval` and `retention_cap`
    /// are re-applied from it on every open, so editing `settings.json`
    /// takes effect on the next activation rather than only at first init.
    pub fn open(root: PathBuf, project_root: PathBuf, settings: &StoreSettings) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let index_path = root.join("index.json");
        let mut state = if index_path.is_file() {
            let bytes = fs::read(&index_path)?;
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| ProjectStoreState::new(project_root.display().to_string()))
        } else {
            ProjectStoreState::new(project_root.display().to_string())
        };
        state.full_save_interval = settings.full_save_interval;
        state.retention_cap = settings.retention_cap;

        let basenames: Vec<&str> = settings.exclude_basenames.iter().map(String::as_str).collect();
        let globs: Vec<&str> = settings.exclude_globs.iter().map(String::as_str).collect();
        let exclude = ExcludeSet::new(&basenames, &globs);

        Ok(Self {
            root,
            project_root,
            lock: LockManager::new(),
            state: parking_lot::Mutex::new(state),
            detector: ChangeDetector::new(exclude.clone(), crate::global::defaults::DEFAULT_RECENT_WINDOW),
            exclude,
            auto_cleanup: settings.auto_cleanup,
        })
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn persist_locked(&self) -> Result<()> {
        let state = self.state.lock();
        let bytes = serde_json::to_vec_pretty(&*state).map_err(std::io::Error::other)?;
        let tmp = self.index_path().with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.index_path())?;
        Ok(())
    }

    fn snapshot_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub fn create_project_snapshot(
        &self,
        prompt: String,
        name: Option<String>,
        tags: Vec<String>,
    ) -> Result<CreateOutcome> {
        self.lock.with_lock(SAVE_DATA_KEY, || -> Result<CreateOutcome> {
            let mut state = self.state.lock();

            let save_number = state.current_save_number + 1;

            let mut changed_files = self.detector.detect(&self.project_root, &mut state.file_baselines);
            state.last_scan_time = now_ms();

            let forced = changed_files.is_empty() && !state.snapshots.is_empty();
            if forced {
                changed_files = vec![FULL_SENTINEL.to_string()];
            }

            let is_interval_full = save_number.saturating_sub(state.last_full_save_number)
                >= state.full_save_interval;
            let is_first = state.snapshots.is_empty();
            // Open Question 1 (SPEC_FULL §9): a forced snapshot materialises
            // exactly as a full snapshot.
            let kind = if is_first || is_interval_full || forced {
                SnapshotKind::Full
            } else {
                SnapshotKind::Incremental
            };

            let id = Uuid::new_v4();
            let dest_dir = self.snapshot_dir(id);
            fs::create_dir_all(&dest_dir)?;

            let actual_file_count = match kind {
                SnapshotKind::Full => {
                    copier::copy_tree(&self.project_root, &dest_dir, &self.exclude)?
                }
                SnapshotKind::Incremental => {
                    let mut count = 0u64;
                    for relative in &changed_files {
                        let src = self.project_root.join(relative);
                        if !src.is_file() {
                            crate::warning!(
                                "change-detected file '{}' vanished before it could be snapshotted",
                                relative
                            );
                            continue;
                        }
                        let dst = dest_dir.join(relative);
                        copier::copy_file(&src, &dst)?;
                        count += 1;
                    }
                    count
                }
            };

            let effective_changed_files = if kind == SnapshotKind::Full {
                vec![FULL_SENTINEL.to_string()]
            } else {
                changed_files
            };

            let snapshot = ProjectSnapshot {
                id,
                timestamp: now_ms(),
                save_number,
                kind,
                changed_files: effective_changed_files.clone(),
                prompt,
                name,
                tags,
                analysis: None,
                metadata: ProjectSnapshotMeta {
                    project_root: self.project_root.display().to_string(),
                    actual_file_count,
                    branch: None,
                    commit: None,
                },
            };

            let meta_bytes = serde_json::to_vec_pretty(&snapshot).map_err(std::io::Error::other)?;
            fs::write(dest_dir.join("snapshot_metadata.json"), meta_bytes)?;

            state.current_save_number = save_number;
            if kind == SnapshotKind::Full {
                state.last_full_save_number = save_number;
            }
            state.snapshots.push(snapshot.clone());

            let retention_cap = state.retention_cap;
            drop(state);
            if self.auto_cleanup {
                self.apply_retention(retention_cap)?;
            }

            self.persist_locked()?;

            Ok(CreateOutcome {
                id,
                save_number,
                kind,
                changed_files: effective_changed_files,
                analysis: None,
            })
        })
    }

    /// Delete the oldest snapshots (by `save_number`, see SPEC_FULL §9 Open
    /// Question 2) until at most `retention_cap` remain. Each deletion is
    /// independently fault-tolerant: a failure is logged and the cleanup
    /// continues with the next snapshot (SPEC_FULL §7).
    fn apply_retention(&self, retention_cap: usize) -> Result<()> {
        if retention_cap == 0 {
            return Ok(());
        }
        let to_remove: Vec<Uuid> = {
            let mut state = self.state.lock();
            if state.snapshots.len() <= retention_cap {
                return Ok(());
            }
            state.snapshots.sort_by_key(|s| s.save_number);
            let excess = state.snapshots.len() - retention_cap;
            state.snapshots.drain(0..excess).map(|s| s.id).collect()
        };

        for id in to_remove {
            let dir = self.snapshot_dir(id);
            if dir.exists() {
                if let Err(e) = fs::remove_dir_all(&dir) {
                    crate::warning!("retention cleanup could not remove snapshot {id}: {e}");
                }
            }
        }
        Ok(())
    }

    /// List snapshots newest-first, each enriched with a restorability
    /// classifier, its on-disk footprint, and a humanised age (§10.5).
    pub fn list_project_snapshots(&self) -> Vec<ProjectSnapshotSummary> {
        let mut snapshots = {
            let state = self.state.lock();
            state.snapshots.clone()
        };
        snapshots.sort_by(|a, b| b.save_number.cmp(&a.save_number));

        let checker = self.directory_checker();
        let now = now_ms();

        snapshots
            .iter()
            .map(|s| {
                let restorability = if s.is_full() {
                    if checker.is_non_empty(s) {
                        Restorability::Direct
                    } else {
                        Restorability::Unavailable
                    }
                } else {
                    match planner::plan(&snapshots, s, &checker) {
                        Ok(_) => Restorability::ChainRequired,
                        Err(_) => Restorability::Unavailable,
                    }
                };

                ProjectSnapshotSummary {
                    snapshot: s.clone(),
                    restorability,
                    on_disk_bytes: dir_size(&self.snapshot_dir(s.id)),
                    time_since: humanize_since(now, s.timestamp),
                }
            })
            .collect()
    }

    fn directory_checker(&self) -> DiskDirectoryNonEmpty<'_> {
        DiskDirectoryNonEmpty { store: self }
    }

    pub fn restore_project_snapshot(&self, id: Uuid) -> Result<(u64, SnapshotKind)> {
        let (target, all_snapshots) = {
            let state = self.state.lock();
            let target = state
                .snapshots
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            (target, state.snapshots.clone())
        };

        let checker = self.directory_checker();
        let chain = planner::plan(&all_snapshots, &target, &checker)?;

        for snapshot in &chain {
            let snapshot_dir = self.snapshot_dir(snapshot.id);
            match snapshot.kind {
                SnapshotKind::Full => {
                    copier::copy_tree(&snapshot_dir, &self.project_root, &self.store_exclude())?;
                }
                SnapshotKind::Incremental => {
                    for relative in &snapshot.changed_files {
                        let src = snapshot_dir.join(relative);
                        if !src.is_file() {
                            crate::warning!(
                                "snapshot {} is missing changed file '{}', skipping",
                                snapshot.id,
                                relative
                            );
                            continue;
                        }
                        let dst = self.project_root.join(relative);
                        copier::copy_file(&src, &dst)?;
                    }
                }
            }
        }

        Ok((target.save_number, target.kind))
    }

    fn store_exclude(&self) -> ExcludeSet {
        ExcludeSet::new(&[crate::global::defaults::STORE_DIR_NAME], &[])
    }
}

struct DiskDirectoryNonEmpty<'a> {
    store: &'a ProjectSnapshotStore,
}

impl DirectoryNonEmpty for DiskDirectoryNonEmpty<'_> {
    fn is_non_empty(&self, snapshot: &ProjectSnapshot) -> bool {
        let dir = self.store.snapshot_dir(snapshot.id);
        match fs::read_dir(&dir) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }
}
