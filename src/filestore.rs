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

//! File snapshot store (SPEC_FULL.md §4.5): one content copy per snapshot,
//! grouped into sessions, with backup-before-overwrite restore.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::hashing;
use crate::lock::{LockManager, SAVE_DATA_KEY};
use crate::meta::{FileSnapshot, SnapshotSession};
use crate::pathguard;

/// File-snapshot-store index, persisted as `snapshots/files/index.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileStoreIndex {
    #[serde(default)]
    sessions: HashMap<Uuid, SnapshotSession>,
    #[serde(default)]
    snapshots: HashMap<Uuid, FileSnapshot>,
    #[serde(default)]
    current_session: Option<Uuid>,
}

/// On-disk `metadata.json` sibling of each stored file (SPEC_FULL.md §6).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadataDoc {
    original_path: String,
    snapshot_path: String,
    timestamp: i64,
    file_size: u64,
    file_hash: String,
    prompt: String,
    #[serde(default)]
    ai_summary: Option<String>,
    #[serde(default)]
    change_analysis: Option<String>,
    session_id: Uuid,
    #[serde(default)]
    parent_snapshot_id: Option<Uuid>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl From<&FileSnapshot> for FileMetadataDoc {
    fn from(s: &FileSnapshot) -> Self {
        Self {
            original_path: s.original_path.clone(),
            snapshot_path: s.snapshot_path.clone(),
            timestamp: s.timestamp,
            file_size: s.file_size,
            file_hash: s.content_hash.clone(),
            prompt: s.prompt.clone(),
            ai_summary: s.ai_summary.clone(),
            change_analysis: s.change_analysis.clone(),
            session_id: s.session_id,
            parent_snapshot_id: s.parent_id,
            metadata: s.metadata.clone(),
        }
    }
}

pub struct FileSnapshotStore {
    root: PathBuf,
    project_root: PathBuf,
    lock: LockManager,
    index: parking_lot::Mutex<FileStoreIndex>,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl FileSnapshotStore {
    /// `root` is `.CodeRecoder/snapshots/files`.
    pub fn open(root: PathBuf, project_root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let index_path = root.join("index.json");
        let index = if index_path.is_file() {
            let bytes = fs::read(&index_path)?;
            serde_json::from_slice(&bytes).unwrap_or_default()
        } else {
            FileStoreIndex::default()
        };

        Ok(Self {
            root,
            project_root,
            lock: LockManager::new(),
            index: parking_lot::Mutex::new(index),
        })
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn persist_locked(&self) -> Result<()> {
        let index = self.index.lock();
        let bytes = serde_json::to_vec_pretty(&*index).map_err(std::io::Error::other)?;
        let tmp = self.index_path().with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.index_path())?;
        Ok(())
    }

    fn session_dir(&self, session_id: Uuid, snapshot_id: Uuid) -> PathBuf {
        self.root
            .join(session_id.to_string())
            .join(snapshot_id.to_string())
    }

    pub fn create_snapshot(
        &self,
        file_path: &Path,
        prompt: String,
        session_id: Option<Uuid>,
        parent_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> Result<FileSnapshot> {
        pathguard::validate(file_path, Some(&self.project_root))?;
        if !file_path.is_file() {
            return Err(Error::NotFound(file_path.display().to_string()));
        }

        let (file_size, content_hash) = hashing::hash_file(file_path)?;
        let basename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        self.lock.with_lock(SAVE_DATA_KEY, || -> Result<FileSnapshot> {
            let mut index = self.index.lock();

            let session_id = match session_id {
                Some(id) if index.sessions.contains_key(&id) => id,
                _ => {
                    let session = SnapshotSession::new("default".to_string(), now_ms());
                    let id = session.id;
                    index.sessions.insert(id, session);
                    id
                }
            };

            let snapshot_id = Uuid::new_v4();
            drop(index);
            let dest_dir = self.session_dir(session_id, snapshot_id);
            fs::create_dir_all(&dest_dir)?;
            let snapshot_path = dest_dir.join(&basename);
            fs::copy(file_path, &snapshot_path)?;

            let snapshot = FileSnapshot {
                id: snapshot_id,
                timestamp: now_ms(),
                original_path: file_path.display().to_string(),
                snapshot_path: snapshot_path.display().to_string(),
                file_size,
                content_hash,
                prompt,
                session_id,
                parent_id,
                ai_summary: None,
                change_analysis: None,
                metadata,
            };

            let doc = FileMetadataDoc::from(&snapshot);
            let doc_bytes = serde_json::to_vec_pretty(&doc).map_err(std::io::Error::other)?;
            fs::write(dest_dir.join("metadata.json"), doc_bytes)?;

            let mut index = self.index.lock();
            index.snapshots.insert(snapshot_id, snapshot.clone());
            if let Some(session) = index.sessions.get_mut(&session_id) {
                session.snapshot_ids.push(snapshot_id);
                session.last_modified = snapshot.timestamp;
                session.current_id = Some(snapshot_id);
            }
            index.current_session = Some(session_id);
            drop(index);

            self.persist_locked()?;
            Ok(snapshot)
        })
    }

    pub fn restore_snapshot(&self, snapshot_id: Uuid) -> Result<(PathBuf, Option<PathBuf>)> {
        let snapshot = {
            let index = self.index.lock();
            index
                .snapshots
                .get(&snapshot_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(snapshot_id.to_string()))?
        };

        let snapshot_path = PathBuf::from(&snapshot.snapshot_path);
        let stored_size = fs::metadata(&snapshot_path)
            .map_err(|e| Error::Corrupt {
                id: snapshot_id.to_string(),
                reason: format!("stored copy unreadable: {e}"),
            })?
            .len();
        if stored_size != snapshot.file_size {
            return Err(Error::Corrupt {
                id: snapshot_id.to_string(),
                reason: "stored file size does not match recorded size".to_string(),
            });
        }

        let destination = PathBuf::from(&snapshot.original_path);
        pathguard::validate(&destination, Some(&self.project_root))?;

        let backup_path = if destination.exists() {
            let backup = PathBuf::from(format!(
                "{}.backup.{}",
                destination.display(),
                now_ms()
            ));
            fs::copy(&destination, &backup)?;
            Some(backup)
        } else {
            None
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&snapshot_path, &destination)?;

        {
            let mut index = self.index.lock();
            if let Some(session) = index.sessions.get_mut(&snapshot.session_id) {
                session.current_id = Some(snapshot_id);
            }
        }
        self.lock.with_lock(SAVE_DATA_KEY, || self.persist_locked())?;

        Ok((destination, backup_path))
    }

    pub fn list_snapshots(
        &self,
        session_id: Option<Uuid>,
        file_path: Option<&Path>,
        limit: Option<usize>,
    ) -> Vec<FileSnapshot> {
        let index = self.index.lock();
        let mut snapshots: Vec<FileSnapshot> = index
            .snapshots
            .values()
            .filter(|s| match session_id {
                Some(sid) => s.session_id == sid,
                None => true,
            })
            .filter(|s| match file_path {
                Some(p) => s.original_path == p.display().to_string(),
                None => true,
            })
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            snapshots.truncate(limit);
        }
        snapshots
    }

    pub fn delete_snapshot(&self, snapshot_id: Uuid) -> Result<()> {
        self.lock.with_lock(SAVE_DATA_KEY, || -> Result<()> {
            let mut index = self.index.lock();
            let snapshot = index
                .snapshots
                .remove(&snapshot_id)
                .ok_or_else(|| Error::NotFound(snapshot_id.to_string()))?;

            if let Some(session) = index.sessions.get_mut(&snapshot.session_id) {
                session.snapshot_ids.retain(|id| *id != snapshot_id);
                if session.current_id == Some(snapshot_id) {
                    session.current_id = session.snapshot_ids.last().copied();
                }
            }
            drop(index);

            let dir = self.session_dir(snapshot.session_id, snapshot_id);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }

            self.persist_locked()
        })
    }

    /// Update only the enrichment fields of an existing snapshot; serialised
    /// through the same write lock as every other mutation (SPEC_FULL §4.5).
    /// Failures here are expected to be logged and swallowed by the caller.
    pub fn apply_enrichment(
        &self,
        snapshot_id: Uuid,
        ai_summary: String,
        change_analysis: Option<String>,
    ) -> Result<()> {
        self.lock.with_lock(SAVE_DATA_KEY, || -> Result<()> {
            let dest_dir;
            {
                let mut index = self.index.lock();
                let snapshot = index
                    .snapshots
                    .get_mut(&snapshot_id)
                    .ok_or_else(|| Error::NotFound(snapshot_id.to_string()))?;
                snapshot.ai_summary = Some(ai_summary);
                snapshot.change_analysis = change_analysis;
                dest_dir = self.session_dir(snapshot.session_id, snapshot_id);
                let doc = FileMetadataDoc::from(&*snapshot);
                let bytes = serde_json::to_vec_pretty(&doc).map_err(std::io::Error::other)?;
                fs::write(dest_dir.join("metadata.json"), bytes)?;
            }
            self.persist_locked()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(project: &Path) -> FileSnapshotStore {
        let root = project.join(".CodeRecoder").join("snapshots").join("files");
        FileSnapshotStore::open(root, project.to_path_buf()).unwrap()
    }

    #[test]
    fn create_and_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"version 1").unwrap();

        let store = store(dir.path());
        let snapshot = store
            .create_snapshot(&file, "initial".to_string(), None, None, None)
            .unwrap();

        std::fs::write(&file, b"version 2, much longer").unwrap();
        let (restored, backup) = store.restore_snapshot(snapshot.id).unwrap();

        assert_eq!(std::fs::read(&restored).unwrap(), b"version 1");
        let backup = backup.expect("previous content should have been backed up");
        assert_eq!(std::fs::read(&backup).unwrap(), b"version 2, much longer");
    }

    #[test]
    fn restore_detects_truncated_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"version 1").unwrap();

        let store = store(dir.path());
        let snapshot = store
            .create_snapshot(&file, "initial".to_string(), None, None, None)
            .unwrap();

        std::fs::write(&snapshot.snapshot_path, b"short").unwrap();

        let err = store.restore_snapshot(snapshot.id).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Corrupt);
    }

    #[test]
    fn list_is_newest_first_and_filterable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"v1").unwrap();

        let store = store(dir.path());
        let s1 = store
            .create_snapshot(&file, "one".to_string(), None, None, None)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        std::fs::write(&file, b"v2").unwrap();
        let s2 = store
            .create_snapshot(&file, "two".to_string(), None, None, None)
            .unwrap();

        let all = store.list_snapshots(None, None, None);
        assert_eq!(all[0].id, s2.id);
        assert_eq!(all[1].id, s1.id);
    }

    #[test]
    fn delete_removes_snapshot_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"v1").unwrap();

        let store = store(dir.path());
        let snapshot = store
            .create_snapshot(&file, "one".to_string(), None, None, None)
            .unwrap();
        let snapshot_dir = PathBuf::from(&snapshot.snapshot_path)
            .parent()
            .unwrap()
            .to_path_buf();

        store.delete_snapshot(snapshot.id).unwrap();

        assert!(!snapshot_dir.exists());
        assert!(store.list_snapshots(None, None, None).is_empty());
    }

    #[test]
    fn rejects_source_outside_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let file = outside.path().join("a.txt");
        std::fs::write(&file, b"v1").unwrap();

        let store = store(dir.path());
        let err = store
            .create_snapshot(&file, "one".to_string(), None, None, None)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidPath);
    }
}
