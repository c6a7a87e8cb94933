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

//! Prioritised change detection (SPEC_FULL.md §4.3).
//!
//! Four fallback layers, tried in order; the first layer to produce a
//! non-empty result wins. An empty baseline short-circuits all of this:
//! the caller is told to snapshot everything.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::copier::ExcludeSet;
use crate::hashing;
use crate::meta::FileBaseline;

pub struct ChangeDetector {
    exclude: ExcludeSet,
    recent_window: Duration,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self {
            exclude: ExcludeSet::default_set(),
            recent_window: crate::global::defaults::DEFAULT_RECENT_WINDOW,
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl ChangeDetector {
    pub fn new(exclude: ExcludeSet, recent_window: Duration) -> Self {
        Self {
            exclude,
            recent_window,
        }
    }

    /// Returns the set of relative paths considered changed, and updates
    /// `baselines` in place for every path it inspects and confirms.
    pub fn detect(
        &self,
        project_root: &Path,
        baselines: &mut HashMap<String, FileBaseline>,
    ) -> Vec<String> {
        if baselines.is_empty() {
            return self.snapshot_everything(project_root, baselines);
        }

        let vcs = self.vcs_status(project_root);
        if !vcs.is_empty() {
            return vcs;
        }

        let hashed = self.hash_comparison(project_root, baselines);
        if !hashed.is_empty() {
            return hashed;
        }

        let stat = self.stat_comparison(project_root, baselines);
        if !stat.is_empty() {
            return stat;
        }

        self.recency_fallback(project_root)
    }

    fn snapshot_everything(
        &self,
        project_root: &Path,
        baselines: &mut HashMap<String, FileBaseline>,
    ) -> Vec<String> {
        let mut changed = Vec::new();
        for entry in WalkDir::new(project_root)
            .into_iter()
            .filter_entry(|e| !self.exclude.excludes(e.path()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = relative_path(project_root, entry.path());
            if let Ok((size, hash)) = hashing::hash_file(entry.path()) {
                let (_, mtime_ms) = hashing::fingerprint(entry.path()).unwrap_or((size, now_ms()));
                baselines.insert(
                    relative.clone(),
                    FileBaseline {
                        relative_path: relative.clone(),
                        mtime_ms,
                        size,
                        content_hash: hash,
                        line_count: None,
                    },
                );
                changed.push(relative);
            }
        }
        changed
    }

    /// Layer 1: ask the VCS for its status-porcelain output. Absent tool or
    /// non-zero exit is treated as "nothing to report here", not an error.
    fn vcs_status(&self, project_root: &Path) -> Vec<String> {
        let output = Command::new("git")
            .arg("status")
            .arg("--porcelain")
            .current_dir(project_root)
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            _ => return Vec::new(),
        };

        let text = String::from_utf8_lossy(&output.stdout);
        text.lines()
            .filter_map(|line| {
                if line.len() < 4 {
                    return None;
                }
                let path = line[3..].trim();
                if path.starts_with(crate::global::defaults::STORE_DIR_NAME) {
                    return None;
                }
                Some(path.to_string())
            })
            .collect()
    }

    /// Layer 2: re-hash every baselined file and compare against the
    /// recorded content hash.
    fn hash_comparison(
        &self,
        project_root: &Path,
        baselines: &mut HashMap<String, FileBaseline>,
    ) -> Vec<String> {
        let mut changed = Vec::new();
        let keys: Vec<String> = baselines.keys().cloned().collect();
        for relative in keys {
            let full_path = project_root.join(&relative);
            if !full_path.is_file() {
                continue;
            }
            if let Ok((size, hash)) = hashing::hash_file(&full_path) {
                let baseline = baselines.get(&relative).unwrap();
                if baseline.content_hash != hash {
                    let (_, mtime_ms) = hashing::fingerprint(&full_path).unwrap_or((size, now_ms()));
                    baselines.insert(
                        relative.clone(),
                        FileBaseline {
                            relative_path: relative.clone(),
                            mtime_ms,
                            size,
                            content_hash: hash,
                            line_count: None,
                        },
                    );
                    changed.push(relative);
                }
            }
        }
        changed
    }

    /// Layer 3: walk the tree and compare (size, mtime) stat pairs against
    /// the baseline, catching new files and cheap-to-detect edits.
    fn stat_comparison(
        &self,
        project_root: &Path,
        baselines: &mut HashMap<String, FileBaseline>,
    ) -> Vec<String> {
        let mut changed = Vec::new();
        for entry in WalkDir::new(project_root)
            .into_iter()
            .filter_entry(|e| !self.exclude.excludes(e.path()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = relative_path(project_root, entry.path());
            let (size, mtime_ms) = match hashing::fingerprint(entry.path()) {
                Ok(v) => v,
                Err(_) => continue,
            };

            let needs_update = match baselines.get(&relative) {
                None => true,
                Some(baseline) => baseline.size != size || baseline.mtime_ms != mtime_ms,
            };

            if needs_update {
                if let Ok((_, hash)) = hashing::hash_file(entry.path()) {
                    baselines.insert(
                        relative.clone(),
                        FileBaseline {
                            relative_path: relative.clone(),
                            mtime_ms,
                            size,
                            content_hash: hash,
                            line_count: None,
                        },
                    );
                    changed.push(relative);
                }
            }
        }
        changed
    }

    /// Layer 4: last resort. Anything touched within the recency window is
    /// reported, regardless of baseline state.
    fn recency_fallback(&self, project_root: &Path) -> Vec<String> {
        let cutoff = now_ms() - self.recent_window.as_millis() as i64;
        let mut changed = Vec::new();
        for entry in WalkDir::new(project_root)
            .into_iter()
            .filter_entry(|e| !self.exclude.excludes(e.path()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok((_, mtime_ms)) = hashing::fingerprint(entry.path()) {
                if mtime_ms >= cutoff {
                    changed.push(relative_path(project_root, entry.path()));
                }
            }
        }
        changed
    }
}

pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_baseline_snapshots_everything() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();

        let detector = ChangeDetector::default();
        let mut baselines = HashMap::new();
        let changed = detector.detect(dir.path(), &mut baselines);

        assert_eq!(changed, vec!["a.txt".to_string()]);
        assert!(baselines.contains_key("a.txt"));
    }

    #[test]
    fn stat_layer_detects_size_change_without_vcs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"hello").unwrap();

        let detector = ChangeDetector::default();
        let mut baselines = HashMap::new();
        detector.detect(dir.path(), &mut baselines);

        std::fs::write(&file, b"hello world, much longer now").unwrap();
        let changed = detector.detect(dir.path(), &mut baselines);

        assert_eq!(changed, vec!["a.txt".to_string()]);
    }

    #[test]
    fn no_changes_yields_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();

        let detector = ChangeDetector::default();
        let mut baselines = HashMap::new();
        detector.detect(dir.path(), &mut baselines);

        let changed = detector.detect(dir.path(), &mut baselines);
        assert!(changed.is_empty());
    }
}
