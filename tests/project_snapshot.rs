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

use coderecoder::meta::SnapshotKind;
use coderecoder::ProjectStore;
use tempfile::tempdir;

#[test]
fn create_modify_snapshot_restore_round_trip() {
    let project = tempdir().unwrap();
    std::fs::write(project.path().join("main.rs"), b"fn main() {}\n").unwrap();

    let store = ProjectStore::activate(project.path(), Some("demo".to_string())).unwrap();

    let first = store
        .create_project_snapshot("initial commit".to_string(), None, vec![])
        .unwrap();
    assert_eq!(first.save_number, 1);
    assert_eq!(first.kind, SnapshotKind::Full);

    std::fs::write(
        project.path().join("main.rs"),
        b"fn main() { println!(\"hi\"); }\n",
    )
    .unwrap();

    let second = store
        .create_project_snapshot("add greeting".to_string(), None, vec![])
        .unwrap();
    assert_eq!(second.save_number, 2);
    assert_eq!(second.kind, SnapshotKind::Incremental);

    store.restore_project_snapshot(first.id).unwrap();
    let restored = std::fs::read_to_string(project.path().join("main.rs")).unwrap();
    assert_eq!(restored, "fn main() {}\n");
}

#[test]
fn deactivate_and_reactivate_preserves_history() {
    let project = tempdir().unwrap();
    std::fs::write(project.path().join("a.txt"), b"v1").unwrap();

    {
        let store = ProjectStore::activate(project.path(), None).unwrap();
        store
            .create_project_snapshot("v1".to_string(), None, vec![])
            .unwrap();
        store.deactivate(true);
    }

    let store = ProjectStore::activate(project.path(), None).unwrap();
    let snapshots = store.list_project_snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].snapshot.save_number, 1);
}

#[test]
fn store_directory_is_excluded_from_its_own_snapshots() {
    let project = tempdir().unwrap();
    std::fs::write(project.path().join("a.txt"), b"v1").unwrap();

    let store = ProjectStore::activate(project.path(), None).unwrap();
    store
        .create_project_snapshot("v1".to_string(), None, vec![])
        .unwrap();

    let snapshot_dirs: Vec<_> = std::fs::read_dir(
        project
            .path()
            .join(".CodeRecoder")
            .join("snapshots")
            .join("projects"),
    )
    .unwrap()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
    .collect();

    assert_eq!(snapshot_dirs.len(), 1);
    let full_snapshot_dir = snapshot_dirs[0].path();
    assert!(!full_snapshot_dir.join(".CodeRecoder").exists());
}
