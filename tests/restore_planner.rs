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

use coderecoder::config::{self, StoreSettings};
use coderecoder::meta::SnapshotKind;
use coderecoder::ProjectStore;
use tempfile::tempdir;

/// `settings.json`'s `full_save_interval` should actually govern when the
/// project store forces a full snapshot, end to end through the public API.
#[test]
fn settings_json_full_save_interval_governs_full_snapshot_cadence() {
    let project = tempdir().unwrap();
    let file = project.path().join("a.txt");
    std::fs::write(&file, b"0").unwrap();

    let config_dir = project.path().join(".CodeRecoder").join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    let settings = StoreSettings {
        full_save_interval: 2,
        ..StoreSettings::default()
    };
    config::save_settings(&config_dir, &settings).unwrap();

    let store = ProjectStore::activate(project.path(), None).unwrap();

    let mut kinds = Vec::new();
    for i in 1..=4 {
        std::fs::write(&file, i.to_string()).unwrap();
        let outcome = store
            .create_project_snapshot(format!("save {i}"), None, vec![])
            .unwrap();
        kinds.push(outcome.kind);
    }

    assert_eq!(
        kinds,
        vec![
            SnapshotKind::Full,
            SnapshotKind::Incremental,
            SnapshotKind::Full,
            SnapshotKind::Incremental,
        ]
    );
}

/// A chain spanning two full snapshots restores correctly through the whole
/// public `ProjectStore` surface, not just the planner's internal unit tests.
#[test]
fn multi_full_chain_restores_correct_content_through_public_api() {
    let project = tempdir().unwrap();
    let file = project.path().join("a.txt");

    let config_dir = project.path().join(".CodeRecoder").join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    let settings = StoreSettings {
        full_save_interval: 3,
        ..StoreSettings::default()
    };
    config::save_settings(&config_dir, &settings).unwrap();

    let store = ProjectStore::activate(project.path(), None).unwrap();

    let mut ids = Vec::new();
    for i in 1..=7 {
        std::fs::write(&file, i.to_string()).unwrap();
        let outcome = store
            .create_project_snapshot(format!("save {i}"), None, vec![])
            .unwrap();
        ids.push(outcome.id);
    }

    store.restore_project_snapshot(ids[1]).unwrap(); // save 2, incremental off full@1
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "2");

    store.restore_project_snapshot(ids[4]).unwrap(); // save 5, incremental off full@4
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "5");
}
