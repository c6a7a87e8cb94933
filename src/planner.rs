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

//! Restore planner (SPEC_FULL.md §4.7): resolves a target project snapshot
//! into the ordered chain of snapshots that reconstruct it.
//!
//! Grounded on the teacher's own `backup.rs::get_delta_segment`, which walks
//! a snapshot list backwards to the closest preceding full snapshot; this
//! generalises that walk with the degraded-recovery fallback and the
//! "later full short-circuits the chain" rule required by the spec.

use crate::error::{Error, Result};
use crate::meta::ProjectSnapshot;

/// A predicate telling the planner whether a given snapshot's on-disk
/// directory is non-empty. Kept abstract so the planner has no filesystem
/// dependency of its own and is trivially unit-testable.
pub trait DirectoryNonEmpty {
    fn is_non_empty(&self, snapshot: &ProjectSnapshot) -> bool;
}

/// Resolve `target` into an ordered chain `[full, inc, inc, ..., target]`.
pub fn plan<'a>(
    all_snapshots: &'a [ProjectSnapshot],
    target: &'a ProjectSnapshot,
    directories: &impl DirectoryNonEmpty,
) -> Result<Vec<&'a ProjectSnapshot>> {
    if target.is_full() {
        if !directories.is_non_empty(target) {
            return Err(Error::Corrupt {
                id: target.id.to_string(),
                reason: "full snapshot directory is empty".to_string(),
            });
        }
        return Ok(vec![target]);
    }

    let mut sorted: Vec<&ProjectSnapshot> = all_snapshots.iter().collect();
    sorted.sort_by_key(|s| s.save_number);

    let base = find_base_full(&sorted, target, directories)
        .or_else(|| degraded_recovery(&sorted, directories))
        .ok_or(Error::NoBaseline)?;

    let mut chain = Vec::new();
    let mut current_base_save_number = base.save_number;
    chain.push(base);

    for snapshot in sorted.iter().filter(|s| s.save_number <= target.save_number) {
        if snapshot.save_number <= current_base_save_number {
            continue;
        }

        if snapshot.is_full() {
            if directories.is_non_empty(snapshot) {
                // A later full supersedes everything queued so far: it is a
                // cheaper, equally-valid base for the rest of the chain.
                chain.clear();
                chain.push(*snapshot);
                current_base_save_number = snapshot.save_number;
                continue;
            }
            continue;
        }

        if directories.is_non_empty(snapshot) {
            chain.push(*snapshot);
        }
        // Empty incrementals are skipped with a warning by the caller; the
        // planner itself stays silent (no logging dependency).
    }

    if chain.last().map(|s| s.id) != Some(target.id) {
        if !directories.is_non_empty(target) {
            return Err(Error::Corrupt {
                id: target.id.to_string(),
                reason: "target snapshot directory is empty".to_string(),
            });
        }
        chain.push(target);
    }

    Ok(chain)
}

fn find_base_full<'a>(
    sorted: &[&'a ProjectSnapshot],
    target: &ProjectSnapshot,
    directories: &impl DirectoryNonEmpty,
) -> Option<&'a ProjectSnapshot> {
    sorted
        .iter()
        .rev()
        .filter(|s| s.is_full() && s.save_number < target.save_number)
        .find(|s| directories.is_non_empty(s))
        .copied()
}

fn degraded_recovery<'a>(
    sorted: &[&'a ProjectSnapshot],
    directories: &impl DirectoryNonEmpty,
) -> Option<&'a ProjectSnapshot> {
    sorted
        .iter()
        .rev()
        .filter(|s| s.is_full())
        .find(|s| directories.is_non_empty(s))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ProjectSnapshotMeta, SnapshotKind};
    use std::collections::HashSet;
    use uuid::Uuid;

    struct AllNonEmpty;
    impl DirectoryNonEmpty for AllNonEmpty {
        fn is_non_empty(&self, _snapshot: &ProjectSnapshot) -> bool {
            true
        }
    }

    struct EmptyExcept(HashSet<u64>);
    impl DirectoryNonEmpty for EmptyExcept {
        fn is_non_empty(&self, snapshot: &ProjectSnapshot) -> bool {
            !self.0.contains(&snapshot.save_number)
        }
    }

    fn snap(save_number: u64, kind: SnapshotKind) -> ProjectSnapshot {
        ProjectSnapshot {
            id: Uuid::new_v4(),
            timestamp: save_number as i64,
            save_number,
            kind,
            changed_files: vec!["f.txt".to_string()],
            prompt: "t".to_string(),
            name: None,
            tags: vec![],
            analysis: None,
            metadata: ProjectSnapshotMeta {
                project_root: "/p".to_string(),
                actual_file_count: 1,
                branch: None,
                commit: None,
            },
        }
    }

    #[test]
    fn chain_restore_example_from_spec() {
        // full_save_interval = 3: full@1, inc@2, inc@3, full@4, inc@5, inc@6, inc@7
        let snapshots = vec![
            snap(1, SnapshotKind::Full),
            snap(2, SnapshotKind::Incremental),
            snap(3, SnapshotKind::Incremental),
            snap(4, SnapshotKind::Full),
            snap(5, SnapshotKind::Incremental),
            snap(6, SnapshotKind::Incremental),
            snap(7, SnapshotKind::Incremental),
        ];

        let target = snapshots.iter().find(|s| s.save_number == 6).unwrap();
        let chain = plan(&snapshots, target, &AllNonEmpty).unwrap();

        let numbers: Vec<u64> = chain.iter().map(|s| s.save_number).collect();
        assert_eq!(numbers, vec![4, 5, 6]);
        assert!(chain[0].is_full());
    }

    #[test]
    fn full_target_short_circuits() {
        let snapshots = vec![snap(1, SnapshotKind::Full), snap(2, SnapshotKind::Incremental)];
        let target = snapshots.iter().find(|s| s.save_number == 1).unwrap();
        let chain = plan(&snapshots, target, &AllNonEmpty).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].save_number, 1);
    }

    #[test]
    fn degraded_recovery_skips_empty_incremental_with_warning() {
        // save_number 5's directory is truncated/empty; restoring 6 should
        // still succeed by replanning around it.
        let snapshots = vec![
            snap(1, SnapshotKind::Full),
            snap(2, SnapshotKind::Incremental),
            snap(3, SnapshotKind::Incremental),
            snap(4, SnapshotKind::Full),
            snap(5, SnapshotKind::Incremental),
            snap(6, SnapshotKind::Incremental),
        ];
        let mut empty = HashSet::new();
        empty.insert(5);
        let directories = EmptyExcept(empty);

        let target = snapshots.iter().find(|s| s.save_number == 6).unwrap();
        let chain = plan(&snapshots, target, &directories).unwrap();

        let numbers: Vec<u64> = chain.iter().map(|s| s.save_number).collect();
        assert_eq!(numbers, vec![4, 6]);
    }

    #[test]
    fn corrupt_target_itself_is_rejected_not_silently_truncated() {
        // save_number 5's own directory is empty; plan(5) must fail rather
        // than silently return a chain that stops short of the target.
        let snapshots = vec![
            snap(1, SnapshotKind::Full),
            snap(2, SnapshotKind::Incremental),
            snap(3, SnapshotKind::Incremental),
            snap(4, SnapshotKind::Full),
            snap(5, SnapshotKind::Incremental),
        ];
        let mut empty = HashSet::new();
        empty.insert(5);
        let directories = EmptyExcept(empty);

        let target = snapshots.iter().find(|s| s.save_number == 5).unwrap();
        let err = plan(&snapshots, target, &directories).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Corrupt);
    }

    #[test]
    fn no_usable_full_is_no_baseline() {
        let snapshots = vec![snap(1, SnapshotKind::Full), snap(2, SnapshotKind::Incremental)];
        let mut empty = HashSet::new();
        empty.insert(1);
        let directories = EmptyExcept(empty);

        let target = snapshots.iter().find(|s| s.save_number == 2).unwrap();
        let err = plan(&snapshots, target, &directories).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NoBaseline);
    }
}
