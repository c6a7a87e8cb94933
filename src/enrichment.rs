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

//! Best-effort background enrichment worker (SPEC_FULL.md §10.5).
//!
//! File snapshots carry optional `ai_summary` / `change_analysis` fields
//! that a real AI analysis service would populate (out of scope, §1). This
//! worker exercises the seam with a free, deterministic stand-in: a line
//! delta against the previous snapshot of the same original path. A job
//! holds no references to request-scoped state, only a store handle and an
//! id, matching the "post-commit enqueued task" design note (§9).

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};
use uuid::Uuid;

use crate::filestore::FileSnapshotStore;

pub struct EnrichmentJob {
    pub snapshot_id: Uuid,
    pub previous_content: Option<Vec<u8>>,
    pub new_content: Vec<u8>,
}

pub struct EnrichmentWorker {
    sender: Sender<EnrichmentJob>,
    handle: Option<JoinHandle<()>>,
}

impl EnrichmentWorker {
    pub fn spawn(store: Arc<FileSnapshotStore>) -> Self {
        let (sender, receiver) = bounded::<EnrichmentJob>(64);

        let handle = std::thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                let summary = summarize(job.previous_content.as_deref(), &job.new_content);
                if let Err(e) = store.apply_enrichment(job.snapshot_id, summary, None) {
                    crate::warning!(
                        "enrichment for snapshot {} failed and was dropped: {e}",
                        job.snapshot_id
                    );
                }
            }
        });

        Self {
            sender,
            handle: Some(handle),
        }
    }

    /// Enqueue a job. Never blocks the caller on completion; a full queue
    /// drops the enrichment rather than stalling the snapshot operation.
    pub fn enqueue(&self, job: EnrichmentJob) {
        if self.sender.try_send(job).is_err() {
            crate::warning!("enrichment queue is full, dropping a job");
        }
    }
}

impl Drop for EnrichmentWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(std::mem::replace(&mut self.sender, bounded(1).0));
            let _ = handle.join();
        }
    }
}

fn summarize(previous: Option<&[u8]>, new: &[u8]) -> String {
    let new_lines = String::from_utf8_lossy(new).lines().count();
    match previous {
        None => format!("initial snapshot, {new_lines} lines"),
        Some(prev) => {
            let prev_lines = String::from_utf8_lossy(prev).lines().count();
            let delta = new_lines as i64 - prev_lines as i64;
            match delta.cmp(&0) {
                std::cmp::Ordering::Greater => format!("+{delta} lines"),
                std::cmp::Ordering::Less => format!("{delta} lines"),
                std::cmp::Ordering::Equal => "no line count change".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_reports_line_delta() {
        assert_eq!(summarize(Some(b"a\nb\n"), b"a\nb\nc\n"), "+1 lines");
        assert_eq!(summarize(Some(b"a\nb\nc\n"), b"a\n"), "-2 lines");
        assert_eq!(summarize(None, b"a\nb\n"), "initial snapshot, 2 lines");
    }
}
