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

//! Per-store write serialisation (SPEC_FULL.md §4.8).
//!
//! Each store keeps one keyed lock map. All index writes use the single
//! key `"save_data"`, so concurrent callers into the same store serialise
//! on that key while stores never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

pub const SAVE_DATA_KEY: &str = "save_data";

#[derive(Default)]
pub struct LockManager {
    keys: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut keys = self.keys.lock();
        keys.entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `op` with exclusive access to `key`. A failing `op` releases the
    /// lock normally and does not poison later callers.
    pub fn with_lock<T>(&self, key: &str, op: impl FnOnce() -> T) -> T {
        let lock = self.key_lock(key);
        let _guard = lock.lock();
        op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn serializes_same_key() {
        let manager = LockManager::new();
        let counter = AtomicU32::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    manager.with_lock(SAVE_DATA_KEY, || {
                        let before = counter.load(Ordering::SeqCst);
                        std::thread::yield_now();
                        counter.store(before + 1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn failing_op_does_not_poison_future_calls() {
        let manager = LockManager::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.with_lock("k", || -> Result<(), &'static str> { Err("boom") })
        }));
        assert!(result.is_ok());
        manager.with_lock("k", || {});
    }
}
