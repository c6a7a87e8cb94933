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

//! Recursive tree replication, never destructive on the destination side
//! (SPEC_FULL.md §4.4, §5, §9: "forbidden destructive sync").

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::Result;

/// Basename/glob exclusion rules shared by the copier and the change detector.
#[derive(Clone)]
pub struct ExcludeSet {
    basenames: Vec<String>,
    globs: GlobSet,
}

impl ExcludeSet {
    pub fn new(basenames: &[&str], globs: &[&str]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in globs {
            if let Ok(glob) = Glob::new(pattern) {
                builder.add(glob);
            }
        }
        Self {
            basenames: basenames.iter().map(|s| s.to_string()).collect(),
            globs: builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap()),
        }
    }

    pub fn default_set() -> Self {
        Self::new(
            crate::global::defaults::DEFAULT_EXCLUDE_BASENAMES,
            crate::global::defaults::DEFAULT_EXCLUDE_GLOBS,
        )
    }

    pub fn excludes(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.basenames.iter().any(|b| b == name) {
                return true;
            }
            if self.globs.is_match(name) {
                return true;
            }
        }
        false
    }
}

/// Copy a single file, creating its destination's parent directory as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(src, dst)?;
    Ok(())
}

/// Recursively mirror `src` into `dst`, skipping anything `exclude` rejects.
///
/// This NEVER removes files already present under `dst` that aren't in
/// `src` — CodeRecoder's restore contract forbids a "delete extraneous
/// destination files" mode (SPEC_FULL.md §9). Files are copied in parallel
/// via a rayon thread pool; if any single file fails to copy the error is
/// collected and the whole operation fails, but files already copied are
/// left in place (partial progress is preserved, not rolled back).
pub fn copy_tree(src: &Path, dst: &Path, exclude: &ExcludeSet) -> Result<u64> {
    std::fs::create_dir_all(dst)?;

    let entries: Vec<PathBuf> = WalkDir::new(src)
        .into_iter()
        .filter_entry(|e| !exclude.excludes(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    let count = entries.len() as u64;

    entries
        .into_par_iter()
        .map(|path| -> Result<()> {
            let relative = path.strip_prefix(src).unwrap_or(&path);
            let dest = dst.join(relative);
            copy_file(&path, &dest)
        })
        .collect::<Result<Vec<()>>>()?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_tree_honouring_excludes() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir_all(src.path().join(".git")).unwrap();
        std::fs::write(src.path().join(".git").join("HEAD"), b"ref").unwrap();
        std::fs::create_dir_all(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub").join("b.txt"), b"b").unwrap();

        let exclude = ExcludeSet::default_set();
        let count = copy_tree(src.path(), dst.path(), &exclude).unwrap();

        assert_eq!(count, 2);
        assert!(dst.path().join("a.txt").exists());
        assert!(dst.path().join("sub").join("b.txt").exists());
        assert!(!dst.path().join(".git").exists());
    }

    #[test]
    fn copy_tree_never_deletes_preexisting_destination_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(dst.path().join("untouched.txt"), b"keep me").unwrap();
        std::fs::write(src.path().join("a.txt"), b"a").unwrap();

        let exclude = ExcludeSet::default_set();
        copy_tree(src.path(), dst.path(), &exclude).unwrap();

        assert!(dst.path().join("untouched.txt").exists());
        assert!(dst.path().join("a.txt").exists());
    }
}
