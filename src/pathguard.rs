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

//! Path validation guarding every write the engine performs (SPEC_FULL.md §4.1).

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

const DENYLIST_PREFIXES: &[&str] = &[
    "/etc/", "/usr/", "/bin/", "/sbin/", "/boot/", "/root/", "/sys/", "/proc/",
];

/// Lexically normalise `path`, resolving `.` and rejecting any `..` that
/// would escape above the path's own root. Does not touch the filesystem.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // Unresolved `..`: it would escape above what we've seen.
                    return None;
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Some(out)
}

fn denylisted(path: &Path) -> bool {
    let s = path.to_string_lossy();
    DENYLIST_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
}

/// Validate `path` is safe to read or write.
///
/// Rejects unresolved `..` escapes and OS-reserved prefixes. When
/// `allowed_root` is given, the normalised path must additionally lie
/// within the root's canonicalised form.
pub fn validate(path: &Path, allowed_root: Option<&Path>) -> Result<PathBuf> {
    let normalized = normalize(path).ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "path escapes its own root via unresolved '..'".to_string(),
    })?;

    if denylisted(&normalized) {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "path falls under a reserved system prefix".to_string(),
        });
    }

    if let Some(root) = allowed_root {
        let canonical_root = root.canonicalize().map_err(|e| Error::InvalidPath {
            path: root.to_path_buf(),
            reason: format!("allowed_root could not be resolved: {e}"),
        })?;

        // The destination may not exist yet (e.g. a restore target), so we
        // canonicalize the closest existing ancestor and rebuild the tail.
        let mut existing_ancestor = normalized.as_path();
        let mut tail = PathBuf::new();
        loop {
            if existing_ancestor.exists() {
                break;
            }
            if let Some(name) = existing_ancestor.file_name() {
                tail = PathBuf::from(name).join(&tail);
            }
            match existing_ancestor.parent() {
                Some(parent) => existing_ancestor = parent,
                None => break,
            }
        }

        let resolved = if existing_ancestor.as_os_str().is_empty() {
            normalized.clone()
        } else {
            existing_ancestor
                .canonicalize()
                .map(|base| base.join(&tail))
                .unwrap_or_else(|_| normalized.clone())
        };

        if !resolved.starts_with(&canonical_root) {
            return Err(Error::InvalidPath {
                path: path.to_path_buf(),
                reason: format!("path escapes allowed root '{}'", canonical_root.display()),
            });
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unresolved_parent_escape() {
        let err = validate(Path::new("../../etc/passwd"), None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidPath);
    }

    #[test]
    fn rejects_denylisted_prefix() {
        let err = validate(Path::new("/etc/passwd"), None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidPath);
    }

    #[test]
    fn accepts_plain_relative_path() {
        let ok = validate(Path::new("src/main.rs"), None).unwrap();
        assert_eq!(ok, PathBuf::from("src/main.rs"));
    }

    #[test]
    fn resolves_internal_parent_components() {
        let ok = validate(Path::new("a/b/../c.txt"), None).unwrap();
        assert_eq!(ok, PathBuf::from("a/c.txt"));
    }

    #[test]
    fn enforces_allowed_root_containment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("project")).unwrap();
        let project_root = dir.path().join("project");

        let inside = project_root.join("file.txt");
        assert!(validate(&inside, Some(&project_root)).is_ok());

        let outside = dir.path().join("other").join("file.txt");
        let err = validate(&outside, Some(&project_root)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidPath);
    }
}
