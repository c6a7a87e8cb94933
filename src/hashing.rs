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

//! Content hashing and cheap stat fingerprints (SPEC_FULL.md §4.2).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const STREAM_CHUNK_SIZE: usize = 1024 * 1024;

/// Calculate the SHA-256 hash of a stream of bytes.
pub fn calculate_hash(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{:x}", hash)
}

/// Stream `path` through SHA-256 without loading it fully into memory.
/// Returns `(size_bytes, sha256_hex)`.
pub fn hash_file(path: &Path) -> Result<(u64, String)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; STREAM_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    Ok((total, format!("{:x}", hasher.finalize())))
}

/// Cheap fingerprint used by the stat-comparison change-detection layer.
/// Returns `(size_bytes, mtime_ms)`.
pub fn fingerprint(path: &Path) -> Result<(u64, i64)> {
    let meta = std::fs::metadata(path)?;
    let mtime_ms = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    Ok((meta.len(), mtime_ms))
}

/// Like [`hash_file`] but maps a missing source into [`Error::NotFound`]
/// instead of a generic IO error, for callers that need to distinguish
/// "file vanished between scan and hash" from other IO failures.
pub fn hash_file_must_exist(path: &Path) -> Result<(u64, String)> {
    if !path.is_file() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    hash_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hash() {
        let data = b"Lorem ipsum dolor sit amet";
        let expected_hash = "16aba5393ad72c0041f5600ad3c2c52ec437a2f0c7fc08fadfc3c0fe9641d7a3";
        let hash = calculate_hash(data);
        assert_eq!(hash, expected_hash);
    }

    #[test]
    fn hash_file_matches_calculate_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let (size, hash) = hash_file(&path).unwrap();
        assert_eq!(size, 11);
        assert_eq!(hash, calculate_hash(b"hello world"));
    }

    #[test]
    fn fingerprint_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"1234567890").unwrap();

        let (size, mtime) = fingerprint(&path).unwrap();
        assert_eq!(size, 10);
        assert!(mtime > 0);
    }
}
