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

use std::path::PathBuf;

use thiserror::Error;

/// Discriminated error taxonomy for the snapshot engine's public operations.
///
/// Every variant maps to one `kind` in the `{ok:false, kind, message}`
/// response contract; callers at the transport boundary are expected to
/// match on `Error::kind()` rather than format strings.
#[derive(Error, Debug)]
pub enum Error {
    #[error("store is not activated for a project")]
    NotActivated,

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt snapshot '{id}': {reason}")]
    Corrupt { id: String, reason: String },

    #[error("no usable full snapshot to restore from")]
    NoBaseline,

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("change detector failed: {0}")]
    ChangeDetectorFailed(String),
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// The stable string discriminant carried in the `{ok:false, kind, ...}`
/// response shape described in SPEC_FULL.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotActivated,
    InvalidPath,
    NotFound,
    Corrupt,
    NoBaseline,
    IoError,
    ChangeDetectorFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotActivated => "NotActivated",
            ErrorKind::InvalidPath => "InvalidPath",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Corrupt => "Corrupt",
            ErrorKind::NoBaseline => "NoBaseline",
            ErrorKind::IoError => "IoError",
            ErrorKind::ChangeDetectorFailed => "ChangeDetectorFailed",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotActivated => ErrorKind::NotActivated,
            Error::InvalidPath { .. } => ErrorKind::InvalidPath,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Corrupt { .. } => ErrorKind::Corrupt,
            Error::NoBaseline => ErrorKind::NoBaseline,
            Error::IoError(_) => ErrorKind::IoError,
            Error::ChangeDetectorFailed(_) => ErrorKind::ChangeDetectorFailed,
        }
    }
}
