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

//! Human-readable diagnostics, kept off the structured response channel.
//!
//! The engine never writes to stdout itself; these macros write to stderr
//! so a caller piping the structured `{ok, data}` / `{ok, kind, message}`
//! response on stdout never sees log noise mixed in.

/// Informational message, printed when verbosity >= 1.
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        if $crate::global::verbosity() >= 1 {
            eprintln!("{}", format!($($arg)*));
        }
    }};
}

/// Warning message, always printed, in yellow.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{}", format!($($arg)*).yellow());
    }};
}

/// Error message, always printed, in red.
#[macro_export]
macro_rules! error_msg {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{}", format!($($arg)*).red());
    }};
}

/// Verbose/debug message, printed only when verbosity >= 2.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::global::verbosity() >= 2 {
            eprintln!("{}", format!($($arg)*));
        }
    }};
}
