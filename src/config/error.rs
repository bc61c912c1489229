// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{io, path::PathBuf};

use crate::effects::ConfigError;

/// Typed error for profile load failures so callers can tell a missing file from a bad
/// value without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Unable to read profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to parse profile: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Invalid duration for {field}: {source}")]
    Duration {
        field: &'static str,
        #[source]
        source: duration_string::Error,
    },

    #[error("Invalid color for {field}: {reason}")]
    Color { field: &'static str, reason: String },

    #[error("Invalid effect: {0}")]
    Invalid(#[from] ConfigError),
}
