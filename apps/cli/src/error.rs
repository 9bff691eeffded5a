// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors surfaced by the command-line front-end.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("STL file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Chunk size must be at least 1 byte")]
    InvalidChunkSize,

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} failed [{code}]: {message}")]
    Request {
        kind: &'static str,
        code: String,
        message: String,
    },
}
