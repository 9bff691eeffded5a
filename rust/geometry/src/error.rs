// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Core error: {0}")]
    CoreError(#[from] wearscan_core::Error),
}

impl Error {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Error::EmptyMesh(_) => "DEGENERATE_GEOMETRY",
            Error::InvalidParameter(_) => "INVALID_PARAMETER",
            Error::CoreError(err) => err.code(),
        }
    }
}
