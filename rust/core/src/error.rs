// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for STL decoding and geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or validating geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Malformed binary STL: {reason}")]
    MalformedBinaryStl { reason: String },

    #[error("Malformed ASCII STL: {reason}")]
    MalformedAsciiStl { reason: String },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    InvalidFaceIndex {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    pub fn malformed_binary(reason: impl Into<String>) -> Self {
        Error::MalformedBinaryStl {
            reason: reason.into(),
        }
    }

    pub fn malformed_ascii(reason: impl Into<String>) -> Self {
        Error::MalformedAsciiStl {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in failure replies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedBinaryStl { .. } => "MALFORMED_BINARY_STL",
            Error::MalformedAsciiStl { .. } => "MALFORMED_ASCII_STL",
            Error::DegenerateGeometry(_) => "DEGENERATE_GEOMETRY",
            Error::InvalidFaceIndex { .. } => "INVALID_GEOMETRY",
            Error::InvalidParameter(_) => "INVALID_PARAMETER",
        }
    }
}
