// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the session and the worker channel.

use thiserror::Error;

/// Errors raised while handling a request against the session state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("No geometry loaded: parse an STL file first")]
    NoGeometryLoaded,

    #[error(transparent)]
    Core(#[from] wearscan_core::Error),

    #[error(transparent)]
    Geometry(#[from] wearscan_geometry::Error),
}

impl SessionError {
    /// Stable machine-readable code carried in failure replies.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::NoGeometryLoaded => "NO_GEOMETRY_LOADED",
            SessionError::Core(err) => err.code(),
            SessionError::Geometry(err) => err.code(),
        }
    }
}

/// Errors talking to a running worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker channel closed")]
    Disconnected,

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
