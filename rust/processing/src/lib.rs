// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL processing worker
//!
//! Owns one decoded geometry record per session and serves typed requests
//! over channels:
//!
//! - [`Session`]: the state and the operations on it
//! - [`dispatch`]: maps a [`Request`] to its [`Response`]
//! - [`WorkerHandle`]: runs a session on a blocking Tokio task
//!
//! ```no_run
//! use wearscan_processing::{Request, WorkerConfig, WorkerHandle};
//!
//! # async fn demo(bytes: Vec<u8>) -> Result<(), wearscan_processing::WorkerError> {
//! let mut worker = WorkerHandle::spawn(WorkerConfig::from_env());
//! let response = worker
//!     .call(
//!         Request::ParseStl { bytes, file_name: "part.stl".into() },
//!         |progress| println!("{:.0}%", progress.progress()),
//!     )
//!     .await?;
//! assert!(response.is_success());
//! worker.shutdown().await
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod monitor;
pub mod session;
pub mod worker;

pub use config::WorkerConfig;
pub use dispatch::dispatch;
pub use error::{SessionError, WorkerError};
pub use messages::{
    CleanupReport, Failure, Outbound, ParseSummary, PerformanceSnapshot, ProgressMessage,
    QuantizeSummary, Request, Response, VolumetricWearReport, WearZone, WearZoneReport,
    WeldSummary,
};
pub use monitor::{Measurement, PerformanceMonitor};
pub use session::Session;
pub use worker::WorkerHandle;

pub use wearscan_core::{BoundingBox, ProgressStage, StlFormat};
pub use wearscan_geometry::{InnerSurfaceSelection, PoolStats};
