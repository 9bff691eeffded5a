// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker message protocol.
//!
//! Requests and responses are closed tagged enums with one variant per
//! operation. Every request produces exactly one [`Response`] of the same
//! kind; progress travels separately as [`ProgressMessage`] and is advisory.

use serde::{Deserialize, Serialize};
use wearscan_core::{BoundingBox, ProgressStage, StlFormat};
use wearscan_geometry::{CompressionInfo, InnerSurfaceSelection, PoolStats, QuantizationBounds};

use crate::error::SessionError;
use crate::monitor::Measurement;

/// Serializes a `Result` as `{"success": ..}` or `{"failure": ..}`.
mod outcome {
    use super::Failure;
    use serde::{Serialize, Serializer};

    pub fn serialize<T, S>(result: &Result<T, Failure>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        enum Outcome<'a, T> {
            Success(&'a T),
            Failure(&'a Failure),
        }

        match result {
            Ok(value) => Outcome::Success(value),
            Err(failure) => Outcome::Failure(failure),
        }
        .serialize(serializer)
    }
}

/// Requests accepted by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Decode an STL buffer and make it the held geometry.
    #[serde(rename = "parseSTL", rename_all = "camelCase")]
    ParseStl { bytes: Vec<u8>, file_name: String },
    /// Select inner-surface candidate faces of the held geometry.
    IsolateInnerSurface,
    /// Cluster selected faces into wear zones (placeholder: always empty).
    #[serde(rename_all = "camelCase")]
    DetectWearZones {
        #[serde(default)]
        selected_face_indices: Vec<u32>,
    },
    /// Volume lost over the given faces (placeholder: always 0).
    #[serde(rename_all = "camelCase")]
    CalculateVolumetricWear {
        #[serde(default)]
        wear_face_indices: Vec<u32>,
    },
    /// Drop the held geometry and the buffer pool.
    MemoryCleanup,
    /// Report compression figures for the held geometry.
    QuantizeGeometry {
        #[serde(default)]
        bits: Option<u8>,
    },
    /// Report weld figures for the held geometry without modifying it.
    WeldVertices {
        #[serde(default)]
        tolerance: Option<f32>,
    },
    /// Completed timings and pool statistics.
    PerformanceReport,
}

impl Request {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Protocol name of this request kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::ParseStl { .. } => "parseSTL",
            Request::IsolateInnerSurface => "isolateInnerSurface",
            Request::DetectWearZones { .. } => "detectWearZones",
            Request::CalculateVolumetricWear { .. } => "calculateVolumetricWear",
            Request::MemoryCleanup => "memoryCleanup",
            Request::QuantizeGeometry { .. } => "quantizeGeometry",
            Request::WeldVertices { .. } => "weldVertices",
            Request::PerformanceReport => "performanceReport",
        }
    }
}

/// Failure slot of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    /// Human-readable reason.
    pub message: String,
    /// Stable machine code, e.g. `NO_GEOMETRY_LOADED`.
    pub code: String,
}

impl From<SessionError> for Failure {
    fn from(err: SessionError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub file_name: String,
    pub format: StlFormat,
    pub vertex_count: usize,
    pub face_count: usize,
    pub bounding_box: BoundingBox,
}

/// A cluster of worn faces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WearZone {
    pub face_indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WearZoneReport {
    pub wear_zones: Vec<WearZone>,
    pub processed_faces: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumetricWearReport {
    pub volume: f64,
    pub face_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Whether a geometry record was held and has been dropped.
    pub released_geometry: bool,
    /// Bytes held by the dropped record.
    pub released_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantizeSummary {
    pub bits: u8,
    pub bounds: QuantizationBounds,
    #[serde(flatten)]
    pub info: CompressionInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeldSummary {
    pub tolerance: f32,
    pub original_vertex_count: usize,
    pub unique_vertex_count: usize,
    pub reduction_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub measurements: Vec<Measurement>,
    pub pool: PoolStats,
    /// Bytes held by the current geometry record, 0 when none.
    pub geometry_bytes: usize,
}

/// Reply to a [`Request`], tagged with the request's kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    #[serde(rename = "parseSTL")]
    ParseStl {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<ParseSummary, Failure>,
    },
    IsolateInnerSurface {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<InnerSurfaceSelection, Failure>,
    },
    DetectWearZones {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<WearZoneReport, Failure>,
    },
    CalculateVolumetricWear {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<VolumetricWearReport, Failure>,
    },
    MemoryCleanup {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<CleanupReport, Failure>,
    },
    QuantizeGeometry {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<QuantizeSummary, Failure>,
    },
    WeldVertices {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<WeldSummary, Failure>,
    },
    PerformanceReport {
        #[serde(serialize_with = "outcome::serialize")]
        result: Result<PerformanceSnapshot, Failure>,
    },
}

impl Response {
    /// Protocol name of the request kind this answers.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::ParseStl { .. } => "parseSTL",
            Response::IsolateInnerSurface { .. } => "isolateInnerSurface",
            Response::DetectWearZones { .. } => "detectWearZones",
            Response::CalculateVolumetricWear { .. } => "calculateVolumetricWear",
            Response::MemoryCleanup { .. } => "memoryCleanup",
            Response::QuantizeGeometry { .. } => "quantizeGeometry",
            Response::WeldVertices { .. } => "weldVertices",
            Response::PerformanceReport { .. } => "performanceReport",
        }
    }

    /// The failure slot, if the request failed.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Response::ParseStl { result } => result.as_ref().err(),
            Response::IsolateInnerSurface { result } => result.as_ref().err(),
            Response::DetectWearZones { result } => result.as_ref().err(),
            Response::CalculateVolumetricWear { result } => result.as_ref().err(),
            Response::MemoryCleanup { result } => result.as_ref().err(),
            Response::QuantizeGeometry { result } => result.as_ref().err(),
            Response::WeldVertices { result } => result.as_ref().err(),
            Response::PerformanceReport { result } => result.as_ref().err(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }
}

/// Advisory progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressMessage {
    ParseProgress { progress: f32 },
    IsolateProgress { progress: f32 },
}

impl ProgressMessage {
    pub fn new(stage: ProgressStage, progress: f32) -> Self {
        match stage {
            ProgressStage::Parse => ProgressMessage::ParseProgress { progress },
            ProgressStage::Isolate => ProgressMessage::IsolateProgress { progress },
        }
    }

    pub fn stage(&self) -> ProgressStage {
        match self {
            ProgressMessage::ParseProgress { .. } => ProgressStage::Parse,
            ProgressMessage::IsolateProgress { .. } => ProgressStage::Isolate,
        }
    }

    pub fn progress(&self) -> f32 {
        match *self {
            ProgressMessage::ParseProgress { progress }
            | ProgressMessage::IsolateProgress { progress } => progress,
        }
    }
}

/// Everything the worker sends back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Response(Response),
    Progress(ProgressMessage),
}

impl Outbound {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
