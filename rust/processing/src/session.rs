// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session state owned by a single worker.
//!
//! A session holds at most one geometry record. A successful parse replaces
//! it; a failed request leaves it untouched. Only [`Session::memory_cleanup`]
//! releases it.

use wearscan_core::{
    binary_triangle_count, expected_binary_len, GeometryRecord, StlDecoder, StlFormat,
};
use wearscan_geometry::{
    isolate_inner_surface, quantize_positions, weld_vertices, BufferPool, InnerSurfaceSelection,
};

use crate::config::WorkerConfig;
use crate::error::SessionError;
use crate::messages::{
    CleanupReport, ParseSummary, PerformanceSnapshot, QuantizeSummary, VolumetricWearReport,
    WearZoneReport, WeldSummary,
};
use crate::monitor::PerformanceMonitor;

type Result<T> = std::result::Result<T, SessionError>;

pub struct Session {
    geometry: Option<GeometryRecord>,
    pool: BufferPool<f32>,
    monitor: PerformanceMonitor,
    decoder: StlDecoder,
    config: WorkerConfig,
}

impl Session {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            geometry: None,
            pool: BufferPool::new(config.pool_max_per_size),
            monitor: PerformanceMonitor::new(),
            decoder: StlDecoder::new().with_strict_detection(config.strict_detection),
            config,
        }
    }

    /// The held geometry, if any.
    pub fn geometry(&self) -> Option<&GeometryRecord> {
        self.geometry.as_ref()
    }

    fn require_geometry(&self) -> Result<&GeometryRecord> {
        self.geometry.as_ref().ok_or(SessionError::NoGeometryLoaded)
    }

    /// Position buffer for decoding `bytes`, taken from the pool when the
    /// file is binary and its declared size is plausible.
    fn position_buffer(&mut self, bytes: &[u8]) -> Vec<f32> {
        if self.decoder.detect(bytes) != StlFormat::Binary {
            return Vec::new();
        }
        match binary_triangle_count(bytes) {
            Ok(count) if expected_binary_len(count) <= bytes.len() as u64 => {
                self.pool.acquire(count as usize * 9)
            }
            _ => Vec::new(),
        }
    }

    /// Decode `bytes` and make the result the held geometry.
    pub fn parse_stl<F: FnMut(f32)>(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        progress: F,
    ) -> Result<ParseSummary> {
        self.monitor.start("parse");
        let buffer = self.position_buffer(bytes);

        let decoded = match self.decoder.decode_with_buffer(bytes, buffer, progress) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.monitor.cancel("parse");
                tracing::warn!(file_name, error = %err, "STL decode failed");
                return Err(err.into());
            }
        };
        self.monitor.finish("parse", Some(bytes.len()));

        let record = decoded.record;
        let summary = ParseSummary {
            file_name: file_name.to_string(),
            format: decoded.format,
            vertex_count: record.vertex_count(),
            face_count: record.face_count(),
            bounding_box: *record.bounding_box(),
        };

        if let Some(previous) = self.geometry.replace(record) {
            let (positions, _, _) = previous.into_parts();
            self.pool.release(positions);
        }

        tracing::info!(
            file_name,
            format = summary.format.name(),
            vertices = summary.vertex_count,
            faces = summary.face_count,
            "parsed STL"
        );
        Ok(summary)
    }

    pub fn isolate_inner_surface<F: FnMut(f32)>(
        &mut self,
        progress: F,
    ) -> Result<InnerSurfaceSelection> {
        let record = self.geometry.as_ref().ok_or(SessionError::NoGeometryLoaded)?;
        self.monitor.start("isolate");
        let selection = match isolate_inner_surface(record, progress) {
            Ok(selection) => selection,
            Err(err) => {
                self.monitor.cancel("isolate");
                return Err(err.into());
            }
        };
        self.monitor.finish("isolate", None);

        tracing::info!(
            selected = selection.selected_face_count,
            total = selection.total_face_count,
            "isolated inner surface"
        );
        Ok(selection)
    }

    /// Wear-zone clustering is not implemented; always reports no zones.
    pub fn detect_wear_zones(&self, selected_face_indices: &[u32]) -> WearZoneReport {
        WearZoneReport {
            wear_zones: Vec::new(),
            processed_faces: selected_face_indices.len(),
        }
    }

    /// Volumetric wear is not implemented; always reports zero volume.
    pub fn calculate_volumetric_wear(&self, wear_face_indices: &[u32]) -> VolumetricWearReport {
        VolumetricWearReport {
            volume: 0.0,
            face_count: wear_face_indices.len(),
        }
    }

    /// Drop the held geometry and every pooled buffer.
    pub fn memory_cleanup(&mut self) -> CleanupReport {
        let released = self.geometry.take();
        let released_bytes = released.as_ref().map_or(0, GeometryRecord::byte_size);
        self.pool.clear();
        self.monitor.clear();

        tracing::info!(released_bytes, "memory cleanup");
        CleanupReport {
            released_geometry: released.is_some(),
            released_bytes,
        }
    }

    pub fn quantize_geometry(&self, bits: Option<u8>) -> Result<QuantizeSummary> {
        let record = self.require_geometry()?;
        let bits = bits.unwrap_or(self.config.quantization_bits);
        let quantized = quantize_positions(record.positions(), bits)?;

        Ok(QuantizeSummary {
            bits,
            bounds: quantized.bounds,
            info: quantized.info(),
        })
    }

    /// Weld figures for the held geometry; the record itself is unchanged.
    pub fn weld_vertices(&self, tolerance: Option<f32>) -> Result<WeldSummary> {
        let record = self.require_geometry()?;
        let tolerance = tolerance.unwrap_or(self.config.weld_tolerance);
        let welded = weld_vertices(record.positions(), tolerance)?;

        Ok(WeldSummary {
            tolerance,
            original_vertex_count: record.vertex_count(),
            unique_vertex_count: welded.unique_vertex_count(),
            reduction_percent: welded.reduction_percent,
        })
    }

    pub fn performance_report(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            measurements: self.monitor.measurements().to_vec(),
            pool: self.pool.stats(),
            geometry_bytes: self.geometry.as_ref().map_or(0, GeometryRecord::byte_size),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(WorkerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearscan_core::no_progress;

    fn binary_stl(triangles: usize) -> Vec<u8> {
        let mut buf = vec![0u8; 80];
        buf.extend_from_slice(&(triangles as u32).to_le_bytes());
        for i in 0..triangles {
            let x = i as f32;
            buf.extend_from_slice(&[0u8; 12]);
            for c in [x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 1.0, 1.0] {
                buf.extend_from_slice(&c.to_le_bytes());
            }
            buf.extend_from_slice(&[0u8; 2]);
        }
        buf
    }

    #[test]
    fn test_operations_need_geometry() {
        let mut session = Session::default();
        assert_eq!(
            session.isolate_inner_surface(no_progress).unwrap_err(),
            SessionError::NoGeometryLoaded
        );
        assert_eq!(session.quantize_geometry(None).unwrap_err(), SessionError::NoGeometryLoaded);
        assert_eq!(session.weld_vertices(None).unwrap_err(), SessionError::NoGeometryLoaded);
    }

    #[test]
    fn test_failed_parse_keeps_previous_geometry() {
        let mut session = Session::default();
        session.parse_stl(&binary_stl(4), "good.stl", no_progress).unwrap();

        let mut truncated = binary_stl(4);
        truncated.truncate(120);
        let err = session.parse_stl(&truncated, "bad.stl", no_progress).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_BINARY_STL");
        assert_eq!(session.geometry().map(|g| g.face_count()), Some(4));
    }

    #[test]
    fn test_replaced_positions_return_to_pool() {
        let mut session = Session::default();
        session.parse_stl(&binary_stl(4), "a.stl", no_progress).unwrap();
        let first = session.performance_report().pool.total_allocated_bytes;
        assert_eq!(first, 4 * 9 * 4);

        session.parse_stl(&binary_stl(4), "b.stl", no_progress).unwrap();
        let stats = session.performance_report().pool;
        assert_eq!(stats.total_allocated_bytes, first * 2);
        assert_eq!(stats.total_buffers, 1);

        // Third parse of the same size reuses the pooled buffer.
        session.parse_stl(&binary_stl(4), "c.stl", no_progress).unwrap();
        assert_eq!(session.performance_report().pool.total_allocated_bytes, first * 2);
    }

    #[test]
    fn test_cleanup_releases_geometry() {
        let mut session = Session::default();
        session.parse_stl(&binary_stl(2), "a.stl", no_progress).unwrap();
        assert_eq!(session.performance_report().measurements.len(), 1);

        let report = session.memory_cleanup();
        assert!(report.released_geometry);
        assert_eq!(report.released_bytes, 2 * 9 * 4 + 2 * 12);
        assert!(session.geometry().is_none());
        let snapshot = session.performance_report();
        assert_eq!(snapshot.pool.pool_count, 0);
        assert!(snapshot.measurements.is_empty());

        assert!(!session.memory_cleanup().released_geometry);
    }

    #[test]
    fn test_weld_leaves_geometry_unchanged() {
        let mut session = Session::default();
        session.parse_stl(&binary_stl(3), "a.stl", no_progress).unwrap();
        let summary = session.weld_vertices(None).unwrap();
        assert_eq!(summary.original_vertex_count, 9);
        // Neighbouring strips share the (x+1, 0, 0) / (x, 0, 0) corner.
        assert_eq!(summary.unique_vertex_count, 7);
        assert_eq!(session.geometry().map(|g| g.vertex_count()), Some(9));
    }

    #[test]
    fn test_quantize_defaults_to_config_bits() {
        let mut session = Session::default();
        session.parse_stl(&binary_stl(2), "a.stl", no_progress).unwrap();
        let summary = session.quantize_geometry(None).unwrap();
        assert_eq!(summary.bits, 16);
        assert_eq!(summary.info.compressed_bytes, 18 * 2);

        let err = session.quantize_geometry(Some(0)).unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_wear_placeholders() {
        let session = Session::default();
        let zones = session.detect_wear_zones(&[1, 2, 3]);
        assert!(zones.wear_zones.is_empty());
        assert_eq!(zones.processed_faces, 3);
        assert_eq!(session.calculate_volumetric_wear(&[4]).volume, 0.0);
    }
}
