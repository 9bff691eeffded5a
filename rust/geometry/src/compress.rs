// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry compression: position quantization and vertex welding

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use wearscan_core::{BoundingBox, Face, Vec3};

/// Default quantization bit depth
pub const DEFAULT_QUANTIZATION_BITS: u8 = 16;

/// Default weld tolerance in model units
pub const DEFAULT_WELD_TOLERANCE: f32 = 0.001;

/// Per-axis bounds used to quantize a position buffer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct QuantizationBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub range: Vec3,
}

impl QuantizationBounds {
    fn axis_range(&self, axis: usize) -> f64 {
        self.max.axis(axis) as f64 - self.min.axis(axis) as f64
    }
}

impl From<&BoundingBox> for QuantizationBounds {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            min: bbox.min,
            max: bbox.max,
            range: bbox.size,
        }
    }
}

/// Size metadata for a quantization pass
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CompressionInfo {
    pub original_bytes: usize,
    pub compressed_bytes: usize,
    /// `original_bytes / compressed_bytes`
    pub compression_ratio: f64,
}

/// Fixed-precision encoding of a position buffer
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedGeometry {
    pub quantized: Vec<u16>,
    pub bounds: QuantizationBounds,
    pub bits: u8,
}

impl QuantizedGeometry {
    pub fn info(&self) -> CompressionInfo {
        let original_bytes = self.quantized.len() * 4;
        let compressed_bytes = self.quantized.len() * 2;
        CompressionInfo {
            original_bytes,
            compressed_bytes,
            compression_ratio: if compressed_bytes == 0 {
                0.0
            } else {
                original_bytes as f64 / compressed_bytes as f64
            },
        }
    }

    /// Decode back to `f32` positions
    pub fn dequantize(&self) -> Vec<f32> {
        dequantize_positions(&self.quantized, &self.bounds, self.bits)
    }
}

#[inline]
fn max_quantized(bits: u8) -> f64 {
    ((1u32 << bits) - 1) as f64
}

fn check_bits(bits: u8) -> Result<()> {
    if (1..=16).contains(&bits) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "quantization bit depth must be between 1 and 16, got {}",
            bits
        )))
    }
}

/// Quantize positions to `bits` per coordinate
///
/// Each coordinate maps to `round((v - min) / range * (2^bits - 1))`. An axis
/// with zero range quantizes to 0 on every vertex and dequantizes to `min`.
pub fn quantize_positions(positions: &[f32], bits: u8) -> Result<QuantizedGeometry> {
    check_bits(bits)?;
    let bbox = BoundingBox::from_positions(positions)?;
    let bounds = QuantizationBounds::from(&bbox);
    let max_q = max_quantized(bits);

    let mins = [
        bounds.min.x as f64,
        bounds.min.y as f64,
        bounds.min.z as f64,
    ];
    let ranges = [
        bounds.axis_range(0),
        bounds.axis_range(1),
        bounds.axis_range(2),
    ];

    let mut quantized = Vec::with_capacity(positions.len());
    for vertex in positions.chunks_exact(3) {
        for axis in 0..3 {
            let range = ranges[axis];
            let q = if range > 0.0 {
                (((vertex[axis] as f64 - mins[axis]) / range) * max_q)
                    .round()
                    .clamp(0.0, max_q)
            } else {
                0.0
            };
            quantized.push(q as u16);
        }
    }

    tracing::debug!(
        values = quantized.len(),
        bits,
        flat_axes = ranges.iter().filter(|r| **r == 0.0).count(),
        "quantized positions"
    );

    Ok(QuantizedGeometry {
        quantized,
        bounds,
        bits,
    })
}

/// Inverse of [`quantize_positions`] for the same bounds and bit depth
pub fn dequantize_positions(quantized: &[u16], bounds: &QuantizationBounds, bits: u8) -> Vec<f32> {
    let max_q = max_quantized(bits.clamp(1, 16));
    let mins = [
        bounds.min.x as f64,
        bounds.min.y as f64,
        bounds.min.z as f64,
    ];
    let ranges = [
        bounds.axis_range(0),
        bounds.axis_range(1),
        bounds.axis_range(2),
    ];

    quantized
        .iter()
        .enumerate()
        .map(|(i, &q)| {
            let axis = i % 3;
            (mins[axis] + (q as f64 / max_q) * ranges[axis]) as f32
        })
        .collect()
}

/// Outcome of welding near-duplicate vertices
#[derive(Debug, Clone, PartialEq)]
pub struct VertexWeldResult {
    /// Snapped unique positions
    pub positions: Vec<f32>,
    /// New index for every original vertex
    pub vertex_map: Vec<u32>,
    /// Share of original vertices removed, 0..100
    pub reduction_percent: f32,
}

impl VertexWeldResult {
    #[inline]
    pub fn unique_vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Re-index faces through the vertex map
    ///
    /// Welding never touches faces on its own; callers that keep the welded
    /// positions must remap their faces with this.
    pub fn remap_faces(&self, faces: &[Face]) -> Result<Vec<Face>> {
        faces
            .iter()
            .enumerate()
            .map(|(face, tri)| {
                let mut out = [0u32; 3];
                for (slot, &index) in out.iter_mut().zip(tri.iter()) {
                    *slot = *self.vertex_map.get(index as usize).ok_or_else(|| {
                        wearscan_core::Error::InvalidFaceIndex {
                            face,
                            index,
                            vertex_count: self.vertex_map.len(),
                        }
                    })?;
                }
                Ok(out)
            })
            .collect()
    }
}

/// Merge vertices whose coordinates snap to the same multiple of `tolerance`
///
/// Every original vertex maps to the first-seen vertex sharing its snapped
/// key; output positions are the snapped coordinates.
pub fn weld_vertices(positions: &[f32], tolerance: f32) -> Result<VertexWeldResult> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "weld tolerance must be finite and positive, got {}",
            tolerance
        )));
    }
    if positions.len() % 3 != 0 {
        return Err(Error::InvalidParameter(format!(
            "position buffer length {} is not a multiple of 3",
            positions.len()
        )));
    }
    if positions.is_empty() {
        return Err(Error::EmptyMesh("no vertices to weld".to_string()));
    }

    let t = tolerance as f64;
    let vertex_count = positions.len() / 3;
    let mut unique: FxHashMap<[i64; 3], u32> = FxHashMap::default();
    let mut welded = Vec::new();
    let mut vertex_map = Vec::with_capacity(vertex_count);

    for vertex in positions.chunks_exact(3) {
        let key = [
            (vertex[0] as f64 / t).round() as i64,
            (vertex[1] as f64 / t).round() as i64,
            (vertex[2] as f64 / t).round() as i64,
        ];
        let index = *unique.entry(key).or_insert_with(|| {
            let next = (welded.len() / 3) as u32;
            welded.extend(key.iter().map(|&k| (k as f64 * t) as f32));
            next
        });
        vertex_map.push(index);
    }

    let reduction_percent =
        ((positions.len() - welded.len()) as f64 / positions.len() as f64 * 100.0) as f32;

    tracing::debug!(
        input = vertex_count,
        output = welded.len() / 3,
        reduction_percent,
        "welded vertices"
    );

    Ok(VertexWeldResult {
        positions: welded,
        vertex_map,
        reduction_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_positions() -> Vec<f32> {
        vec![
            -5.0, 0.0, 2.0, //
            5.0, 10.0, 2.5, //
            1.25, 3.3, 7.0, //
            0.0, -2.0, 4.4,
        ]
    }

    #[test]
    fn test_quantize_endpoints() {
        let q = quantize_positions(&sample_positions(), 16).unwrap();
        assert_eq!(q.quantized.len(), 12);
        assert_eq!(q.quantized[0], 0);
        assert_eq!(q.quantized[3], u16::MAX);
        assert_eq!(q.bounds.min, Vec3::new(-5.0, -2.0, 2.0));
        assert_eq!(q.bounds.range.x, 10.0);
    }

    #[test]
    fn test_round_trip_error_bound() {
        let positions = sample_positions();
        for bits in [4u8, 8, 12, 16] {
            let q = quantize_positions(&positions, bits).unwrap();
            let restored = q.dequantize();
            for (i, (a, b)) in positions.iter().zip(&restored).enumerate() {
                let step = q.bounds.range.axis(i % 3) / ((1u32 << bits) - 1) as f32;
                assert!((a - b).abs() <= step + 1e-6, "bits {} index {}", bits, i);
            }
        }
    }

    #[test]
    fn test_requantize_is_stable() {
        let positions = sample_positions();
        let q = quantize_positions(&positions, 16).unwrap();
        let q2 = quantize_positions(&q.dequantize(), 16).unwrap();
        assert_eq!(q.quantized, q2.quantized);
    }

    #[test]
    fn test_flat_axis_quantizes_to_zero() {
        let positions = [0.0, 0.0, 3.0, 1.0, 2.0, 3.0, 4.0, 1.0, 3.0];
        let q = quantize_positions(&positions, 16).unwrap();
        assert!(q.quantized.iter().skip(2).step_by(3).all(|&v| v == 0));
        let restored = q.dequantize();
        assert!(restored.iter().skip(2).step_by(3).all(|&v| v == 3.0));
    }

    #[test]
    fn test_bits_are_validated() {
        let positions = sample_positions();
        assert!(matches!(
            quantize_positions(&positions, 0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            quantize_positions(&positions, 17),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_positions_are_degenerate() {
        let err = quantize_positions(&[], 16).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_GEOMETRY");
    }

    #[test]
    fn test_compression_info() {
        let info = quantize_positions(&sample_positions(), 16).unwrap().info();
        assert_eq!(info.original_bytes, 48);
        assert_eq!(info.compressed_bytes, 24);
        assert_relative_eq!(info.compression_ratio, 2.0);
    }

    #[test]
    fn test_weld_merges_close_vertices() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0002, 0.0, -0.0001, //
            1.0, 1.0, 0.0,
        ];
        let result = weld_vertices(&positions, 0.001).unwrap();
        assert_eq!(result.unique_vertex_count(), 3);
        assert_eq!(result.vertex_map, vec![0, 1, 0, 2]);
        assert_relative_eq!(result.reduction_percent, 25.0);
    }

    #[test]
    fn test_weld_keys_are_unique() {
        let positions: Vec<f32> = (0..300).map(|i| (i % 17) as f32 * 0.5).collect();
        let result = weld_vertices(&positions, 0.01).unwrap();
        assert_eq!(result.vertex_map.len(), 100);
        let mut seen = std::collections::HashSet::new();
        for v in result.positions.chunks_exact(3) {
            let key = [
                (v[0] / 0.01).round() as i64,
                (v[1] / 0.01).round() as i64,
                (v[2] / 0.01).round() as i64,
            ];
            assert!(seen.insert(key));
        }
        assert!(result.vertex_map.iter().all(|&i| (i as usize) < result.unique_vertex_count()));
    }

    #[test]
    fn test_remap_faces() {
        let positions = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let result = weld_vertices(&positions, 0.001).unwrap();
        let faces = result.remap_faces(&[[0, 1, 2], [3, 4, 5]]).unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [1, 3, 2]]);

        assert!(result.remap_faces(&[[0, 1, 6]]).is_err());
    }

    #[test]
    fn test_weld_rejects_bad_tolerance() {
        let positions = sample_positions();
        assert!(weld_vertices(&positions, 0.0).is_err());
        assert!(weld_vertices(&positions, f32::NAN).is_err());
        assert!(weld_vertices(&positions, -1.0).is_err());
    }
}
