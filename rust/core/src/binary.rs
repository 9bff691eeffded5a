// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary STL decoding
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles (little-endian)
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! Records are read straight out of the input slice; the only allocation is
//! the position and face output, both sized from the declared count.

use crate::bounds::BoundsAccumulator;
use crate::error::{Error, Result};
use crate::progress::{ProgressReporter, BINARY_PROGRESS_STRIDE};
use crate::record::{Face, GeometryRecord};

/// Binary STL header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Size of the triangle count field
pub const TRIANGLE_COUNT_SIZE: usize = 4;

/// Size of one triangle record (normal + 3 vertices + attribute)
pub const TRIANGLE_SIZE: usize = 50;

/// Offset of the normal-skipped first vertex inside a record
const VERTEX_OFFSET: usize = 12;

/// Byte length implied by a declared triangle count
#[inline]
pub fn expected_binary_len(triangles: u32) -> u64 {
    (HEADER_SIZE + TRIANGLE_COUNT_SIZE) as u64 + triangles as u64 * TRIANGLE_SIZE as u64
}

/// Read the declared triangle count without decoding anything else.
pub fn binary_triangle_count(bytes: &[u8]) -> Result<u32> {
    if bytes.len() < HEADER_SIZE + TRIANGLE_COUNT_SIZE {
        return Err(Error::malformed_binary(format!(
            "buffer of {} bytes is shorter than the {}-byte header",
            bytes.len(),
            HEADER_SIZE + TRIANGLE_COUNT_SIZE
        )));
    }
    Ok(u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]))
}

/// Decode a binary STL buffer.
pub fn decode_binary<F: FnMut(f32)>(bytes: &[u8], progress: F) -> Result<GeometryRecord> {
    decode_binary_into(bytes, Vec::new(), progress)
}

/// Decode a binary STL buffer, writing positions into a recycled buffer.
///
/// The buffer is cleared first; its capacity is kept, so a buffer of
/// `9 * triangles` floats decodes without reallocating.
pub fn decode_binary_into<F: FnMut(f32)>(
    bytes: &[u8],
    mut positions: Vec<f32>,
    progress: F,
) -> Result<GeometryRecord> {
    let triangles = binary_triangle_count(bytes)?;
    let required = expected_binary_len(triangles);
    if required > bytes.len() as u64 {
        return Err(Error::malformed_binary(format!(
            "header declares {} triangles ({} bytes) but buffer holds {} bytes",
            triangles,
            required,
            bytes.len()
        )));
    }

    let triangle_count = triangles as usize;
    let data_start = HEADER_SIZE + TRIANGLE_COUNT_SIZE;
    let data = &bytes[data_start..data_start + triangle_count * TRIANGLE_SIZE];

    positions.clear();
    positions.reserve(triangle_count * 9);
    let mut faces: Vec<Face> = Vec::with_capacity(triangle_count);
    let mut bounds = BoundsAccumulator::new();
    let mut reporter = ProgressReporter::new(progress);

    for (i, record) in data.chunks_exact(TRIANGLE_SIZE).enumerate() {
        for v in 0..3 {
            let base = VERTEX_OFFSET + v * 12;
            let x = read_f32(record, base);
            let y = read_f32(record, base + 4);
            let z = read_f32(record, base + 8);
            if !(x.is_finite() && y.is_finite() && z.is_finite()) {
                return Err(Error::malformed_binary(format!(
                    "triangle {} vertex {} has a non-finite coordinate",
                    i, v
                )));
            }
            positions.extend_from_slice(&[x, y, z]);
            bounds.expand(x, y, z);
        }

        let n = (positions.len() / 3) as u32;
        faces.push([n - 3, n - 2, n - 1]);

        if i % BINARY_PROGRESS_STRIDE == 0 {
            reporter.report(i as f32 / triangle_count as f32 * 100.0);
        }
    }

    let bounding_box = bounds.finish()?;
    reporter.finish();

    tracing::debug!(
        triangles = triangle_count,
        trailing_bytes = bytes.len() as u64 - required,
        "Decoded binary STL"
    );

    Ok(GeometryRecord::from_decoded(positions, faces, bounding_box))
}

#[inline(always)]
fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::no_progress;

    fn encode(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            buf.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
            buf.extend_from_slice(&0u16.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_single_triangle() {
        let bytes = encode(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        let record = decode_binary(&bytes, no_progress).unwrap();
        assert_eq!(record.vertex_count(), 3);
        assert_eq!(record.faces(), &[[0, 1, 2]]);
        assert_eq!(record.bounding_box().max.x, 1.0);
    }

    #[test]
    fn test_truncated_buffer_rejected() {
        let mut bytes = encode(&[[[0.0; 3]; 3], [[1.0; 3]; 3]]);
        bytes.truncate(bytes.len() - 1);
        let err = decode_binary(&bytes, no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedBinaryStl { .. }));
    }

    #[test]
    fn test_header_only_buffer_rejected() {
        let err = decode_binary(&[0u8; 40], no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedBinaryStl { .. }));
    }

    #[test]
    fn test_huge_declared_count_rejected() {
        let mut bytes = vec![0u8; 84];
        bytes[80..84].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = decode_binary(&bytes, no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedBinaryStl { .. }));
    }

    #[test]
    fn test_zero_triangles_is_degenerate() {
        let bytes = encode(&[]);
        let err = decode_binary(&bytes, no_progress).unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry(_)));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let bytes = encode(&[[[0.0; 3], [f32::NAN, 1.0, 1.0], [2.0; 3]]]);
        let err = decode_binary(&bytes, no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedBinaryStl { .. }));
        assert_eq!(err.code(), "MALFORMED_BINARY_STL");

        let bytes = encode(&[[[0.0; 3], [1.0; 3], [2.0, f32::NEG_INFINITY, 2.0]]]);
        assert!(decode_binary(&bytes, no_progress).is_err());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = encode(&[[[0.0; 3], [1.0; 3], [2.0; 3]]]);
        bytes.extend_from_slice(&[0xAB; 7]);
        let record = decode_binary(&bytes, no_progress).unwrap();
        assert_eq!(record.face_count(), 1);
    }

    #[test]
    fn test_recycled_buffer_keeps_capacity() {
        let bytes = encode(&[[[0.0; 3], [1.0; 3], [2.0; 3]]]);
        let buffer = vec![7.0f32; 9];
        let ptr = buffer.as_ptr();
        let record = decode_binary_into(&bytes, buffer, no_progress).unwrap();
        assert_eq!(record.positions().as_ptr(), ptr);
        assert_eq!(record.positions()[..3], [0.0, 0.0, 0.0]);
    }
}
