// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASCII STL decoding
//!
//! Only `vertex <x> <y> <z>` records are significant; `facet`, `outer loop`
//! and friends are skipped. Every three consecutive vertices form one face
//! in encounter order. The scan works on raw bytes: `vertex` keywords are
//! located with memchr, each candidate is matched with a small nom parser,
//! and coordinates go through fast-float.

use memchr::memmem;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::multispace1,
    error::{Error as NomError, ErrorKind},
    sequence::{preceded, tuple},
    IResult,
};

use crate::bounds::BoundsAccumulator;
use crate::error::{Error, Result};
use crate::progress::{ProgressReporter, ASCII_PROGRESS_STRIDE};
use crate::record::{Face, GeometryRecord};

const VERTEX_KEYWORD: &[u8] = b"vertex";

/// Rough size of one vertex in a typical exporter's output, including its
/// share of the `facet` / `outer loop` / `endloop` / `endfacet` lines.
const APPROX_BYTES_PER_VERTEX: usize = 86;

#[inline]
fn is_number_byte(c: u8) -> bool {
    c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.' | b'e' | b'E')
}

/// Parse one coordinate: sign, decimals and exponent are accepted.
///
/// Only numeric tokens are taken, so `nan`, `inf` and `infinity` fail, as
/// does any value that overflows `f32`.
fn coordinate(input: &[u8]) -> IResult<&[u8], f32> {
    let (rest, token) = take_while1(is_number_byte)(input)?;
    match fast_float::parse::<f32, _>(token) {
        Ok(value) if value.is_finite() => Ok((rest, value)),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::Float))),
    }
}

/// Parse `vertex <float> <float> <float>` at the start of the input
fn vertex_record(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (rest, (x, y, z)) = preceded(
        tag(VERTEX_KEYWORD),
        tuple((
            preceded(multispace1, coordinate),
            preceded(multispace1, coordinate),
            preceded(multispace1, coordinate),
        )),
    )(input)?;
    Ok((rest, [x, y, z]))
}

/// Estimated vertex total, only used to scale progress
#[inline]
fn estimate_vertex_count(bytes: &[u8]) -> usize {
    (bytes.len() / APPROX_BYTES_PER_VERTEX).max(1)
}

/// Decode an ASCII STL buffer.
pub fn decode_ascii<F: FnMut(f32)>(bytes: &[u8], progress: F) -> Result<GeometryRecord> {
    decode_ascii_into(bytes, Vec::new(), progress)
}

/// Decode an ASCII STL buffer, writing positions into a recycled buffer.
pub fn decode_ascii_into<F: FnMut(f32)>(
    bytes: &[u8],
    mut positions: Vec<f32>,
    progress: F,
) -> Result<GeometryRecord> {
    let estimated = estimate_vertex_count(bytes);
    positions.clear();
    positions.reserve(estimated * 3);

    let mut faces: Vec<Face> = Vec::with_capacity(estimated / 3);
    let mut bounds = BoundsAccumulator::new();
    let mut reporter = ProgressReporter::new(progress);
    let mut vertex_count = 0usize;
    let mut skipped = 0usize;

    for pos in memmem::find_iter(bytes, VERTEX_KEYWORD) {
        let [x, y, z] = match vertex_record(&bytes[pos..]) {
            Ok((_, v)) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        positions.extend_from_slice(&[x, y, z]);
        bounds.expand(x, y, z);
        vertex_count += 1;

        if vertex_count % 3 == 0 {
            let n = vertex_count as u32;
            faces.push([n - 3, n - 2, n - 1]);
        }

        if vertex_count % ASCII_PROGRESS_STRIDE == 0 {
            // Estimate can undershoot; hold below 100 until the scan ends.
            let percent = vertex_count as f32 / estimated as f32 * 100.0;
            reporter.report(percent.min(99.0));
        }
    }

    if vertex_count == 0 {
        return Err(Error::malformed_ascii("no 'vertex x y z' records found"));
    }
    if vertex_count % 3 != 0 {
        return Err(Error::malformed_ascii(format!(
            "{} vertices do not form whole triangles ({} left over)",
            vertex_count,
            vertex_count % 3
        )));
    }

    let bounding_box = bounds.finish()?;
    reporter.finish();

    if skipped > 0 {
        tracing::warn!(skipped, "Ignored 'vertex' keywords without three coordinates");
    }
    tracing::debug!(vertices = vertex_count, faces = faces.len(), "Decoded ASCII STL");

    Ok(GeometryRecord::from_decoded(positions, faces, bounding_box))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::no_progress;

    const TRIANGLE: &str = "solid t
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1.5e1 -2.25 +3
      vertex -.5 1E-2 0.
    endloop
  endfacet
endsolid t
";

    #[test]
    fn test_vertex_record() {
        let (rest, v) = vertex_record(b"vertex  1.0\t-2e3 +0.5 tail").unwrap();
        assert_eq!(v, [1.0, -2000.0, 0.5]);
        assert_eq!(rest, b" tail");
    }

    #[test]
    fn test_vertex_record_requires_three_coordinates() {
        assert!(vertex_record(b"vertex 1.0 2.0").is_err());
        assert!(vertex_record(b"vertex1 2 3").is_err());
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        assert!(vertex_record(b"vertex nan 0 0").is_err());
        assert!(vertex_record(b"vertex 0 inf 0").is_err());
        assert!(vertex_record(b"vertex 0 0 -infinity").is_err());
        assert!(vertex_record(b"vertex 1e99 0 0").is_err());
    }

    #[test]
    fn test_non_finite_vertex_skipped() {
        let text = concat!(
            "solid t\n vertex nan inf -infinity\n",
            " vertex 0 0 0\n vertex 1 0 0\n vertex 0 1 0\nendsolid t\n",
        );
        let record = decode_ascii(text.as_bytes(), no_progress).unwrap();
        assert_eq!(record.vertex_count(), 3);
        let bbox = record.bounding_box();
        assert_eq!(bbox.min.x, 0.0);
        assert_eq!(bbox.max.y, 1.0);
        assert!(bbox.size.x.is_finite());
    }

    #[test]
    fn test_single_facet() {
        let record = decode_ascii(TRIANGLE.as_bytes(), no_progress).unwrap();
        assert_eq!(record.vertex_count(), 3);
        assert_eq!(record.faces(), &[[0, 1, 2]]);
        assert_eq!(record.vertex(1), [15.0, -2.25, 3.0]);
        assert_eq!(record.vertex(2), [-0.5, 0.01, 0.0]);
    }

    #[test]
    fn test_partial_face_rejected() {
        let text = "solid t\n vertex 0 0 0\n vertex 1 0 0\n vertex 0 1 0\n vertex 9 9 9\nendsolid t\n";
        let err = decode_ascii(text.as_bytes(), no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedAsciiStl { .. }));
    }

    #[test]
    fn test_no_vertices_rejected() {
        let err = decode_ascii(b"solid empty\nendsolid empty\n", no_progress).unwrap_err();
        assert!(matches!(err, Error::MalformedAsciiStl { .. }));
    }

    #[test]
    fn test_progress_ends_at_100() {
        let mut seen = Vec::new();
        decode_ascii(TRIANGLE.as_bytes(), |p| seen.push(p)).unwrap();
        assert_eq!(seen.last().copied(), Some(100.0));
    }
}
