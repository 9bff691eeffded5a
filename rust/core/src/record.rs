// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry record produced by a successful parse

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};

/// Triangle as three vertex indices `(i1, i2, i3)`
pub type Face = [u32; 3];

/// Decoded mesh: flat positions, triangle list and bounds.
///
/// Every face index addresses a vertex of the same record. Records built by
/// the decoders uphold this by construction; [`GeometryRecord::from_parts`]
/// checks it for externally supplied data.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    /// Vertex positions (x, y, z)
    positions: Vec<f32>,
    /// Triangle list
    faces: Vec<Face>,
    bounding_box: BoundingBox,
}

impl GeometryRecord {
    /// Assemble a record from decoder output whose indices are known valid.
    pub(crate) fn from_decoded(
        positions: Vec<f32>,
        faces: Vec<Face>,
        bounding_box: BoundingBox,
    ) -> Self {
        debug_assert_eq!(positions.len() % 3, 0);
        Self {
            positions,
            faces,
            bounding_box,
        }
    }

    /// Build a record from arbitrary parts, validating layout and indices.
    pub fn from_parts(positions: Vec<f32>, faces: Vec<Face>) -> Result<Self> {
        let bounding_box = BoundingBox::from_positions(&positions)?;
        let vertex_count = positions.len() / 3;

        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::InvalidFaceIndex {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self {
            positions,
            faces,
            bounding_box,
        })
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Position of a single vertex
    #[inline]
    pub fn vertex(&self, index: u32) -> [f32; 3] {
        let i = index as usize * 3;
        [self.positions[i], self.positions[i + 1], self.positions[i + 2]]
    }

    /// Bytes held by positions and faces
    pub fn byte_size(&self) -> usize {
        self.positions.len() * std::mem::size_of::<f32>()
            + self.faces.len() * std::mem::size_of::<Face>()
    }

    /// Split into owned parts so the position buffer can be recycled
    pub fn into_parts(self) -> (Vec<f32>, Vec<Face>, BoundingBox) {
        (self.positions, self.faces, self.bounding_box)
    }
}
