// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding box calculation over flat position buffers
//!
//! A single pass over `[x0, y0, z0, x1, ...]` tracking running min/max per
//! axis. An empty buffer is rejected instead of leaking `+inf/-inf` bounds,
//! and points with a NaN or infinite component are not sampled.

use crate::error::{Error, Result};

/// A 3-component value (point, extent or per-axis quantity)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z)
    #[inline]
    pub fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Axis-aligned bounding box. Computed once, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
    /// `max - min` component-wise
    pub size: Vec3,
}

impl BoundingBox {
    /// Compute bounds of a position buffer.
    ///
    /// Fails with [`Error::DegenerateGeometry`] when the buffer holds no
    /// finite vertex, and with [`Error::InvalidParameter`] when its length is not a
    /// multiple of 3.
    pub fn from_positions(positions: &[f32]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(Error::InvalidParameter(format!(
                "position buffer length {} is not a multiple of 3",
                positions.len()
            )));
        }

        let mut acc = BoundsAccumulator::new();
        positions
            .chunks_exact(3)
            .for_each(|chunk| acc.expand(chunk[0], chunk[1], chunk[2]));
        acc.finish()
    }

    /// True when at least one axis has zero extent (flat or planar mesh)
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.size.x == 0.0 || self.size.y == 0.0 || self.size.z == 0.0
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.min.x + self.size.x * 0.5,
            self.min.y + self.size.y * 0.5,
            self.min.z + self.size.z * 0.5,
        )
    }
}

/// Running min/max accumulator, usable while vertices are still being decoded
#[derive(Debug, Clone)]
pub struct BoundsAccumulator {
    min: [f32; 3],
    max: [f32; 3],
    sample_count: usize,
}

impl BoundsAccumulator {
    /// Create an accumulator in the "no samples" state
    pub fn new() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
            sample_count: 0,
        }
    }

    /// Check if at least one point was added
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Expand bounds to include a point. Non-finite points are ignored.
    #[inline]
    pub fn expand(&mut self, x: f32, y: f32, z: f32) {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return;
        }
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.min[2] = self.min[2].min(z);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
        self.max[2] = self.max[2].max(z);
        self.sample_count += 1;
    }

    /// Produce the bounding box, or fail if nothing was sampled
    pub fn finish(&self) -> Result<BoundingBox> {
        if !self.is_valid() {
            return Err(Error::DegenerateGeometry(
                "cannot compute bounds of zero finite vertices".into(),
            ));
        }
        let min = Vec3::from(self.min);
        let max = Vec3::from(self.max);
        Ok(BoundingBox {
            min,
            max,
            size: Vec3::new(max.x - min.x, max.y - min.y, max.z - min.z),
        })
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
