// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WearScan Geometry Processing
//!
//! Mesh-level operations on decoded STL geometry: a length-bucketed buffer
//! pool, position quantization and vertex welding, and the inner-surface
//! isolator. Uses nalgebra for point math and rayon for sorting.

pub mod compress;
pub mod error;
pub mod isolate;
pub mod pool;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use compress::{
    dequantize_positions, quantize_positions, weld_vertices, CompressionInfo, QuantizationBounds,
    QuantizedGeometry, VertexWeldResult, DEFAULT_QUANTIZATION_BITS, DEFAULT_WELD_TOLERANCE,
};
pub use error::{Error, Result};
pub use isolate::{
    face_centroid_distances, isolate_inner_surface, mesh_centroid, InnerSurfaceSelection,
};
pub use pool::{BufferPool, PoolDetail, PoolStats, DEFAULT_MAX_POOL_SIZE};
