// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded STL through pool, compressor and isolator

use approx::assert_relative_eq;
use wearscan_core::{binary_triangle_count, decode_binary_into, no_progress};
use wearscan_geometry::{
    face_centroid_distances, isolate_inner_surface, quantize_positions, weld_vertices, BufferPool,
};

const CUBE: [[[f32; 3]; 3]; 12] = [
    [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
    [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
    [[0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
    [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    [[0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
    [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
    [[0.0, 0.0, 0.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
    [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
    [[1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
];

fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut buf = vec![0u8; 80];
    buf.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for tri in triangles {
        buf.extend_from_slice(&[0u8; 12]);
        for c in tri.iter().flatten() {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        buf.extend_from_slice(&[0u8; 2]);
    }
    buf
}

#[test]
fn test_pooled_decode_reuses_buffer() {
    let bytes = binary_stl(&CUBE);
    let mut pool = BufferPool::<f32>::default();

    let count = binary_triangle_count(&bytes).unwrap() as usize;
    let buffer = pool.acquire(count * 9);
    let record = decode_binary_into(&bytes, buffer, no_progress).unwrap();
    let allocated = pool.stats().total_allocated_bytes;
    assert_eq!(allocated, 12 * 9 * 4);

    let (positions, _, _) = record.into_parts();
    pool.release(positions);

    let buffer = pool.acquire(count * 9);
    let record = decode_binary_into(&bytes, buffer, no_progress).unwrap();
    assert_eq!(record.face_count(), 12);
    assert_eq!(pool.stats().total_allocated_bytes, allocated);
}

#[test]
fn test_weld_cube_to_eight_corners() {
    let bytes = binary_stl(&CUBE);
    let record = decode_binary_into(&bytes, Vec::new(), no_progress).unwrap();
    assert_eq!(record.vertex_count(), 36);

    let welded = weld_vertices(record.positions(), 0.001).unwrap();
    assert_eq!(welded.unique_vertex_count(), 8);
    assert_eq!(welded.vertex_map.len(), 36);
    assert_relative_eq!(welded.reduction_percent, 2800.0 / 36.0, epsilon = 1e-4);

    let faces = welded.remap_faces(record.faces()).unwrap();
    assert_eq!(faces.len(), 12);
    assert!(faces.iter().flatten().all(|&i| i < 8));
}

#[test]
fn test_quantize_unit_cube_is_exact() {
    let bytes = binary_stl(&CUBE);
    let record = decode_binary_into(&bytes, Vec::new(), no_progress).unwrap();
    let quantized = quantize_positions(record.positions(), 16).unwrap();
    assert!(quantized.quantized.iter().all(|&q| q == 0 || q == u16::MAX));
    assert_eq!(quantized.dequantize(), record.positions());
}

#[test]
fn test_isolation_threshold_on_decoded_mesh() {
    let bytes = binary_stl(&CUBE);
    let record = decode_binary_into(&bytes, Vec::new(), no_progress).unwrap();
    let selection = isolate_inner_surface(&record, no_progress).unwrap();

    let distances = face_centroid_distances(&record).unwrap();
    let mut sorted = distances.clone();
    sorted.sort_by(f64::total_cmp);
    assert_eq!(selection.third_quartile, sorted[9]);
    assert_eq!(
        selection.selected_face_count,
        distances.iter().filter(|d| **d <= sorted[9]).count()
    );
    assert_eq!(selection.total_face_count, 12);
}
