// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inner-surface isolation
//!
//! Faces whose centroids lie close to the mesh centroid are taken as
//! candidates for an inner cavity wall. This is a distance heuristic, not a
//! topological classification: the result is a candidate set.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use wearscan_core::progress::ISOLATE_PROGRESS_STRIDE;
use wearscan_core::{GeometryRecord, ProgressReporter};

/// Share of the progress budget spent on the distance scan
const SCAN_PROGRESS_SHARE: f32 = 50.0;

/// Faces selected as inner-surface candidates
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InnerSurfaceSelection {
    /// Indices into the record's face list, ascending
    pub selected_faces: Vec<u32>,
    pub selected_face_count: usize,
    pub total_face_count: usize,
    /// Distance at index `floor(0.25 n)` of the sorted distances
    pub first_quartile: f64,
    /// Distance at index `floor(0.75 n)`; the selection threshold
    pub third_quartile: f64,
}

/// Unweighted mean of all vertices
pub fn mesh_centroid(record: &GeometryRecord) -> Result<Point3<f64>> {
    let count = record.vertex_count();
    if count == 0 {
        return Err(Error::EmptyMesh("mesh has no vertices".to_string()));
    }

    let sum = record
        .positions()
        .chunks_exact(3)
        .fold(Vector3::<f64>::zeros(), |acc, v| {
            acc + Vector3::new(v[0] as f64, v[1] as f64, v[2] as f64)
        });
    Ok(Point3::from(sum / count as f64))
}

#[inline]
fn face_centroid(record: &GeometryRecord, face: &[u32; 3]) -> Point3<f64> {
    let sum = face.iter().fold(Vector3::<f64>::zeros(), |acc, &i| {
        let [x, y, z] = record.vertex(i);
        acc + Vector3::new(x as f64, y as f64, z as f64)
    });
    Point3::from(sum / 3.0)
}

/// Distance from every face centroid to the mesh centroid, in face order
pub fn face_centroid_distances(record: &GeometryRecord) -> Result<Vec<f64>> {
    let centroid = mesh_centroid(record)?;
    Ok(record
        .faces()
        .iter()
        .map(|face| nalgebra::distance(&face_centroid(record, face), &centroid))
        .collect())
}

/// Index of the quartile `fraction` in a sorted sample of length `n`
#[inline]
fn quartile_index(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).floor() as usize).min(n - 1)
}

/// Select faces whose centroid distance is at most the third quartile
pub fn isolate_inner_surface<F: FnMut(f32)>(
    record: &GeometryRecord,
    progress: F,
) -> Result<InnerSurfaceSelection> {
    let total = record.face_count();
    if total == 0 {
        return Err(Error::EmptyMesh("mesh has no faces".to_string()));
    }

    let mut reporter = ProgressReporter::new(progress);
    let centroid = mesh_centroid(record)?;

    let mut distances = Vec::with_capacity(total);
    for (i, face) in record.faces().iter().enumerate() {
        if i % ISOLATE_PROGRESS_STRIDE == 0 {
            reporter.report(i as f32 / total as f32 * SCAN_PROGRESS_SHARE);
        }
        distances.push(nalgebra::distance(&face_centroid(record, face), &centroid));
    }
    reporter.report(SCAN_PROGRESS_SHARE);

    let mut sorted = distances.clone();
    #[cfg(not(target_arch = "wasm32"))]
    {
        use rayon::prelude::*;
        sorted.par_sort_unstable_by(f64::total_cmp);
    }
    #[cfg(target_arch = "wasm32")]
    sorted.sort_unstable_by(f64::total_cmp);

    let first_quartile = sorted[quartile_index(total, 0.25)];
    let third_quartile = sorted[quartile_index(total, 0.75)];

    let selected_faces: Vec<u32> = distances
        .iter()
        .enumerate()
        .filter(|(_, d)| **d <= third_quartile)
        .map(|(i, _)| i as u32)
        .collect();
    reporter.finish();

    tracing::debug!(
        total,
        selected = selected_faces.len(),
        q1 = first_quartile,
        q3 = third_quartile,
        "isolated inner surface"
    );

    Ok(InnerSurfaceSelection {
        selected_face_count: selected_faces.len(),
        selected_faces,
        total_face_count: total,
        first_quartile,
        third_quartile,
    })
}
